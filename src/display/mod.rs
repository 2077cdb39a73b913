// SPDX-License-Identifier: MPL-2.0

//! # Display
//!
//! The panel is a 128×64 monochrome SSD1306 on I2C. Everything above the
//! driver works against [`Panel`], which keeps the renderer testable without
//! hardware.
//!
//! ## Frames
//!
//! Drawing always goes through a [`ScopedSurface`]: opening one clears the
//! frame buffer, releasing it pushes the buffer to the panel in one transfer.
//! Release happens exactly once, whether the surface is committed explicitly
//! or dropped on an early return.

pub mod render;
#[cfg(target_os = "linux")]
pub mod oled;

pub use render::{DisplayRenderer, DisplaySnapshot};
#[cfg(target_os = "linux")]
pub use oled::Ssd1306Panel;

use crate::error::Result;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;

/// A buffered monochrome panel.
pub trait Panel {
    /// Blank the frame buffer. Nothing reaches the glass until `flush`.
    fn clear(&mut self) -> Result<()>;

    /// Draw one line of text with its top-left corner at `position`.
    fn draw_text(&mut self, position: Point, text: &str, color: BinaryColor) -> Result<()>;

    /// Push the frame buffer to the panel.
    fn flush(&mut self) -> Result<()>;

    fn open_surface(&mut self) -> Result<ScopedSurface<'_, Self>>
    where
        Self: Sized,
    {
        ScopedSurface::open(self)
    }

    /// Clear the panel itself, not just the buffer.
    fn blank(&mut self) -> Result<()> {
        self.clear()?;
        self.flush()
    }
}

/// One frame's worth of drawing. See the module docs.
pub struct ScopedSurface<'a, P: Panel> {
    panel: &'a mut P,
    committed: bool,
}

impl<'a, P: Panel> ScopedSurface<'a, P> {
    pub fn open(panel: &'a mut P) -> Result<Self> {
        panel.clear()?;
        Ok(Self {
            panel,
            committed: false,
        })
    }

    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: BinaryColor) -> Result<()> {
        self.panel.draw_text(Point::new(x, y), text, color)
    }

    /// Flush and report the outcome.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        self.panel.flush()
    }
}

impl<P: Panel> Drop for ScopedSurface<'_, P> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = self.panel.flush() {
            log::warn!("Flush on surface release failed: {}", e);
        }
    }
}
