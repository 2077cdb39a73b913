// SPDX-License-Identifier: MPL-2.0

//! SSD1306 over Linux I2C

use super::Panel;
use crate::error::{MonitorError, Result};
use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use linux_embedded_hal::I2cdev;
use ssd1306::{I2CDisplayInterface, Ssd1306, mode::BufferedGraphicsMode, prelude::*};

type Driver = Ssd1306<I2CInterface<I2cdev>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct Ssd1306Panel {
    display: Driver,
}

impl Ssd1306Panel {
    /// Open the bus and bring the controller up with a blank screen.
    pub fn open(bus: &str, address: u8) -> Result<Self> {
        let i2c = I2cdev::new(bus).map_err(|e| MonitorError::Display(format!("{}: {}", bus, e)))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display
            .init()
            .map_err(|e| MonitorError::Display(format!("init at {:#04x} failed: {:?}", address, e)))?;

        let mut panel = Self { display };
        panel.blank()?;
        log::info!("SSD1306 ready on {} at {:#04x}", bus, address);
        Ok(panel)
    }
}

impl Panel for Ssd1306Panel {
    fn clear(&mut self) -> Result<()> {
        self.display.clear_buffer();
        Ok(())
    }

    fn draw_text(&mut self, position: Point, text: &str, color: BinaryColor) -> Result<()> {
        let style = MonoTextStyle::new(&FONT_6X10, color);
        Text::with_baseline(text, position, style, Baseline::Top)
            .draw(&mut self.display)
            .map_err(|e| MonitorError::Display(format!("draw failed: {:?}", e)))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.display
            .flush()
            .map_err(|e| MonitorError::Display(format!("flush failed: {:?}", e)))
    }
}
