// SPDX-License-Identifier: MPL-2.0

//! Screen layouts
//!
//! Four fixed text rows, 16 px apart. The row offsets match the 128×64
//! panel geometry and never reflow.

use super::Panel;
use crate::error::Result;
use crate::monitor::network::Rate;
use embedded_graphics::pixelcolor::BinaryColor;

/// Pixel rows of the four text lines
pub const LINE_OFFSETS: [i32; 4] = [0, 16, 32, 48];

/// Characters of the failure message shown under "Error:"
pub const ERROR_MESSAGE_CHARS: usize = 20;

/// One cycle's worth of facts.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub public_address: String,
    pub local_address: String,
    /// bytes/s
    pub upload_rate: Rate,
    /// bytes/s
    pub download_rate: Rate,
}

/// Human-scaled speed from KB/s, one decimal place.
pub fn format_speed(kb_per_sec: f64) -> String {
    if kb_per_sec >= 1024.0 * 1024.0 {
        format!("{:.1} GB/s", kb_per_sec / (1024.0 * 1024.0))
    } else if kb_per_sec >= 1024.0 {
        format!("{:.1} MB/s", kb_per_sec / 1024.0)
    } else {
        format!("{:.1} KB/s", kb_per_sec)
    }
}

pub fn truncate_message(message: &str) -> String {
    message.chars().take(ERROR_MESSAGE_CHARS).collect()
}

/// Owns the panel for the life of the process.
pub struct DisplayRenderer<P: Panel> {
    panel: P,
}

impl<P: Panel> DisplayRenderer<P> {
    pub fn new(panel: P) -> Self {
        Self { panel }
    }

    #[cfg(test)]
    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn render(&mut self, snapshot: &DisplaySnapshot) -> Result<()> {
        let lines = [
            format!("Ext: {}", snapshot.public_address),
            format!("Int: {}", snapshot.local_address),
            format!("Up: {}", format_speed(snapshot.upload_rate / 1024.0)),
            format!("Down: {}", format_speed(snapshot.download_rate / 1024.0)),
        ];

        let mut surface = self.panel.open_surface()?;
        for (y, line) in LINE_OFFSETS.iter().zip(lines.iter()) {
            surface.draw_text(0, *y, line, BinaryColor::On)?;
        }
        surface.commit()
    }

    pub fn render_error(&mut self, message: &str) -> Result<()> {
        let mut surface = self.panel.open_surface()?;
        surface.draw_text(0, LINE_OFFSETS[0], "Error:", BinaryColor::On)?;
        surface.draw_text(0, LINE_OFFSETS[1], &truncate_message(message), BinaryColor::On)?;
        surface.commit()
    }

    /// Best-effort blank on the way out
    pub fn shutdown(&mut self) {
        if let Err(e) = self.panel.blank() {
            log::warn!("Could not blank display: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::testing::RecordingPanel;
    use embedded_graphics::prelude::Point;

    #[test]
    fn test_format_speed_units() {
        assert_eq!(format_speed(500.0), "500.0 KB/s");
        assert_eq!(format_speed(2048.0), "2.0 MB/s");
        assert_eq!(format_speed(1_048_576.0), "1.0 GB/s");
        assert_eq!(format_speed(0.0), "0.0 KB/s");
        assert_eq!(format_speed(1023.9), "1023.9 KB/s");
        assert_eq!(format_speed(1536.0), "1.5 MB/s");
    }

    #[test]
    fn test_render_layout() {
        let mut renderer = DisplayRenderer::new(RecordingPanel::default());
        let snapshot = DisplaySnapshot {
            public_address: "203.0.113.7".into(),
            local_address: "192.168.1.20".into(),
            upload_rate: 512_000.0,
            download_rate: 2_097_152.0,
        };

        renderer.render(&snapshot).unwrap();

        let panel = renderer.panel();
        assert_eq!(panel.frames.len(), 1);
        assert_eq!(
            panel.frames[0],
            vec![
                (Point::new(0, 0), "Ext: 203.0.113.7".to_string()),
                (Point::new(0, 16), "Int: 192.168.1.20".to_string()),
                (Point::new(0, 32), "Up: 500.0 KB/s".to_string()),
                (Point::new(0, 48), "Down: 2.0 MB/s".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_error_truncates() {
        let mut renderer = DisplayRenderer::new(RecordingPanel::default());

        renderer
            .render_error("display: flush failed: BusWriteError")
            .unwrap();

        assert_eq!(
            renderer.panel().last_frame_text(),
            vec!["Error:".to_string(), "display: flush faile".to_string()]
        );
    }

    #[test]
    fn test_failed_draw_still_releases_frame() {
        let mut panel = RecordingPanel::default();
        panel.failing_draws = 1;
        let mut renderer = DisplayRenderer::new(panel);
        let snapshot = DisplaySnapshot {
            public_address: "x".into(),
            local_address: "y".into(),
            upload_rate: 0.0,
            download_rate: 0.0,
        };

        assert!(renderer.render(&snapshot).is_err());
        assert_eq!(renderer.panel().frames.len(), 1);
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_message("short"), "short");
        assert_eq!(truncate_message(&"é".repeat(30)).chars().count(), 20);
    }
}
