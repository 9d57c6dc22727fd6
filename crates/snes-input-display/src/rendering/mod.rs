//! Overlay rendering.
//!
//! [`Overlay`] turns an input snapshot into draw calls on a [`Surface`]: one
//! call per held button, on top of a fresh copy of the background.

mod canvas;
mod layout;

pub use canvas::{background_from_config, Canvas};
pub use layout::{Layout, Shape};

use anyhow::Result;
use snes_input_core::{Button, InputSnapshot};
use tiny_skia::Color;

/// Something a frame can be drawn on.
pub trait Surface {
    /// Starts a new frame from the background.
    fn begin(&mut self);

    /// Draws a held button.
    fn draw(&mut self, button: Button, shape: &Shape);

    /// Shows the finished frame.
    fn present(&mut self) -> Result<()>;
}

/// Maps held buttons to shapes.
pub struct Overlay {
    layout: Layout,
}

impl Overlay {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Renders one frame. Returns the number of buttons drawn.
    pub fn render<S: Surface + ?Sized>(
        &self,
        snapshot: &InputSnapshot,
        surface: &mut S,
    ) -> Result<usize> {
        surface.begin();

        let mut drawn = 0;
        for button in snapshot.pressed() {
            if let Some(shape) = self.layout.shape(button) {
                surface.draw(button, shape);
                drawn += 1;
            }
        }

        surface.present()?;
        Ok(drawn)
    }
}

/// Parses a `#RRGGBB` colour.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::from_rgba8(r, g, b, 255))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        begun: usize,
        drawn: Vec<Button>,
        presented: usize,
    }

    impl Surface for Recorder {
        fn begin(&mut self) {
            self.begun += 1;
            self.drawn.clear();
        }

        fn draw(&mut self, button: Button, _shape: &Shape) {
            self.drawn.push(button);
        }

        fn present(&mut self) -> Result<()> {
            self.presented += 1;
            Ok(())
        }
    }

    #[test]
    fn test_render_draws_held_buttons() {
        let overlay = Overlay::new(Layout::snes());
        let mut surface = Recorder::default();

        // B + Up
        let snapshot = InputSnapshot::from_bytes([0x00, 0x88]);
        assert_eq!(overlay.render(&snapshot, &mut surface).unwrap(), 2);
        assert_eq!(surface.drawn, vec![Button::B, Button::Up]);
        assert_eq!((surface.begun, surface.presented), (1, 1));
    }

    #[test]
    fn test_render_empty_frame_still_presents() {
        let overlay = Overlay::new(Layout::snes());
        let mut surface = Recorder::default();

        overlay
            .render(&InputSnapshot::default(), &mut surface)
            .unwrap();
        assert!(surface.drawn.is_empty());
        assert_eq!(surface.presented, 1);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#FF3B00"),
            Some(Color::from_rgba8(255, 59, 0, 255))
        );
        assert_eq!(
            parse_hex_color("00ff00"),
            Some(Color::from_rgba8(0, 255, 0, 255))
        );
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("invalid"), None);
    }
}
