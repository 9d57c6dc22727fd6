//! Application state shared between the poll loop and the web server.

use anyhow::Result;
use snes_input_core::InputSnapshot;
use std::sync::RwLock;
use tiny_skia::Pixmap;

/// Last presented frame and input snapshot.
pub struct AppState {
    frame: RwLock<Pixmap>,
    snapshot: RwLock<InputSnapshot>,
    device: RwLock<Option<String>>,
    refresh_ms: u64,
}

impl AppState {
    /// Creates the state with an initial frame.
    pub fn new(frame: Pixmap, refresh_ms: u64) -> Self {
        Self {
            frame: RwLock::new(frame),
            snapshot: RwLock::new(InputSnapshot::default()),
            device: RwLock::new(None),
            refresh_ms,
        }
    }

    /// Replaces the presented frame.
    pub fn publish_frame(&self, pixmap: &Pixmap) {
        let mut frame = self.frame.write().unwrap();
        if frame.width() == pixmap.width() && frame.height() == pixmap.height() {
            frame.data_mut().copy_from_slice(pixmap.data());
        } else {
            *frame = pixmap.clone();
        }
    }

    /// Records the latest input snapshot.
    pub fn set_snapshot(&self, snapshot: InputSnapshot) {
        *self.snapshot.write().unwrap() = snapshot;
    }

    /// Returns the latest input snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        *self.snapshot.read().unwrap()
    }

    /// Records the attached device.
    pub fn set_device(&self, device: &str) {
        *self.device.write().unwrap() = Some(device.to_string());
    }

    /// Returns the attached device, if any.
    pub fn device(&self) -> Option<String> {
        self.device.read().unwrap().clone()
    }

    /// Returns the page reload interval for the web overlay.
    pub fn refresh_ms(&self) -> u64 {
        self.refresh_ms
    }

    /// Returns the presented frame as PNG data.
    pub fn frame_png(&self) -> Result<Vec<u8>> {
        let frame = self.frame.read().unwrap();
        let (width, height) = (frame.width(), frame.height());

        let mut rgba = Vec::with_capacity(frame.data().len());
        for pixel in frame.pixels() {
            let color = pixel.demultiply();
            rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        drop(frame);

        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&rgba)?;
        }

        Ok(png_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_device() {
        let state = AppState::new(Pixmap::new(4, 4).unwrap(), 33);
        assert_eq!(state.snapshot(), InputSnapshot::default());
        assert_eq!(state.device(), None);

        let snapshot = InputSnapshot::from_bytes([0x80, 0x00]);
        state.set_snapshot(snapshot);
        state.set_device("device-1");
        assert_eq!(state.snapshot(), snapshot);
        assert_eq!(state.device().as_deref(), Some("device-1"));
    }

    #[test]
    fn test_publish_frame_resizes() {
        let state = AppState::new(Pixmap::new(4, 4).unwrap(), 33);
        let mut larger = Pixmap::new(8, 2).unwrap();
        larger.fill(tiny_skia::Color::WHITE);
        state.publish_frame(&larger);

        let png = state.frame_png().unwrap();
        let decoder = png::Decoder::new(png.as_slice());
        let reader = decoder.read_info().unwrap();
        assert_eq!((reader.info().width, reader.info().height), (8, 2));
    }
}
