//! tiny-skia canvas surface.

use anyhow::{Context, Result};
use snes_input_core::Button;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{
    Color, ColorU8, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, Rect, Transform,
};
use tracing::{debug, info};

use super::{parse_hex_color, Shape, Surface};
use crate::config::OverlayConfig;
use crate::state::AppState;

/// Draws frames into a pixmap and publishes them to the shared state.
pub struct Canvas {
    background: Pixmap,
    pixmap: Pixmap,
    paint: Paint<'static>,
    state: Arc<AppState>,
}

impl Canvas {
    /// Creates a canvas the size of `background`.
    pub fn new(background: Pixmap, pressed: Color, state: Arc<AppState>) -> Self {
        let mut paint = Paint::default();
        paint.set_color(pressed);
        paint.anti_alias = true;

        Self {
            pixmap: background.clone(),
            background,
            paint,
            state,
        }
    }

    /// Returns the canvas dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }
}

impl Surface for Canvas {
    fn begin(&mut self) {
        self.pixmap
            .data_mut()
            .copy_from_slice(self.background.data());
    }

    fn draw(&mut self, button: Button, shape: &Shape) {
        match shape_path(shape) {
            Some(path) => self.pixmap.fill_path(
                &path,
                &self.paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            ),
            None => debug!("Skipping degenerate shape for {}", button),
        }
    }

    fn present(&mut self) -> Result<()> {
        self.state.publish_frame(&self.pixmap);
        Ok(())
    }
}

fn shape_path(shape: &Shape) -> Option<SkPath> {
    match *shape {
        Shape::Circle { x, y, radius } => PathBuilder::from_circle(x, y, radius),
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => Rect::from_xywh(x, y, width, height).map(PathBuilder::from_rect),
        Shape::Quad(points) => {
            let [(x0, y0), rest @ ..] = points;
            let mut pb = PathBuilder::new();
            pb.move_to(x0, y0);
            for (x, y) in rest {
                pb.line_to(x, y);
            }
            pb.close();
            pb.finish()
        }
    }
}

/// Creates a solid colour background.
pub fn plain_background(width: u32, height: u32, color: Color) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("Invalid canvas size {}x{}", width, height))?;
    pixmap.fill(color);
    Ok(pixmap)
}

/// Loads a background image.
pub fn load_background(path: &Path) -> Result<Pixmap> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load background image {}", path.display()))?
        .to_rgba8();
    let (width, height) = image.dimensions();

    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("Background image {} is empty", path.display()))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    info!(
        "Loaded background {} ({}x{})",
        path.display(),
        width,
        height
    );
    Ok(pixmap)
}

/// Builds the background described by the overlay configuration.
pub fn background_from_config(config: &OverlayConfig) -> Result<Pixmap> {
    match &config.background {
        Some(path) => load_background(path),
        None => {
            let color = parse_hex_color(&config.background_color).with_context(|| {
                format!("Invalid background_color: {}", config.background_color)
            })?;
            plain_background(config.width, config.height, color)
        }
    }
}
