//! Button shapes on the controller diagram.

use snes_input_core::Button;

/// Filled shape drawn over a held button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { x: f32, y: f32, radius: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Quad([(f32, f32); 4]),
}

const FACE_BUTTON_RADIUS: f32 = 20.0;
const DPAD_SIZE: f32 = 40.0;
const SHOULDER_HEIGHT: f32 = 5.0;

const fn face(x: f32, y: f32) -> Shape {
    Shape::Circle {
        x,
        y,
        radius: FACE_BUTTON_RADIUS,
    }
}

const fn dpad(x: f32, y: f32) -> Shape {
    Shape::Rect {
        x,
        y,
        width: DPAD_SIZE,
        height: DPAD_SIZE,
    }
}

const fn shoulder(x: f32, width: f32) -> Shape {
    Shape::Rect {
        x,
        y: 2.0,
        width,
        height: SHOULDER_HEIGHT,
    }
}

/// Shapes for the bundled SNES controller diagram.
pub const SNES_LAYOUT: [(Button, Shape); 12] = [
    (Button::A, face(500.0, 132.0)),
    (Button::X, face(450.0, 88.0)),
    (Button::B, face(452.0, 165.0)),
    (Button::Y, face(403.0, 120.0)),
    (Button::L, shoulder(128.0, 77.0)),
    (Button::R, shoulder(377.0, 73.0)),
    (
        Button::Select,
        Shape::Quad([(224.0, 152.0), (231.0, 163.0), (263.0, 142.0), (255.0, 131.0)]),
    ),
    (
        Button::Start,
        Shape::Quad([(280.0, 153.0), (287.0, 163.0), (320.0, 142.0), (311.0, 131.0)]),
    ),
    (Button::Up, dpad(102.0, 66.0)),
    (Button::Down, dpad(102.0, 144.0)),
    (Button::Left, dpad(63.0, 105.0)),
    (Button::Right, dpad(141.0, 105.0)),
];

/// Button to shape lookup.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    shapes: &'static [(Button, Shape)],
}

impl Layout {
    /// Layout for the bundled SNES controller diagram.
    pub fn snes() -> Self {
        Self {
            shapes: &SNES_LAYOUT,
        }
    }

    /// Returns the shape drawn for a button.
    pub fn shape(&self, button: Button) -> Option<&Shape> {
        self.shapes
            .iter()
            .find(|(b, _)| *b == button)
            .map(|(_, shape)| shape)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::snes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snes_input_core::input::BUTTON_BITS;

    #[test]
    fn test_every_button_has_a_shape() {
        let layout = Layout::snes();
        for (_, button) in BUTTON_BITS {
            assert!(layout.shape(button).is_some(), "{} has no shape", button);
        }
    }

    #[test]
    fn test_shapes_fit_default_canvas() {
        for (button, shape) in SNES_LAYOUT {
            let (right, bottom) = match shape {
                Shape::Circle { x, y, radius } => (x + radius, y + radius),
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                } => (x + width, y + height),
                Shape::Quad(points) => points
                    .iter()
                    .fold((0.0f32, 0.0f32), |(r, b), (x, y)| (r.max(*x), b.max(*y))),
            };
            assert!(right <= 540.0 && bottom <= 200.0, "{} out of bounds", button);
        }
    }
}
