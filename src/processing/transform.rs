use crate::state::table::StateTable;

/// Drawing surface dimensions, pixels.
pub const CANVAS_W: f64 = 1100.0;
pub const CANVAS_H: f64 = 700.0;
pub const CANVAS_PAD: f64 = 60.0;

/// Affine map between data coordinates and surface pixels.
///
/// The data window is symmetric around zero per axis, `[-half_x, half_x]`
/// by `[-half_y, half_y]`, so the origin always sits at the center of the
/// surface. Pixel y grows downward, so the vertical map is inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub half_x: f64,
    pub half_y: f64,
    pub width: f64,
    pub height: f64,
    pub pad: f64,
}

impl CanvasTransform {
    pub fn new(half_x: f64, half_y: f64, width: f64, height: f64, pad: f64) -> Self {
        // half_range() never returns zero, but guard direct construction too.
        let half_x = if half_x > 0.0 { half_x } else { 1.0 };
        let half_y = if half_y > 0.0 { half_y } else { 1.0 };
        Self {
            half_x,
            half_y,
            width,
            height,
            pad,
        }
    }

    /// Window the transform around the table's observed value range.
    pub fn from_table(table: &StateTable) -> Self {
        Self::new(
            table.x_half_range(),
            table.y_half_range(),
            CANVAS_W,
            CANVAS_H,
            CANVAS_PAD,
        )
    }

    pub fn x_to_px(&self, x: f64) -> f64 {
        self.pad + (x + self.half_x) / (2.0 * self.half_x) * (self.width - 2.0 * self.pad)
    }

    pub fn y_to_px(&self, y: f64) -> f64 {
        self.pad + (self.half_y - y) / (2.0 * self.half_y) * (self.height - 2.0 * self.pad)
    }

    pub fn px_to_x(&self, px: f64) -> f64 {
        -self.half_x + (px - self.pad) / (self.width - 2.0 * self.pad) * (2.0 * self.half_x)
    }

    pub fn px_to_y(&self, py: f64) -> f64 {
        self.half_y - (py - self.pad) / (self.height - 2.0 * self.pad) * (2.0 * self.half_y)
    }

    pub fn forward(&self, x: f64, y: f64) -> (f64, f64) {
        (self.x_to_px(x), self.y_to_px(y))
    }

    pub fn invert(&self, px: f64, py: f64) -> (f64, f64) {
        (self.px_to_x(px), self.px_to_y(py))
    }
}
