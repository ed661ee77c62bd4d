//! View transform between screen and board coordinates.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

const MIN_SCALE: f64 = 0.1;
const MAX_SCALE: f64 = 10.0;

/// Pan/zoom state of the board view.
///
/// Pointer positions arrive in screen space and must go through
/// [`Camera::screen_to_board`] before they become stroke geometry, so a
/// panned or zoomed view does not distort shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Screen-space position of the board origin.
    pub offset: Vec2,
    /// Uniform scale, 1.0 = one board unit per pixel.
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board → screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Screen → board.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    pub fn screen_to_board(&self, screen: Point) -> Point {
        self.inverse_transform() * screen
    }

    pub fn board_to_screen(&self, board: Point) -> Point {
        self.transform() * board
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` over the same board point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let anchor = self.screen_to_board(screen_point);
        self.scale = scale;
        self.offset = screen_point.to_vec2() - anchor.to_vec2() * scale;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
