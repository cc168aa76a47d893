//! Platform abstraction layer
//!
//! Input reaches the engine through [`InputSource`] so browser listeners,
//! native drivers and tests can all feed the same loop.

use glam::Vec2;

/// Something the engine can poll for the current pointer position
pub trait InputSource {
    /// Latest pointer/touch position in canvas pixels, if any was seen
    fn pointer(&self) -> Option<Vec2>;
}

/// Pointer state written by event handlers and polled each frame
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerInput {
    position: Option<Vec2>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move (mouse or first touch)
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    /// Forget the pointer (e.g. between runs)
    pub fn clear(&mut self) {
        self.position = None;
    }
}

impl InputSource for PointerInput {
    fn pointer(&self) -> Option<Vec2> {
        self.position
    }
}

/// A fixed pointer position, handy for scripted runs
impl InputSource for Vec2 {
    fn pointer(&self) -> Option<Vec2> {
        Some(*self)
    }
}

/// No input at all
impl InputSource for () {
    fn pointer(&self) -> Option<Vec2> {
        None
    }
}
