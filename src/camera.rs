//! Camera seam between the core and whatever renders it.
//!
//! The movement machine only ever drives a positionable look-at handle; it
//! never knows about projection, viewports, or a scene graph.

use glam::Vec3;

/// A positionable look-at handle. Rendering backends implement this for
/// their camera node; the core drives it and nothing else.
pub trait CameraRig {
    fn set_position(&mut self, position: Vec3);
    fn set_target(&mut self, target: Vec3);
    fn position(&self) -> Vec3;
    fn target(&self) -> Vec3;
}

/// Plain value implementation, used headless and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAtCamera {
    position: Vec3,
    target: Vec3,
}

impl LookAtCamera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }
}

impl Default for LookAtCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0))
    }
}

impl CameraRig for LookAtCamera {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn target(&self) -> Vec3 {
        self.target
    }
}
