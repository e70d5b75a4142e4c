//! Interactive pinhole camera.
//!
//! Input polling lives outside the core; the camera only consumes a
//! per-frame input snapshot (movement flags and mouse deltas). Pitch is
//! deliberately left unclamped: the basis flips when crossing straight
//! up/down, same as the original behavior.

use crate::math::{Mat4, Point3, Vec3};

/// One frame's worth of input state.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraInput {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Whether the look button (e.g. left mouse) is held.
    pub look_active: bool,
    pub mouse_delta_x: f32,
    pub mouse_delta_y: f32,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub origin: Point3,
    /// Vertical FOV in degrees.
    pub fov_angle: f32,

    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,

    /// Accumulated yaw/pitch in degrees.
    pub total_yaw: f32,
    pub total_pitch: f32,

    pub movement_speed: f32,
    pub rotation_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::ZERO, 90.0)
    }
}

impl Camera {
    pub fn new(origin: Point3, fov_angle: f32) -> Self {
        Self {
            origin,
            fov_angle,
            forward: Vec3::UNIT_Z,
            up: Vec3::UNIT_Y,
            right: Vec3::UNIT_X,
            total_yaw: 0.0,
            total_pitch: 0.0,
            movement_speed: 3.0,
            rotation_speed: 10.0,
        }
    }

    /// `tan(fov/2)`, the form primary-ray generation consumes.
    pub fn fov_scale(&self) -> f32 {
        (self.fov_angle.to_radians() * 0.5).tan()
    }

    /// Rebuild the basis from forward and return the camera-to-world matrix.
    /// Columns are {right, up, forward, origin}.
    pub fn camera_to_world(&self) -> Mat4 {
        let right = Vec3::UNIT_Y.cross(self.forward).normalized();
        let up = self.forward.cross(right).normalized();
        Mat4::from_axes(right, up, self.forward, self.origin)
    }

    /// Apply one frame of movement and look rotation.
    pub fn update(&mut self, input: &CameraInput, dt: f32) {
        self.right = Vec3::UNIT_Y.cross(self.forward).normalized();
        self.up = self.forward.cross(self.right).normalized();

        let mut movement = Vec3::ZERO;
        if input.move_forward {
            movement += self.forward;
        }
        if input.move_backward {
            movement -= self.forward;
        }
        if input.move_left {
            movement -= self.right;
        }
        if input.move_right {
            movement += self.right;
        }
        if movement != Vec3::ZERO {
            movement.normalize();
            self.origin += movement * self.movement_speed * dt;
        }

        if input.look_active && (input.mouse_delta_x != 0.0 || input.mouse_delta_y != 0.0) {
            self.total_yaw -= input.mouse_delta_x * self.rotation_speed * dt;
            self.total_pitch -= input.mouse_delta_y * self.rotation_speed * dt;

            let rotation = Mat4::rotate_xyz(
                self.total_pitch.to_radians(),
                self.total_yaw.to_radians(),
                0.0,
            );
            self.forward = rotation.transform_vector(Vec3::UNIT_Z).normalized();
        }
    }
}
