//! Fly camera: yaw/pitch look, bounded WASD movement and scroll zoom.

use cgmath::{Deg, InnerSpace, Matrix3, Matrix4, Point3, Vector3, perspective};
use winit::keyboard::KeyCode;

use crate::input::Input;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// What the shaders need from the camera each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraUniforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub eye: Vector3<f32>,
}

/// Region the camera may move in: a vertical band intersected with a cylinder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBounds {
    pub ground: f32,
    pub max_height: f32,
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl CameraBounds {
    pub fn contains(&self, position: Point3<f32>) -> bool {
        if position.y < self.ground || position.y > self.max_height {
            return false;
        }
        let dx = position.x - self.center.x;
        let dz = position.z - self.center.z;
        (dx * dx + dz * dz).sqrt() <= self.radius
    }
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            ground: 1.0,
            max_height: 100.0,
            center: Vector3::new(0.0, 0.0, -50.0),
            radius: 75.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub move_speed: f32,
    pub move_speed_fast: f32,
    /// Degrees per mouse count per second.
    pub sensitivity: f32,
    /// Degrees of fov per scroll line per second.
    pub zoom_speed: f32,
    pub pitch_range: (f32, f32),
    pub fov_range: (f32, f32),
    /// `None` lets the camera fly anywhere.
    pub bounds: Option<CameraBounds>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 15.0, 3.0),
            near: 0.1,
            far: 2000.0,
            fov: 45.0,
            move_speed: 10.0,
            move_speed_fast: 30.0,
            sensitivity: 4.0,
            zoom_speed: 100.0,
            pitch_range: (-89.0, 89.0),
            fov_range: (1.0, 45.0),
            bounds: Some(CameraBounds::default()),
        }
    }
}

pub struct Camera {
    pub position: Point3<f32>,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
    fov: Deg<f32>,
    rotation: Matrix3<f32>,
    forward: Vector3<f32>,
    config: CameraConfig,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            yaw: Deg(0.0),
            pitch: Deg(0.0),
            fov: Deg(config.fov.clamp(config.fov_range.0, config.fov_range.1)),
            rotation: Matrix3::from_scale(1.0),
            forward: -Vector3::unit_z(),
            config,
        };
        camera.set_yaw_pitch(Deg(0.0), Deg(0.0));
        camera
    }

    pub fn yaw(&self) -> Deg<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    pub fn fov(&self) -> Deg<f32> {
        self.fov
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    /// Sets the orientation, clamping pitch. Forward is `Ry(yaw) · Rx(pitch) · -Z`.
    pub fn set_yaw_pitch(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        let (min, max) = self.config.pitch_range;
        self.yaw = yaw;
        self.pitch = Deg(pitch.0.clamp(min, max));
        self.rotation = Matrix3::from_angle_y(self.yaw) * Matrix3::from_angle_x(self.pitch);
        self.forward = self.rotation * -Vector3::unit_z();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward, Vector3::unit_y())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fov, aspect, self.config.near, self.config.far)
    }

    pub fn uniforms(&self, aspect: f32) -> CameraUniforms {
        CameraUniforms {
            view: self.view_matrix(),
            projection: self.projection_matrix(aspect),
            eye: Vector3::new(self.position.x, self.position.y, self.position.z),
        }
    }

    /// D/A strafe, Space/LeftControl rise and sink, S/W back and forth, LeftShift runs.
    pub fn update(&mut self, input: &Input, dt: f32) {
        let movement = input.axis_3d(
            KeyCode::KeyD,
            KeyCode::KeyA,
            KeyCode::Space,
            KeyCode::ControlLeft,
            KeyCode::KeyS,
            KeyCode::KeyW,
        );
        self.move_by(movement, input.is_key_held(KeyCode::ShiftLeft), dt);
        self.look(input.mouse_delta().x, input.mouse_delta().y, dt);
        self.zoom(input.scroll_delta().y, dt);
    }

    /// Moves along `direction` given in camera space. A step leaving the bounds is dropped whole.
    pub fn move_by(&mut self, direction: Vector3<f32>, fast: bool, dt: f32) {
        if direction.magnitude2() == 0.0 {
            return;
        }
        let speed = if fast {
            self.config.move_speed_fast
        } else {
            self.config.move_speed
        };
        let target = self.position + self.rotation * direction * speed * dt;
        if let Some(bounds) = &self.config.bounds {
            if !bounds.contains(target) {
                return;
            }
        }
        self.position = target;
    }

    pub fn look(&mut self, dx: f32, dy: f32, dt: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let factor = self.config.sensitivity * dt;
        let yaw = Deg(self.yaw.0 - dx * factor);
        let pitch = Deg(self.pitch.0 - dy * factor);
        self.set_yaw_pitch(yaw, pitch);
    }

    pub fn zoom(&mut self, scroll: f32, dt: f32) {
        if scroll == 0.0 {
            return;
        }
        let (min, max) = self.config.fov_range;
        self.fov = Deg((self.fov.0 - scroll * self.config.zoom_speed * dt).clamp(min, max));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
