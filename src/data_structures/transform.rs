//! Canonical transform fields and their matrix composition.
//!
//! A [`Transform`] stores position, Euler rotation, scale and pivot
//! separately. The local matrix is always rebuilt from these fields, never
//! accumulated by repeated matrix products.

use cgmath::{InnerSpace, Matrix3, Matrix4, Rad, Vector3};

/// Canonical per-node transform state.
///
/// The rotation holds radians around X, Y and Z, composed as `Rx · Ry · Rz`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub pivot: Vector3<f32>,
}

impl Transform {
    /// Identity transform: no offset, no rotation, unit scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            pivot: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// `T(position) · T(pivot) · R(rotation) · S(scale) · T(-pivot)`
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_translation(self.pivot)
            * Matrix4::from(rotation_matrix(self.rotation))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_translation(-self.pivot)
    }

    /// Pre-multiplies the current rotation by `angle` around `axis`.
    ///
    /// With `around_self == false` the position orbits the parent origin as
    /// well. With `around_self == true` only the orientation changes.
    pub fn rotate(&mut self, angle: Rad<f32>, axis: Vector3<f32>, around_self: bool) {
        if axis.magnitude2() == 0.0 {
            log::warn!("Ignoring rotation around a zero-length axis");
            return;
        }
        let delta = Matrix3::from_axis_angle(axis.normalize(), angle);
        self.rotation = euler_from_matrix(&(delta * rotation_matrix(self.rotation)));
        if !around_self {
            self.position = delta * self.position;
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

/// `Rx(r.x) · Ry(r.y) · Rz(r.z)`
pub fn rotation_matrix(rotation: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_angle_x(Rad(rotation.x))
        * Matrix3::from_angle_y(Rad(rotation.y))
        * Matrix3::from_angle_z(Rad(rotation.z))
}

/**
 * Extracts `(x, y, z)` angles such that `rotation_matrix(angles) == m`.
 *
 * cgmath stores columns, so element (row r, col c) is `m[c][r]`. For
 * `Rx(a)·Ry(b)·Rz(c)` the top right element is `sin(b)`; when `cos(b)`
 * vanishes the X and Z angles are coupled and Z is pinned to zero.
 */
pub fn euler_from_matrix(m: &Matrix3<f32>) -> Vector3<f32> {
    let sin_y = m.z.x.clamp(-1.0, 1.0);
    let y = sin_y.asin();
    if sin_y.abs() < 0.999_999 {
        let x = (-m.z.y).atan2(m.z.z);
        let z = (-m.y.x).atan2(m.x.x);
        Vector3::new(x, y, z)
    } else {
        let x = m.y.z.atan2(m.y.y);
        Vector3::new(x, y, 0.0)
    }
}

/// Transforms the origin of `matrix`, i.e. extracts its translation column.
pub fn translation_of(matrix: &Matrix4<f32>) -> Vector3<f32> {
    matrix.w.truncate()
}
