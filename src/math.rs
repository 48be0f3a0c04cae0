//! The handful of quaternion and matrix operations the integrator needs on
//! top of `cgmath`.

use cgmath::EuclideanSpace;
use cgmath::InnerSpace;
use cgmath::Matrix;
use cgmath::Matrix3;
use cgmath::Matrix4;
use cgmath::Point3;
use cgmath::Quaternion;
use cgmath::Vector3;

/// Squared-magnitude slack under which a quaternion counts as already unit
/// length and is left untouched by [`normalize_orientation`].
pub const UNIT_TOLERANCE: f32 = 1e-6;

pub fn identity_orientation() -> Quaternion<f32> {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// `q += 0.5 * scale * (0, v) * q`
///
/// First-order update: the angular rate is added straight into the four
/// components instead of going through an exponential map, so the result
/// drifts off the unit sphere and away from the exact rotation as
/// `scale * |v|` grows. Callers renormalize afterwards.
pub fn add_scaled_vector(q: Quaternion<f32>, v: Vector3<f32>, scale: f32) -> Quaternion<f32> {
    let spin = Quaternion::from_sv(0.0, v * scale) * q;
    q + spin * 0.5
}

/// Brings `q` back to unit length.
///
/// Quaternions already within [`UNIT_TOLERANCE`] come back bit-for-bit, so
/// repeated passes over a static body never perturb it. A degenerate
/// (zero or non-finite) quaternion has no direction to keep and resets to
/// identity.
pub fn normalize_orientation(q: Quaternion<f32>) -> Quaternion<f32> {
    let magnitude2 = q.magnitude2();
    if !magnitude2.is_finite() || magnitude2 == 0.0 {
        log::warn!("degenerate orientation {:?}, resetting to identity", q);
        return identity_orientation();
    }
    if (magnitude2 - 1.0).abs() <= UNIT_TOLERANCE {
        return q;
    }
    q / magnitude2.sqrt()
}

/// Rotation followed by translation, as a single homogeneous matrix.
pub fn transform_from(orientation: Quaternion<f32>, position: Point3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position.to_vec()) * Matrix4::from(orientation)
}

/// Upper-left 3x3 block of a transform. The translation column is dropped.
pub fn rotation_block(transform: &Matrix4<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(
        transform.x.truncate(),
        transform.y.truncate(),
        transform.z.truncate(),
    )
}

/// `R * tensor * Rᵗ`, moving a body-space tensor into world space.
pub fn rotate_tensor(rotation: &Matrix3<f32>, tensor: &Matrix3<f32>) -> Matrix3<f32> {
    *rotation * *tensor * rotation.transpose()
}

/// `damping^duration`, the fraction of velocity kept over a step.
///
/// Real exponentiation keeps the decay rate independent of the step size.
/// `duration == 0` yields 1 for any damping, including 0.
pub fn damping_factor(damping: f32, duration: f32) -> f32 {
    damping.powf(duration)
}
