use cgmath::EuclideanSpace;
use cgmath::Matrix;
use cgmath::Matrix3;
use cgmath::Matrix4;
use cgmath::Point3;
use cgmath::Quaternion;
use cgmath::SquareMatrix;
use cgmath::Transform;
use cgmath::Vector3;
use cgmath::Zero;

use crate::math;

pub const DEFAULT_LINEAR_DAMPING: f32 = 0.995;

pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.995;

/// Kinematic and dynamic state of one simulated rigid object.
///
/// State fields are public and may be written by the owner at any time.
/// Everything derived from them (transform, world inertia tensor) is only
/// refreshed by [`RigidBody::integrate`] or [`RigidBody::recompute_derived`];
/// after writing `position` or `orientation` directly, call one of the two
/// before reading the derived data.
#[derive(Debug, Clone)]
pub struct RigidBody {
    // Linear
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
    /// Constant acceleration applied every step regardless of forces, e.g. gravity.
    pub acceleration: Vector3<f32>,
    /// Fraction of linear velocity kept per second, in `[0, 1]`.
    pub linear_damping: f32,

    // Angular
    pub orientation: Quaternion<f32>,
    /// Angular velocity as an axis scaled by its rate in rad/s.
    pub rotation: Vector3<f32>,
    /// Fraction of angular velocity kept per second, in `[0, 1]`.
    pub angular_damping: f32,

    // Zero means infinite mass: the body never moves.
    inverse_mass: f32,
    inverse_inertia_tensor: Matrix3<f32>,

    // Derived
    transform_matrix: Matrix4<f32>,
    inverse_inertia_tensor_world: Matrix3<f32>,
    last_frame_acceleration: Vector3<f32>,

    // Cleared by every integrate
    force_accumulator: Vector3<f32>,
    torque_accumulator: Vector3<f32>,
}

impl Default for RigidBody {
    /// Unit mass with an identity inertia tensor, at rest at the origin.
    fn default() -> RigidBody {
        RigidBody::from_inverse(1.0, Matrix3::identity())
    }
}

impl RigidBody {
    /// Builds a body from its mass and body-space inertia tensor.
    ///
    /// A mass of zero or infinity makes the body immovable. A singular
    /// inertia tensor cannot be inverted; the body then ignores torques.
    pub fn new(mass: f32, inertia_tensor: Matrix3<f32>) -> RigidBody {
        debug_assert!(!(mass < 0.0), "negative mass {mass}");
        let inverse_mass = if mass == 0.0 || mass.is_infinite() {
            0.0
        } else {
            1.0 / mass
        };
        let inverse_inertia_tensor = inertia_tensor.invert().unwrap_or_else(|| {
            log::warn!(
                "singular inertia tensor {:?}, body will not respond to torque",
                inertia_tensor
            );
            Matrix3::zero()
        });
        RigidBody::from_inverse(inverse_mass, inverse_inertia_tensor)
    }

    pub fn from_inverse(inverse_mass: f32, inverse_inertia_tensor: Matrix3<f32>) -> RigidBody {
        let mut body = RigidBody {
            position: Point3::new(0.0, 0.0, 0.0),
            velocity: Vector3::zero(),
            acceleration: Vector3::zero(),
            linear_damping: DEFAULT_LINEAR_DAMPING,
            orientation: math::identity_orientation(),
            rotation: Vector3::zero(),
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            inverse_mass,
            inverse_inertia_tensor,
            transform_matrix: Matrix4::identity(),
            inverse_inertia_tensor_world: inverse_inertia_tensor,
            last_frame_acceleration: Vector3::zero(),
            force_accumulator: Vector3::zero(),
            torque_accumulator: Vector3::zero(),
        };
        body.recompute_derived();
        body
    }

    /// A static body, e.g. a proxy for level geometry.
    pub fn immovable() -> RigidBody {
        RigidBody::from_inverse(0.0, Matrix3::zero())
    }

    pub fn with_position(mut self, position: Point3<f32>) -> RigidBody {
        self.position = position;
        self.recompute_derived();
        self
    }

    pub fn with_orientation(mut self, orientation: Quaternion<f32>) -> RigidBody {
        self.orientation = orientation;
        self.recompute_derived();
        self
    }

    pub fn with_velocity(mut self, velocity: Vector3<f32>) -> RigidBody {
        self.velocity = velocity;
        self
    }

    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> RigidBody {
        self.rotation = rotation;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vector3<f32>) -> RigidBody {
        self.acceleration = acceleration;
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> RigidBody {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    /// `f32::INFINITY` for immovable bodies.
    pub fn mass(&self) -> f32 {
        if self.inverse_mass == 0.0 {
            f32::INFINITY
        } else {
            1.0 / self.inverse_mass
        }
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn has_finite_mass(&self) -> bool {
        self.inverse_mass != 0.0
    }

    pub fn inverse_inertia_tensor(&self) -> Matrix3<f32> {
        self.inverse_inertia_tensor
    }

    pub fn inverse_inertia_tensor_world(&self) -> Matrix3<f32> {
        self.inverse_inertia_tensor_world
    }

    pub fn transform_matrix(&self) -> Matrix4<f32> {
        self.transform_matrix
    }

    /// Column-major model matrix, ready for a uniform or instance buffer.
    pub fn opengl_matrix(&self) -> [[f32; 4]; 4] {
        self.transform_matrix.into()
    }

    pub fn last_frame_acceleration(&self) -> Vector3<f32> {
        self.last_frame_acceleration
    }

    pub fn force_accumulator(&self) -> Vector3<f32> {
        self.force_accumulator
    }

    pub fn torque_accumulator(&self) -> Vector3<f32> {
        self.torque_accumulator
    }

    /// Adds a force through the center of mass.
    pub fn add_force(&mut self, force: Vector3<f32>) {
        self.force_accumulator += force;
    }

    pub fn add_torque(&mut self, torque: Vector3<f32>) {
        self.torque_accumulator += torque;
    }

    /// Adds a force applied at a world-space point. Off-center points also
    /// produce torque.
    pub fn add_force_at_point(&mut self, force: Vector3<f32>, point: Point3<f32>) {
        let arm = point - self.position;
        self.force_accumulator += force;
        self.torque_accumulator += arm.cross(force);
    }

    /// Same as [`RigidBody::add_force_at_point`], with the point given in
    /// body space. The force itself stays in world space.
    pub fn add_force_at_body_point(&mut self, force: Vector3<f32>, point: Point3<f32>) {
        let world_point = self.point_in_world_coordinates(point);
        self.add_force_at_point(force, world_point);
    }

    pub fn point_in_world_coordinates(&self, point: Point3<f32>) -> Point3<f32> {
        self.transform_matrix.transform_point(point)
    }

    pub fn point_in_local_coordinates(&self, point: Point3<f32>) -> Point3<f32> {
        let origin = self.transform_matrix.transform_point(Point3::origin());
        Point3::from_vec(self.direction_in_local_coordinates(point - origin))
    }

    pub fn direction_in_world_coordinates(&self, direction: Vector3<f32>) -> Vector3<f32> {
        self.transform_matrix.transform_vector(direction)
    }

    pub fn direction_in_local_coordinates(&self, direction: Vector3<f32>) -> Vector3<f32> {
        math::rotation_block(&self.transform_matrix).transpose() * direction
    }

    /// Advances the body by `duration` seconds and refreshes derived data.
    ///
    /// Velocities pick up this step's accelerations first, are then damped,
    /// and only then move the body. Both accumulators are empty afterwards,
    /// whichever path was taken.
    pub fn integrate(&mut self, duration: f32) {
        if self.inverse_mass == 0.0 {
            self.recompute_derived();
            self.clear_accumulators();
            return;
        }

        self.last_frame_acceleration = self.acceleration + self.force_accumulator * self.inverse_mass;
        let angular_acceleration = self.inverse_inertia_tensor_world * self.torque_accumulator;

        self.velocity += self.last_frame_acceleration * duration;
        self.rotation += angular_acceleration * duration;

        // drag
        self.velocity *= math::damping_factor(self.linear_damping, duration);
        self.rotation *= math::damping_factor(self.angular_damping, duration);

        self.position += self.velocity * duration;
        self.orientation = math::add_scaled_vector(self.orientation, self.rotation, duration);

        self.recompute_derived();
        self.clear_accumulators();
    }

    /// Renormalizes the orientation, then rebuilds the transform and the
    /// world-space inverse inertia tensor from the current state.
    pub fn recompute_derived(&mut self) {
        self.orientation = math::normalize_orientation(self.orientation);
        self.transform_matrix = math::transform_from(self.orientation, self.position);
        self.inverse_inertia_tensor_world = math::rotate_tensor(
            &math::rotation_block(&self.transform_matrix),
            &self.inverse_inertia_tensor,
        );
    }

    fn clear_accumulators(&mut self) {
        self.force_accumulator = Vector3::zero();
        self.torque_accumulator = Vector3::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inertia::sphere_inertia_tensor;
    use approx::assert_abs_diff_eq;
    use approx::assert_relative_eq;
    use cgmath::Rad;
    use cgmath::Rotation3;

    fn turned_body() -> RigidBody {
        RigidBody::default()
            .with_position(Point3::new(1.0, 2.0, 3.0))
            .with_orientation(Quaternion::from_axis_angle(
                Vector3::unit_z(),
                Rad(std::f32::consts::FRAC_PI_2),
            ))
    }

    #[test]
    fn mass_zero_and_infinite_are_immovable() {
        let it = Matrix3::identity();
        assert!(!RigidBody::new(0.0, it).has_finite_mass());
        assert!(!RigidBody::new(f32::INFINITY, it).has_finite_mass());
        assert_eq!(RigidBody::new(0.0, it).mass(), f32::INFINITY);
        let b = RigidBody::new(0.5, it);
        assert_eq!(b.inverse_mass(), 2.0);
        assert_eq!(b.mass(), 0.5);
    }

    #[test]
    fn inertia_tensor_is_inverted() {
        let b = RigidBody::new(2.0, sphere_inertia_tensor(2.0, 1.0));
        assert_relative_eq!(b.inverse_inertia_tensor().x.x, 1.25, epsilon = 1e-6);
        assert_relative_eq!(b.inverse_inertia_tensor_world().y.y, 1.25, epsilon = 1e-6);
    }

    #[test]
    fn singular_inertia_tensor_ignores_torque() {
        let mut b = RigidBody::new(1.0, Matrix3::zero()).with_damping(1.0, 1.0);
        b.add_torque(Vector3::new(1.0, 2.0, 3.0));
        b.integrate(0.1);
        assert_eq!(b.rotation, Vector3::zero());
    }

    #[test]
    fn forces_accumulate() {
        let mut b = RigidBody::default();
        b.add_force(Vector3::new(1.0, 0.0, 0.0));
        b.add_force(Vector3::new(0.0, 2.0, 0.0));
        b.add_torque(Vector3::new(0.0, 0.0, 3.0));
        b.add_torque(Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(b.force_accumulator(), Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(b.torque_accumulator(), Vector3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn force_at_point_produces_torque() {
        let mut b = RigidBody::default().with_position(Point3::new(1.0, 0.0, 0.0));
        b.add_force_at_point(Vector3::new(0.0, 1.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(b.force_accumulator(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(b.torque_accumulator(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn force_at_center_produces_no_torque() {
        let mut b = turned_body();
        b.add_force_at_body_point(Vector3::new(3.0, 0.0, 0.0), Point3::origin());
        assert_eq!(b.force_accumulator(), Vector3::new(3.0, 0.0, 0.0));
        assert_abs_diff_eq!(b.torque_accumulator(), Vector3::zero(), epsilon = 1e-6);
    }

    #[test]
    fn force_at_body_point_uses_orientation() {
        let mut b = turned_body();
        // body +x points along world +y after the quarter turn
        b.add_force_at_body_point(Vector3::new(1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(b.torque_accumulator(), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn world_and_local_points_round_trip() {
        let b = turned_body();
        let local = Point3::new(0.5, -1.0, 2.0);
        let world = b.point_in_world_coordinates(local);
        assert_abs_diff_eq!(world, Point3::new(2.0, 2.5, 5.0), epsilon = 1e-6);
        assert_abs_diff_eq!(b.point_in_local_coordinates(world), local, epsilon = 1e-6);
    }

    #[test]
    fn directions_ignore_translation() {
        let b = turned_body();
        let d = b.direction_in_world_coordinates(Vector3::unit_x());
        assert_abs_diff_eq!(d, Vector3::unit_y(), epsilon = 1e-6);
        assert_abs_diff_eq!(b.direction_in_local_coordinates(d), Vector3::unit_x(), epsilon = 1e-6);
    }

    #[test]
    fn opengl_matrix_is_column_major() {
        let b = RigidBody::default().with_position(Point3::new(4.0, 5.0, 6.0));
        let m = b.opengl_matrix();
        assert_eq!(m[3], [4.0, 5.0, 6.0, 1.0]);
        assert_eq!(m[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn last_frame_acceleration_combines_force_and_constant_acceleration() {
        let mut b = RigidBody::new(2.0, Matrix3::identity())
            .with_acceleration(Vector3::new(0.0, -10.0, 0.0));
        b.add_force(Vector3::new(4.0, 0.0, 0.0));
        b.integrate(0.01);
        assert_eq!(b.last_frame_acceleration(), Vector3::new(2.0, -10.0, 0.0));
    }

    #[test]
    fn direct_mutation_needs_recompute() {
        let mut b = RigidBody::default();
        b.position = Point3::new(7.0, 0.0, 0.0);
        assert_eq!(b.transform_matrix().w.x, 0.0);
        b.recompute_derived();
        assert_eq!(b.transform_matrix().w.x, 7.0);
    }
}
