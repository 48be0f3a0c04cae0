use cgmath::InnerSpace;
use cgmath::Point3;
use cgmath::Vector3;
use cgmath::Zero;

use crate::rigid_body::RigidBody;

/// Something that pushes on a body once per step, before it is integrated.
pub trait ForceGenerator {
    /// Adds this generator's contribution for the coming step to `body`'s
    /// accumulators.
    fn update_force(&self, body: &mut RigidBody, duration: f32);
}

/// Uniform gravity, expressed as a force so it shows up in the accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityForceGenerator {
    pub gravity: Vector3<f32>,
}

impl GravityForceGenerator {
    pub fn new(gravity: Vector3<f32>) -> GravityForceGenerator {
        GravityForceGenerator { gravity }
    }
}

impl ForceGenerator for GravityForceGenerator {
    fn update_force(&self, body: &mut RigidBody, _duration: f32) {
        if !body.has_finite_mass() {
            return;
        }
        body.add_force(self.gravity * body.mass());
    }
}

/// Pulls bodies toward `center` with an acceleration of `force`, whatever
/// their distance. A negative `force` pushes them away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractionSphere {
    pub force: f32,
    pub center: Point3<f32>,
}

impl ForceGenerator for AttractionSphere {
    fn update_force(&self, body: &mut RigidBody, _duration: f32) {
        if !body.has_finite_mass() {
            return;
        }
        let towards = self.center - body.position;
        if towards.is_zero() {
            return;
        }
        body.add_force(towards.normalize() * (self.force * body.mass()));
    }
}

/// Crude water volume below the plane `y = height`.
///
/// Bodies count as fully submerged `max_depth` below the surface and as
/// fully out `max_depth` above it; in between the lift ramps linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyForceGenerator {
    pub height: f32,
    pub max_depth: f32,
    pub volume: f32,
    /// kg/m³, water is 1000
    pub density: f32,
}

impl ForceGenerator for BuoyancyForceGenerator {
    fn update_force(&self, body: &mut RigidBody, _duration: f32) {
        if !body.has_finite_mass() {
            return;
        }
        let depth = body.position.y;
        if depth >= self.height + self.max_depth {
            return;
        }

        let lift = if depth <= self.height - self.max_depth {
            self.volume * self.density
        } else {
            -self.volume * self.density * (depth - self.max_depth - self.height)
                / (self.max_depth * 2.0)
        };
        body.add_force(Vector3::new(0.0, lift * body.mass(), 0.0));
    }
}

/// Hooke spring from a point on the body to a fixed world anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchoredSpring {
    /// Attachment point in body space.
    pub local_point: Point3<f32>,
    /// Other end, in world space.
    pub anchor: Point3<f32>,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl ForceGenerator for AnchoredSpring {
    fn update_force(&self, body: &mut RigidBody, _duration: f32) {
        let attached = body.point_in_world_coordinates(self.local_point);
        let force = hooke_force(attached, self.anchor, self.spring_constant, self.rest_length);
        if let Some(force) = force {
            body.add_force_at_point(force, attached);
        }
    }
}

/// Force a spring stretched from `other` to `attached` exerts on the
/// `attached` end. `None` when the ends coincide and there is no direction.
pub fn hooke_force(
    attached: Point3<f32>,
    other: Point3<f32>,
    spring_constant: f32,
    rest_length: f32,
) -> Option<Vector3<f32>> {
    let stretch = attached - other;
    let length = stretch.magnitude();
    if length == 0.0 {
        return None;
    }
    Some(stretch / length * (-spring_constant * (length - rest_length)))
}
