use std::sync::Arc;

use cgmath::Point3;
use slotmap::new_key_type;
use slotmap::SlotMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::WorldConfig;
use crate::error::ConfigError;
use crate::force_generator::hooke_force;
use crate::force_generator::ForceGenerator;
use crate::render::BodyInstance;
use crate::rigid_body::RigidBody;

new_key_type! {
    /// Stable handle to a body owned by a [`World`].
    pub struct BodyKey;
}

/// Shared, thread-safe force generator. One generator may drive many bodies.
pub type SharedForceGenerator = Arc<dyn ForceGenerator + Send + Sync>;

struct Registration {
    body: BodyKey,
    generator: SharedForceGenerator,
}

/// Hooke spring joining a point on one body to a point on another.
///
/// Both ends are pulled along the line between the attachment points with
/// equal and opposite forces, applied at those points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpring {
    pub first: BodyKey,
    /// Attachment point on `first`, in its body space.
    pub first_point: Point3<f32>,
    pub second: BodyKey,
    pub second_point: Point3<f32>,
    pub spring_constant: f32,
    pub rest_length: f32,
}

/// Owns a set of bodies and the force generators acting on them, and steps
/// them all together.
pub struct World {
    config: WorldConfig,
    bodies: SlotMap<BodyKey, RigidBody>,
    registrations: Vec<Registration>,
    springs: Vec<BodySpring>,
    // Time handed to advance() but not yet simulated.
    backlog: f32,
    elapsed: f32,
    steps: u64,
}

impl Default for World {
    fn default() -> Self {
        World::with_valid_config(WorldConfig::default())
    }
}

impl World {
    /// Creates an empty world, rejecting settings `advance` cannot run with.
    pub fn new(config: WorldConfig) -> Result<World, ConfigError> {
        config.validate()?;
        Ok(World::with_valid_config(config))
    }

    fn with_valid_config(config: WorldConfig) -> World {
        World {
            config,
            bodies: SlotMap::with_key(),
            registrations: Vec::new(),
            springs: Vec::new(),
            backlog: 0.0,
            elapsed: 0.0,
            steps: 0,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Removes a body along with every force generator and spring attached
    /// to it.
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        let body = self.bodies.remove(key)?;
        self.registrations.retain(|r| r.body != key);
        self.springs.retain(|s| s.first != key && s.second != key);
        Some(body)
    }

    pub fn body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &RigidBody)> {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Registers `generator` on `body`. Registering the same generator on the
    /// same body twice has no effect. Returns false if the body is unknown.
    pub fn add_force_generator(&mut self, body: BodyKey, generator: SharedForceGenerator) -> bool {
        if !self.bodies.contains_key(body) {
            return false;
        }
        let known = self
            .registrations
            .iter()
            .any(|r| r.body == body && Arc::ptr_eq(&r.generator, &generator));
        if !known {
            self.registrations.push(Registration { body, generator });
        }
        true
    }

    pub fn remove_force_generator(&mut self, body: BodyKey, generator: &SharedForceGenerator) {
        self.registrations
            .retain(|r| !(r.body == body && Arc::ptr_eq(&r.generator, generator)));
    }

    /// Joins two distinct live bodies with a spring. Returns false, and adds
    /// nothing, if either body is unknown or both ends are the same body.
    pub fn add_spring(&mut self, spring: BodySpring) -> bool {
        if spring.first == spring.second
            || !self.bodies.contains_key(spring.first)
            || !self.bodies.contains_key(spring.second)
        {
            return false;
        }
        self.springs.push(spring);
        true
    }

    pub fn springs(&self) -> &[BodySpring] {
        &self.springs
    }

    /// Applies every force generator and spring, then integrates every body
    /// by `duration`.
    pub fn step(&mut self, duration: f32) {
        for registration in &self.registrations {
            if let Some(body) = self.bodies.get_mut(registration.body) {
                registration.generator.update_force(body, duration);
            }
        }
        self.apply_springs();

        self.integrate_all(duration);

        self.elapsed += duration;
        self.steps += 1;
        log::trace!(
            "step {} integrated {} bodies over {}s",
            self.steps,
            self.bodies.len(),
            duration
        );
    }

    fn apply_springs(&mut self) {
        // Read every end before any spring force lands.
        let tensions: Vec<_> = self
            .springs
            .iter()
            .filter_map(|spring| {
                let first = self.bodies.get(spring.first)?;
                let second = self.bodies.get(spring.second)?;
                let a = first.point_in_world_coordinates(spring.first_point);
                let b = second.point_in_world_coordinates(spring.second_point);
                let force = hooke_force(a, b, spring.spring_constant, spring.rest_length)?;
                Some((spring.first, a, spring.second, b, force))
            })
            .collect();

        for (first, a, second, b, force) in tensions {
            if let Some(body) = self.bodies.get_mut(first) {
                body.add_force_at_point(force, a);
            }
            if let Some(body) = self.bodies.get_mut(second) {
                body.add_force_at_point(-force, b);
            }
        }
    }

    fn integrate_all(&mut self, duration: f32) {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                let mut bodies: Vec<&mut RigidBody> = self.bodies.values_mut().collect();
                bodies
                    .par_iter_mut()
                    .for_each(|body| body.integrate(duration));
                return;
            }
        }

        for body in self.bodies.values_mut() {
            body.integrate(duration);
        }
    }

    /// Runs as many fixed `timestep` steps as fit in the time handed over so
    /// far, carrying the remainder to the next call.
    ///
    /// At most `max_substeps` steps run per call; anything beyond that is
    /// dropped so a slow frame cannot snowball. Returns the number of steps
    /// taken. Non-positive and non-finite `elapsed` are ignored.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        self.backlog += elapsed;

        let timestep = self.config.timestep;
        let mut taken = 0;
        while self.backlog >= timestep {
            if taken == self.config.max_substeps {
                log::warn!(
                    "simulation fell behind, dropping {:.4}s",
                    self.backlog - self.backlog % timestep
                );
                self.backlog %= timestep;
                break;
            }
            self.step(timestep);
            self.backlog -= timestep;
            taken += 1;
        }
        taken
    }

    /// Model matrices of every body, in iteration order.
    pub fn instances(&self) -> Vec<BodyInstance> {
        self.bodies.values().map(BodyInstance::from).collect()
    }
}
