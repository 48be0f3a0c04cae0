//! Serializable description of a world and the bodies in it.
//!
//! Scenes are plain JSON. Every field has a default, so a scene only needs
//! to spell out what differs:
//!
//! ```json
//! {
//!   "world": { "gravity": [0.0, -9.81, 0.0], "timestep": 0.01 },
//!   "bodies": [
//!     { "name": "ball", "mass": 2.0, "shape": { "type": "sphere", "radius": 0.5 },
//!       "position": [0.0, 10.0, 0.0] },
//!     { "name": "floor", "shape": { "type": "cuboid", "half_extents": [50.0, 0.5, 50.0] } }
//!   ]
//! }
//! ```

use std::path::Path;

use cgmath::Point3;
use cgmath::Quaternion;
use cgmath::Vector3;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::inertia::cuboid_inertia_tensor;
use crate::inertia::sphere_inertia_tensor;
use crate::rigid_body::RigidBody;
use crate::rigid_body::DEFAULT_ANGULAR_DAMPING;
use crate::rigid_body::DEFAULT_LINEAR_DAMPING;
use crate::world::BodyKey;
use crate::world::World;

/// Settings shared by every body of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Constant acceleration given to every spawned body.
    pub gravity: [f32; 3],
    /// Fixed step used by [`World::advance`], in seconds.
    pub timestep: f32,
    /// Upper bound on steps taken by a single [`World::advance`] call.
    pub max_substeps: u32,
    /// Damping for bodies that do not set their own.
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Integrate bodies on the rayon pool. Ignored without the `parallel` feature.
    pub parallel: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 8,
            linear_damping: DEFAULT_LINEAR_DAMPING,
            angular_damping: DEFAULT_ANGULAR_DAMPING,
            parallel: true,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn with_gravity(mut self, gravity: [f32; 3]) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn zero_gravity(self) -> Self {
        self.with_gravity([0.0; 3])
    }

    #[must_use]
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    #[must_use]
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    #[must_use]
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn gravity_vector(&self) -> Vector3<f32> {
        self.gravity.into()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("gravity", &self.gravity)?;
        if !(self.timestep > 0.0 && self.timestep.is_finite()) {
            return Err(ConfigError::InvalidTimestep(self.timestep));
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        check_damping("linear", self.linear_damping)?;
        check_damping("angular", self.angular_damping)?;
        Ok(())
    }
}

/// Collision-free shape, used only to derive an inertia tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { half_extents: [f32; 3] },
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Sphere { radius: 1.0 }
    }
}

impl Shape {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Shape::Sphere { radius } => {
                if !(*radius > 0.0 && radius.is_finite()) {
                    return Err(ConfigError::shape("sphere", format!("radius {radius}")));
                }
            }
            Shape::Cuboid { half_extents } => {
                if !half_extents.iter().all(|e| *e > 0.0 && e.is_finite()) {
                    return Err(ConfigError::shape(
                        "cuboid",
                        format!("half extents {half_extents:?}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One body to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Only used in logs.
    pub name: Option<String>,
    /// `None`, `0` and infinity all mean immovable.
    pub mass: Option<f32>,
    pub shape: Shape,
    pub position: [f32; 3],
    /// `[w, x, y, z]`, normalized on spawn.
    pub orientation: [f32; 4],
    pub velocity: [f32; 3],
    pub rotation: [f32; 3],
    pub linear_damping: Option<f32>,
    pub angular_damping: Option<f32>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: None,
            mass: None,
            shape: Shape::default(),
            position: [0.0; 3],
            orientation: [1.0, 0.0, 0.0, 0.0],
            velocity: [0.0; 3],
            rotation: [0.0; 3],
            linear_damping: None,
            angular_damping: None,
        }
    }
}

impl BodyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(mass) = self.mass {
            if mass.is_nan() || mass < 0.0 {
                return Err(ConfigError::InvalidMass(mass));
            }
        }
        self.shape.validate()?;
        finite("position", &self.position)?;
        finite("orientation", &self.orientation)?;
        if self.orientation.iter().map(|c| c * c).sum::<f32>() == 0.0 {
            return Err(ConfigError::ZeroOrientation);
        }
        finite("velocity", &self.velocity)?;
        finite("rotation", &self.rotation)?;
        if let Some(d) = self.linear_damping {
            check_damping("linear", d)?;
        }
        if let Some(d) = self.angular_damping {
            check_damping("angular", d)?;
        }
        Ok(())
    }

    /// Validates the description and turns it into a body living in a world
    /// configured by `world`.
    pub fn build(&self, world: &WorldConfig) -> Result<RigidBody, ConfigError> {
        self.validate()?;

        let body = match self.mass {
            Some(mass) if mass > 0.0 && mass.is_finite() => {
                let inertia = match &self.shape {
                    Shape::Sphere { radius } => sphere_inertia_tensor(mass, *radius),
                    Shape::Cuboid { half_extents } => {
                        cuboid_inertia_tensor(mass, (*half_extents).into())
                    }
                };
                RigidBody::new(mass, inertia)
            }
            _ => RigidBody::immovable(),
        };

        let [w, x, y, z] = self.orientation;
        Ok(body
            .with_position(Point3::from(self.position))
            .with_orientation(Quaternion::new(w, x, y, z))
            .with_velocity(self.velocity.into())
            .with_rotation(self.rotation.into())
            .with_acceleration(world.gravity_vector())
            .with_damping(
                self.linear_damping.unwrap_or(world.linear_damping),
                self.angular_damping.unwrap_or(world.angular_damping),
            ))
    }
}

/// A complete world description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub world: WorldConfig,
    pub bodies: Vec<BodyConfig>,
}

impl SceneConfig {
    pub fn from_json_str(json: &str) -> Result<SceneConfig, ConfigError> {
        let scene: SceneConfig = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<SceneConfig, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        log::debug!("loaded scene from {}", path.display());
        SceneConfig::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.bodies.iter().try_for_each(BodyConfig::validate)
    }

    /// Creates the world and spawns every body, returning the body keys in
    /// scene order.
    pub fn build(&self) -> Result<(World, Vec<BodyKey>), ConfigError> {
        let mut world = World::new(self.world.clone())?;
        let mut keys = Vec::with_capacity(self.bodies.len());
        for config in &self.bodies {
            let key = world.add_body(config.build(&self.world)?);
            log::debug!(
                "spawned {} as {:?}",
                config.name.as_deref().unwrap_or("<unnamed>"),
                key
            );
            keys.push(key);
        }
        Ok((world, keys))
    }
}

fn check_damping(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::damping(field, value))
    }
}

fn finite(field: &'static str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}
