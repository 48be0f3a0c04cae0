//! Rigid-body dynamics: bodies that accumulate forces and torques over a
//! frame, then integrate them in a single step.
//!
//! ```
//! use cgmath::Matrix3;
//! use cgmath::SquareMatrix;
//! use cgmath::Vector3;
//! use rigid_dynamics::RigidBody;
//!
//! let mut body = RigidBody::new(1.0, Matrix3::identity())
//!     .with_acceleration(Vector3::new(0.0, -9.8, 0.0));
//! body.add_force(Vector3::new(1.0, 0.0, 0.0));
//! body.integrate(1.0 / 60.0);
//! assert!(body.velocity.y < 0.0);
//! ```

pub mod config;
pub mod error;
pub mod force_generator;
pub mod inertia;
pub mod math;
pub mod render;
pub mod rigid_body;
pub mod world;

pub use config::{BodyConfig, SceneConfig, Shape, WorldConfig};
pub use error::ConfigError;
pub use force_generator::{
    AnchoredSpring, AttractionSphere, BuoyancyForceGenerator, ForceGenerator,
    GravityForceGenerator,
};
pub use render::{instance_bytes, BodyInstance};
pub use rigid_body::RigidBody;
pub use world::{BodyKey, BodySpring, SharedForceGenerator, World};
