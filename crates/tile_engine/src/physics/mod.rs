//! Physics module
//!
//! Collision shapes, physics objects and the engine that indexes them and
//! resolves proposed moves.

pub mod collision;
pub mod engine;
pub mod object;

pub use collision::{Circle, Collision, CollisionType, Rectangle};
pub use engine::{CollisionEvent, CollisionResult, ObjectKey, PhysicsEngine, PhysicsError, UpdateOutcome};
pub use object::PhysicsObject;
