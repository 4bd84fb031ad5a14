//! Collision detection module
//!
//! Geometric primitives and the `Collision` shape enum used by the physics
//! engine's narrow phase.

pub mod primitives;
pub mod shape;

pub use primitives::{Circle, Rectangle};
pub use shape::{Collision, CollisionType};
