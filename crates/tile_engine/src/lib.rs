//! # Tile Engine
//!
//! The spatial and collision layer of a 2D tile-world game engine.
//!
//! ## Features
//!
//! - **Point Quadtree**: Bucketed quadtree with range queries and parametric ray casting
//! - **Collision Shapes**: Rectangles and circles with touch-tolerant overlap tests
//! - **Physics Engine**: Indexed objects with per-axis sliding collision resolution
//! - **World Sectors**: Physics, point lights and interactables over one area
//! - **Configuration**: Density parameters loadable from TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use tile_engine::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let bounds = AABox::new(Point2::new(-16.0, -16.0), Point2::new(16.0, 16.0));
//!     let mut physics = PhysicsEngine::new(bounds, 64, &PhysicsConfig::default())?;
//!
//!     let player = physics.add_object(
//!         PhysicsObject::new(Vec3::zeros()).with_collision(Collision::circle(0.5)),
//!     )?;
//!     physics.add_object(
//!         PhysicsObject::new(Vec3::new(1.0, 0.0, 0.0)).with_collision(Collision::rectangle(1.0, 1.0)),
//!     )?;
//!
//!     // Blocked to the right, free upwards
//!     let result = physics.check_collision(player, Point2::new(0.6, 0.6))?;
//!     assert_eq!(result.horizontal, 0.0);
//!     physics.set_position(player, Vec3::new(result.position.x, result.position.y, 0.0))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig, QuadTreeConfig},
        foundation::math::{AABox, Point2, Ray2D, Vec2, Vec3},
        physics::{
            Collision, CollisionEvent, CollisionResult, ObjectKey, PhysicsEngine, PhysicsError,
            PhysicsObject, UpdateOutcome,
        },
        scene::{SectorError, WorldSector},
        spatial::QuadTree,
    };
}
