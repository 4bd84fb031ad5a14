//! Physics objects
//!
//! A `PhysicsObject` is a positioned body carrying an optional collision
//! shape. The shape is kept in world space: it is translated whenever the
//! object moves so collision tests never need the owner's transform.

use super::collision::Collision;
use crate::foundation::math::{Point2, Vec2, Vec3};

/// A body registered with the physics engine
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsObject {
    position: Vec3,
    removable: bool,
    collision: Collision,
    /// Point at which the engine's index currently holds this object
    pub(super) indexed_at: Option<Point2>,
}

impl PhysicsObject {
    /// Create a shapeless object at `position`
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            removable: false,
            collision: Collision::None,
            indexed_at: None,
        }
    }

    /// Builder: attach a model-space shape, moved to the object's position
    #[must_use]
    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.assign_collision(collision);
        self
    }

    /// Builder: allow the world to despawn this object
    #[must_use]
    pub fn removable(mut self) -> Self {
        self.removable = true;
        self
    }

    /// World position, including the layer (`z`)
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Position projected on the ground plane
    pub fn ground_position(&self) -> Point2 {
        Point2::new(self.position.x, self.position.y)
    }

    /// Whether the object may be despawned by the world
    pub fn is_removable(&self) -> bool {
        self.removable
    }

    /// World-space collision shape
    pub fn collision(&self) -> &Collision {
        &self.collision
    }

    /// Point at which the object is currently indexed, if any
    pub fn indexed_at(&self) -> Option<Point2> {
        self.indexed_at
    }

    /// Move the object, dragging its shape along
    pub(super) fn move_to(&mut self, position: Vec3) {
        let offset = Vec2::new(position.x - self.position.x, position.y - self.position.y);
        self.collision.translate(offset);
        self.position = position;
    }

    /// Replace the shape with a model-space one placed at the current position
    pub(super) fn assign_collision(&mut self, collision: Collision) {
        self.collision = collision.translated(self.ground_position().coords);
    }

    pub(super) fn rotate(&mut self, angle: f32) {
        self.collision.rotate(angle);
    }
}
