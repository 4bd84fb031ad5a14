//! Physics engine
//!
//! Owns every registered `PhysicsObject` and a quadtree indexing them by
//! ground position. Proposed moves are resolved against the neighbours the
//! index returns around the mover; detected contacts are buffered until the
//! next `step`.

use std::collections::VecDeque;

use slotmap::SlotMap;

use super::collision::Collision;
use super::object::PhysicsObject;
use crate::config::{ConfigError, PhysicsConfig};
use crate::foundation::math::{AABox, Point2, Vec2, Vec3};
use crate::spatial::QuadTree;

slotmap::new_key_type! {
    /// Handle to an object registered with a `PhysicsEngine`
    pub struct ObjectKey;
}

/// Physics errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The point lies outside the indexed world region
    #[error("Point ({x}, {y}) is outside the world region")]
    OutOfRegion {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },

    /// The world bounds have no area
    #[error("World bounds must have a positive, finite size")]
    InvalidBounds,

    /// The key does not name a registered object
    #[error("Unknown physics object")]
    UnknownObject,

    /// The configuration was rejected
    #[error("Invalid physics configuration: {0}")]
    Config(String),
}

impl From<ConfigError> for PhysicsError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

/// Outcome of moving an object's index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The entry now sits at the new point
    Moved,
    /// The new point is outside the world; the entry was left where it was
    Rejected,
    /// The object had no entry, so nothing changed
    NotIndexed,
}

/// Movement allowed by `PhysicsEngine::check_collision`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Allowed offset along x; zero when the horizontal move collides
    pub horizontal: f32,
    /// Allowed offset along y; zero when the vertical move collides
    pub vertical: f32,
    /// Current position plus the allowed offsets
    pub position: Point2,
    /// Object that blocked the horizontal move
    pub horizontal_contact: Option<ObjectKey>,
    /// Object that blocked the vertical move
    pub vertical_contact: Option<ObjectKey>,
}

impl CollisionResult {
    /// Whether either axis was blocked
    pub fn blocked(&self) -> bool {
        self.horizontal_contact.is_some() || self.vertical_contact.is_some()
    }
}

/// A contact detected while checking a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Object whose move was checked
    pub mover: ObjectKey,
    /// Object it would have run into
    pub other: ObjectKey,
}

/// Spatially indexed collection of physics objects
pub struct PhysicsEngine {
    objects: SlotMap<ObjectKey, PhysicsObject>,
    world: QuadTree<ObjectKey>,
    events: VecDeque<CollisionEvent>,
    config: PhysicsConfig,
}

impl PhysicsEngine {
    /// Create an engine indexing the square that starts at `world_bounds.min`
    /// and whose side is the larger side of `world_bounds`
    pub fn new(
        world_bounds: AABox,
        approx_object_count: usize,
        config: &PhysicsConfig,
    ) -> Result<Self, PhysicsError> {
        let finite = world_bounds.min.iter().chain(world_bounds.max.iter()).all(|v| v.is_finite());
        if !finite || world_bounds.width() <= 0.0 || world_bounds.height() <= 0.0 {
            return Err(PhysicsError::InvalidBounds);
        }
        config.validate()?;

        let world = QuadTree::covering(&world_bounds, config.quadtree);
        let region = world.region();
        log::info!(
            "Physics engine created: region ({}, {}) side {}, bucket size {}, max depth {}",
            region.min.x,
            region.min.y,
            region.width(),
            config.quadtree.bucket_size,
            config.quadtree.max_depth
        );

        Ok(Self {
            objects: SlotMap::with_capacity_and_key(approx_object_count),
            world,
            events: VecDeque::with_capacity(config.max_collision_events),
            config: *config,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// The square covered by the object index
    pub fn region(&self) -> AABox {
        self.world.region()
    }

    /// Number of registered objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are registered
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects currently in the index
    pub fn indexed_len(&self) -> usize {
        self.world.len()
    }

    /// Look up a registered object
    pub fn get(&self, key: ObjectKey) -> Option<&PhysicsObject> {
        self.objects.get(key)
    }

    /// Iterate over every registered object
    pub fn objects(&self) -> impl Iterator<Item = (ObjectKey, &PhysicsObject)> {
        self.objects.iter()
    }

    /// Register an object, indexing it when it already has a shape
    pub fn add_object(&mut self, object: PhysicsObject) -> Result<ObjectKey, PhysicsError> {
        let solid = object.collision().is_solid();
        let point = object.ground_position();
        if solid {
            self.check_region(point)?;
        }

        let key = self.objects.insert(object);
        if solid {
            self.insert(key)?;
        }
        Ok(key)
    }

    /// Index the object at its current position
    pub fn insert(&mut self, key: ObjectKey) -> Result<(), PhysicsError> {
        let point = self.object(key)?.ground_position();
        self.check_region(point)?;

        self.remove(key);
        self.world.insert(point, key);
        self.object_mut(key)?.indexed_at = Some(point);
        Ok(())
    }

    /// Move the object's index entry to `new_position`.
    ///
    /// The new point is checked before the old entry is touched, so a
    /// rejected move leaves the index as it was.
    pub fn update(&mut self, key: ObjectKey, new_position: Point2) -> Result<UpdateOutcome, PhysicsError> {
        let Some(old_position) = self.object(key)?.indexed_at else {
            log::warn!("PhysicsEngine::update: object is not indexed");
            return Ok(UpdateOutcome::NotIndexed);
        };

        if !self.world.region().contains_point_strict(new_position) {
            log::debug!(
                "PhysicsEngine::update: ({}, {}) is outside the world, keeping ({}, {})",
                new_position.x,
                new_position.y,
                old_position.x,
                old_position.y
            );
            return Ok(UpdateOutcome::Rejected);
        }

        if self.world.remove_entry(old_position, &key).is_none() {
            log::warn!("PhysicsEngine::update: object not found at its indexed position");
        }
        self.world.insert(new_position, key);
        self.object_mut(key)?.indexed_at = Some(new_position);
        Ok(UpdateOutcome::Moved)
    }

    /// Drop the object's index entry; the object stays registered
    pub fn remove(&mut self, key: ObjectKey) {
        let Some(object) = self.objects.get_mut(key) else {
            return;
        };
        let Some(point) = object.indexed_at.take() else {
            return;
        };
        if self.world.remove_entry(point, &key).is_none() {
            log::warn!("PhysicsEngine::remove: object not found");
        }
    }

    /// Unregister the object entirely, returning it
    pub fn despawn(&mut self, key: ObjectKey) -> Option<PhysicsObject> {
        self.remove(key);
        self.objects.remove(key)
    }

    /// Unregister every removable object, returning how many were dropped
    pub fn despawn_removable(&mut self) -> usize {
        let keys: Vec<ObjectKey> = self
            .objects
            .iter()
            .filter(|(_, object)| object.is_removable())
            .map(|(key, _)| key)
            .collect();
        for key in &keys {
            self.despawn(*key);
        }
        keys.len()
    }

    /// Move the object (and its shape), keeping its index entry in sync.
    ///
    /// Fails with `OutOfRegion` and leaves the object untouched when an
    /// indexed object would leave the world.
    pub fn set_position(&mut self, key: ObjectKey, position: Vec3) -> Result<(), PhysicsError> {
        let point = Point2::new(position.x, position.y);
        let indexed = self.object(key)?.indexed_at.is_some();
        if indexed && self.update(key, point)? == UpdateOutcome::Rejected {
            return Err(PhysicsError::OutOfRegion { x: point.x, y: point.y });
        }
        self.object_mut(key)?.move_to(position);
        Ok(())
    }

    /// Give the object a model-space shape, indexing it if the shape is
    /// solid and removing it from the index otherwise
    pub fn set_collision(&mut self, key: ObjectKey, collision: Collision) -> Result<(), PhysicsError> {
        let object = self.object(key)?;
        if collision.is_solid() && object.indexed_at.is_none() {
            self.check_region(object.ground_position())?;
        }

        self.object_mut(key)?.assign_collision(collision);
        if collision.is_solid() {
            if self.object(key)?.indexed_at.is_none() {
                self.insert(key)?;
            }
        } else {
            self.remove(key);
        }
        Ok(())
    }

    /// Rotate the object's shape clockwise around its center
    pub fn rotate(&mut self, key: ObjectKey, angle: f32) -> Result<(), PhysicsError> {
        self.object_mut(key)?.rotate(angle);
        Ok(())
    }

    /// Work out how far the object may move towards `proposed`.
    ///
    /// Horizontal and vertical moves are tested separately against every
    /// neighbour within `neighbor_window` of the object's current position,
    /// so a body blocked on one axis can still slide along the other. Each
    /// detected contact is queued for the next `step`.
    pub fn check_collision(&mut self, key: ObjectKey, proposed: Point2) -> Result<CollisionResult, PhysicsError> {
        let object = self.object(key)?;
        let current = object.ground_position();
        let shape = *object.collision();
        let offset = proposed - current;

        let window = AABox::from_center_extents(current, Vec2::repeat(self.config.neighbor_window));
        let mut neighbours = Vec::new();
        self.world.query_range(&window, &mut neighbours);
        log::trace!("PhysicsEngine::check_collision: {} candidates", neighbours.len());

        let horizontal_contact =
            self.first_contact(key, &shape.translated(Vec2::new(offset.x, 0.0)), &neighbours);
        let vertical_contact = self.first_contact(key, &shape.translated(Vec2::new(0.0, offset.y)), &neighbours);

        for other in horizontal_contact.iter().chain(vertical_contact.iter()) {
            self.push_event(CollisionEvent { mover: key, other: *other });
        }

        let horizontal = if horizontal_contact.is_some() { 0.0 } else { offset.x };
        let vertical = if vertical_contact.is_some() { 0.0 } else { offset.y };
        Ok(CollisionResult {
            horizontal,
            vertical,
            position: current + Vec2::new(horizontal, vertical),
            horizontal_contact,
            vertical_contact,
        })
    }

    /// Append every object indexed inside `area` (edges included)
    pub fn objects_in_area(&self, area: &AABox, results: &mut Vec<ObjectKey>) -> usize {
        self.world.query_range(area, results)
    }

    /// Drain the contacts detected since the last step, oldest first
    pub fn step(&mut self) -> Vec<CollisionEvent> {
        self.events.drain(..).collect()
    }

    fn first_contact(&self, mover: ObjectKey, shape: &Collision, neighbours: &[ObjectKey]) -> Option<ObjectKey> {
        neighbours
            .iter()
            .copied()
            .filter(|other| *other != mover)
            .find(|other| {
                self.objects
                    .get(*other)
                    .is_some_and(|neighbour| shape.check(neighbour.collision()))
            })
    }

    /// Queue a contact for the next `step`; a full buffer keeps what it has
    fn push_event(&mut self, event: CollisionEvent) {
        if self.events.len() >= self.config.max_collision_events {
            log::warn!("PhysicsEngine: collision buffer full, dropping new event");
            return;
        }
        self.events.push_back(event);
    }

    fn check_region(&self, point: Point2) -> Result<(), PhysicsError> {
        if self.world.region().contains_point_strict(point) {
            Ok(())
        } else {
            Err(PhysicsError::OutOfRegion { x: point.x, y: point.y })
        }
    }

    fn object(&self, key: ObjectKey) -> Result<&PhysicsObject, PhysicsError> {
        self.objects.get(key).ok_or(PhysicsError::UnknownObject)
    }

    fn object_mut(&mut self, key: ObjectKey) -> Result<&mut PhysicsObject, PhysicsError> {
        self.objects.get_mut(key).ok_or(PhysicsError::UnknownObject)
    }
}
