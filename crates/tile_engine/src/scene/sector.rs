//! World sector
//!
//! A sector is one playable area. Besides its physics engine it keeps two
//! more quadtrees over the same ground: point lights, fetched by the
//! camera's view each frame, and interactables, picked by ray casting
//! against the area each one occupies.

use crate::config::PhysicsConfig;
use crate::foundation::math::{AABox, Point2, Ray2D, Vec2, Vec3};
use crate::physics::{ObjectKey, PhysicsEngine, PhysicsError, PhysicsObject};
use crate::spatial::QuadTree;

/// Camera view boxes are enlarged by this factor so lights just outside the
/// frame still contribute
const LIGHT_VIEW_MARGIN: f32 = 1.4;

/// World sector errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SectorError {
    /// Physics engine error
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// A light or an interactable was placed outside the sector
    #[error("Point ({x}, {y}) is outside the sector")]
    OutOfRegion {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
}

/// An interactable and the area a ray must enter to pick it
#[derive(Debug, Clone)]
struct Pickable<I> {
    item: I,
    area: AABox,
}

/// A playable area holding physics objects, point lights `L` and
/// interactables `I`
pub struct WorldSector<L, I> {
    physics: PhysicsEngine,
    point_lights: QuadTree<L>,
    // Indexed at the center of their area
    interactables: QuadTree<Pickable<I>>,
}

impl<L: Clone, I: Clone> WorldSector<L, I> {
    /// Create an empty sector over `bounds`
    pub fn new(bounds: AABox, approx_object_count: usize, config: &PhysicsConfig) -> Result<Self, SectorError> {
        let physics = PhysicsEngine::new(bounds, approx_object_count, config)?;
        log::debug!("WorldSector created with {} object slots", approx_object_count);

        Ok(Self {
            physics,
            point_lights: QuadTree::covering(&bounds, config.quadtree),
            interactables: QuadTree::covering(&bounds, config.quadtree),
        })
    }

    /// The sector's physics engine
    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    /// Mutable access to the sector's physics engine
    pub fn physics_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.physics
    }

    /// Register a physics object with the sector
    pub fn add_object(&mut self, object: PhysicsObject) -> Result<ObjectKey, SectorError> {
        Ok(self.physics.add_object(object)?)
    }

    /// Remove a physics object from the sector
    pub fn remove_object(&mut self, key: ObjectKey) -> Option<PhysicsObject> {
        self.physics.despawn(key)
    }

    /// Place a point light
    pub fn add_point_light(&mut self, light: L, point: Point2) -> Result<(), SectorError> {
        if self.point_lights.insert(point, light) {
            Ok(())
        } else {
            Err(SectorError::OutOfRegion { x: point.x, y: point.y })
        }
    }

    /// Remove the light placed at `point`
    pub fn remove_point_light(&mut self, point: Point2, light: &L) -> Option<L>
    where
        L: PartialEq,
    {
        self.point_lights.remove_entry(point, light)
    }

    /// Lights placed inside `view`
    pub fn lights_in_view(&self, view: &AABox) -> Vec<L> {
        let mut lights = Vec::new();
        self.point_lights.query_range(view, &mut lights);
        lights
    }

    /// Lights visible from a camera looking straight down from `position`
    /// with the given aspect `ratio` and vertical field of view `fov` in radians
    pub fn lights_in_camera_view(&self, position: Vec3, ratio: f32, fov: f32) -> Vec<L> {
        self.lights_in_view(&camera_view(position, ratio, fov))
    }

    /// Number of placed lights
    pub fn light_count(&self) -> usize {
        self.point_lights.len()
    }

    /// Place an interactable occupying `area`; the center of `area` must lie
    /// inside the sector
    pub fn add_interactable(&mut self, item: I, area: AABox) -> Result<(), SectorError> {
        let point = area.center();
        if self.interactables.insert(point, Pickable { item, area }) {
            Ok(())
        } else {
            Err(SectorError::OutOfRegion { x: point.x, y: point.y })
        }
    }

    /// Remove the interactable placed over `area`
    pub fn remove_interactable(&mut self, area: &AABox, item: &I) -> Option<I>
    where
        I: PartialEq,
    {
        self.interactables
            .remove_where(area.center(), &|stored: &Pickable<I>| stored.area == *area && stored.item == *item)
            .map(|stored| stored.item)
    }

    /// Nearest interactable whose area the ray enters within `max_distance`.
    ///
    /// The quadtree narrows the search to the leaves the ray crosses; each
    /// candidate's area is then tested against the ray itself.
    pub fn ray_cast(&self, ray: &Ray2D, max_distance: f32) -> Option<I> {
        let mut candidates = Vec::new();
        self.interactables.ray_cast(ray, &mut candidates);
        log::trace!("WorldSector::ray_cast: {} candidates", candidates.len());

        candidates
            .into_iter()
            .filter_map(|candidate| {
                let t = candidate.area.intersect_ray(ray)?;
                (t <= max_distance).then_some((t, candidate.item))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, item)| item)
    }
}

/// Ground area seen by a camera looking straight down, with a margin
fn camera_view(position: Vec3, ratio: f32, fov: f32) -> AABox {
    let half_height = 3.0 * position.z * (fov * 0.5).tan() * LIGHT_VIEW_MARGIN;
    AABox::from_center_extents(
        Point2::new(position.x, position.y),
        Vec2::new(half_height * ratio, half_height),
    )
}
