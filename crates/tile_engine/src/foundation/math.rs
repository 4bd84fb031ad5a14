//! Math utilities and types
//!
//! Provides the 2D math types used by the spatial index and the physics
//! layer. Vector and point types are nalgebra aliases; `AABox` and `Ray2D`
//! are the engine's own primitives.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// Axis-aligned bounding box in the 2D plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox {
    /// Bottom-left corner
    pub min: Point2,
    /// Top-right corner
    pub max: Point2,
}

impl AABox {
    /// Create a box from its two corners
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create a box from a center point and half extents
    pub fn from_center_extents(center: Point2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Create the square starting at `origin` with the given side length
    pub fn square(origin: Point2, length: f32) -> Self {
        Self {
            min: origin,
            max: origin + Vec2::new(length, length),
        }
    }

    /// Width along the x axis
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height along the y axis
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point of the box
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Check whether a point lies in the closed box (edges included)
    pub fn contains_point(&self, point: Point2) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
    }

    /// Check whether a point lies strictly inside the box (edges excluded)
    pub fn contains_point_strict(&self, point: Point2) -> bool {
        self.min.x < point.x
            && point.x < self.max.x
            && self.min.y < point.y
            && point.y < self.max.y
    }

    /// Check whether two closed boxes share at least one point
    pub fn overlaps(&self, other: &AABox) -> bool {
        self.max.x >= other.min.x
            && other.max.x >= self.min.x
            && self.max.y >= other.min.y
            && other.max.y >= self.min.y
    }

    /// Distance along the ray at which it enters the closed box, using the
    /// slab method. A ray starting inside hits at 0.
    pub fn intersect_ray(&self, ray: &Ray2D) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..2 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];
            let (low, high) = (self.min[axis], self.max[axis]);

            if direction == 0.0 {
                // Parallel to this slab
                if origin < low || origin > high {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let (t0, t1) = ((low - origin) * inv, (high - origin) * inv);
            t_min = t_min.max(t0.min(t1));
            t_max = t_max.min(t0.max(t1));
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}

/// A ray in the 2D plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray2D {
    /// The origin point of the ray
    pub origin: Point2,
    /// The direction of the ray (normalized, or zero for a degenerate ray)
    pub direction: Vec2,
}

impl Ray2D {
    /// Creates a new ray with the given origin and direction.
    ///
    /// The direction is normalized; a zero direction stays zero.
    pub fn new(origin: Point2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec2::zeros),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Point2 {
        self.origin + self.direction * t
    }
}
