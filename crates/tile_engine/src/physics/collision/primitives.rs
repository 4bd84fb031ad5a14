//! Primitive collision shapes and intersection algorithms
//!
//! Provides the 2D primitives (rectangles, circles) with their pairwise
//! intersection tests. Shapes that only touch do not intersect, so a body
//! resting against a wall can still slide along it.

use crate::foundation::math::{Point2, Vec2};

/// A rectangle in the 2D plane defined by its four corners
///
/// ```text
/// D   C
/// A   B
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// Corners in counter-clockwise order starting bottom-left
    pub corners: [Point2; 4],
}

impl Rectangle {
    /// Creates an axis-aligned rectangle from its center and size
    pub fn new(center: Point2, width: f32, height: f32) -> Self {
        let half_x = width * 0.5;
        let half_y = height * 0.5;
        Self {
            corners: [
                Point2::new(center.x - half_x, center.y - half_y),
                Point2::new(center.x + half_x, center.y - half_y),
                Point2::new(center.x + half_x, center.y + half_y),
                Point2::new(center.x - half_x, center.y + half_y),
            ],
        }
    }

    /// Center point of the rectangle
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.corners[0], &self.corners[2])
    }

    /// Move the rectangle by an offset
    pub fn translate(&mut self, offset: Vec2) {
        for corner in &mut self.corners {
            *corner += offset;
        }
    }

    /// Rotate the rectangle clockwise around its center by `angle` radians
    pub fn rotate(&mut self, angle: f32) {
        let center = self.center();
        let (sin, cos) = angle.sin_cos();
        for corner in &mut self.corners {
            let local = *corner - center;
            *corner = center + Vec2::new(local.x * cos + local.y * sin, -local.x * sin + local.y * cos);
        }
    }

    /// The four edges as `(start, end)` pairs
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let [a, b, c, d] = self.corners;
        [(a, b), (b, c), (c, d), (d, a)]
    }

    /// Check whether a point lies inside the rectangle (edges included)
    pub fn contains_point(&self, point: Point2) -> bool {
        let [a, b, _, d] = self.corners;
        let am = point - a;
        let ab = b - a;
        let ad = d - a;

        let along_ab = am.dot(&ab);
        let along_ad = am.dot(&ad);
        (0.0..=ab.norm_squared()).contains(&along_ab) && (0.0..=ad.norm_squared()).contains(&along_ad)
    }

    /// Interval covered by the corners when projected on `axis`
    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.corners
            .iter()
            .map(|corner| corner.coords.dot(&axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), value| {
                (min.min(value), max.max(value))
            })
    }

    /// The two edge directions, which are the separating axis candidates
    fn axes(&self) -> [Vec2; 2] {
        let [a, b, _, d] = self.corners;
        [b - a, d - a]
    }
}

/// A circle in the 2D plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point
    pub center: Point2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle
    pub fn new(center: Point2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Move the circle by an offset
    pub fn translate(&mut self, offset: Vec2) {
        self.center += offset;
    }

    /// Check whether a point lies strictly inside the circle
    pub fn contains_point(&self, point: Point2) -> bool {
        (point - self.center).norm_squared() < self.radius * self.radius
    }
}

/// Check for intersection between two rectangles
///
/// Separating axis test over both rectangles' edge directions; for
/// axis-aligned rectangles this is the overlap of their x and y intervals.
pub fn intersect_rect_rect(a: &Rectangle, b: &Rectangle) -> bool {
    a.axes().into_iter().chain(b.axes()).all(|axis| {
        if axis == Vec2::zeros() {
            return true;
        }
        let (a_min, a_max) = a.project(axis);
        let (b_min, b_max) = b.project(axis);
        a_max > b_min && b_max > a_min
    })
}

/// Check for intersection between a rectangle and a circle
pub fn intersect_rect_circle(rect: &Rectangle, circle: &Circle) -> bool {
    if rect.contains_point(circle.center) {
        return true;
    }
    if rect.corners.iter().any(|corner| circle.contains_point(*corner)) {
        return true;
    }
    rect.edges()
        .iter()
        .any(|(start, end)| intersect_circle_segment(circle, *start, *end))
}

/// Check for intersection between two circles
pub fn intersect_circle_circle(a: &Circle, b: &Circle) -> bool {
    let radius_sum = a.radius + b.radius;
    (a.center - b.center).norm_squared() < radius_sum * radius_sum
}

/// Check whether the segment `start..end` passes strictly inside the circle
pub fn intersect_circle_segment(circle: &Circle, start: Point2, end: Point2) -> bool {
    let segment = end - start;
    let length_squared = segment.norm_squared();
    let closest = if length_squared == 0.0 {
        start
    } else {
        let t = ((circle.center - start).dot(&segment) / length_squared).clamp(0.0, 1.0);
        start + segment * t
    };
    circle.contains_point(closest)
}
