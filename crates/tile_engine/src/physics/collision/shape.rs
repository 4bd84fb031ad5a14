//! Collision shape variants
//!
//! Shapes are built in model space (centered on the origin) and translated
//! to their owner's position when assigned to a `PhysicsObject`.

use super::primitives::{
    intersect_circle_circle, intersect_rect_circle, intersect_rect_rect, Circle, Rectangle,
};
use crate::foundation::math::{Point2, Vec2};

/// Kind of a collision shape, without its geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionType {
    /// No shape
    None,
    /// Rectangle
    Rectangle,
    /// Circle
    Circle,
}

/// Collision shape of a physics object
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Collision {
    /// Never collides with anything
    #[default]
    None,
    /// Oriented rectangle
    Rectangle(Rectangle),
    /// Circle
    Circle(Circle),
}

impl Collision {
    /// Axis-aligned rectangle of the given size centered on the origin
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::Rectangle(Rectangle::new(Point2::origin(), width, height))
    }

    /// Circle of the given radius centered on the origin
    pub fn circle(radius: f32) -> Self {
        Self::Circle(Circle::new(Point2::origin(), radius))
    }

    /// Kind of this shape
    pub fn kind(&self) -> CollisionType {
        match self {
            Self::None => CollisionType::None,
            Self::Rectangle(_) => CollisionType::Rectangle,
            Self::Circle(_) => CollisionType::Circle,
        }
    }

    /// Whether this shape can collide at all
    pub fn is_solid(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Move the shape by an offset
    pub fn translate(&mut self, offset: Vec2) {
        match self {
            Self::None => {}
            Self::Rectangle(rect) => rect.translate(offset),
            Self::Circle(circle) => circle.translate(offset),
        }
    }

    /// Copy of the shape moved by an offset
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut moved = *self;
        moved.translate(offset);
        moved
    }

    /// Rotate the shape clockwise around its own center
    pub fn rotate(&mut self, angle: f32) {
        match self {
            Self::Rectangle(rect) => rect.rotate(angle),
            // Circles are rotation invariant
            Self::None | Self::Circle(_) => {}
        }
    }

    /// Check whether two shapes overlap. Touching shapes do not.
    pub fn check(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, _) | (_, Self::None) => false,
            (Self::Rectangle(a), Self::Rectangle(b)) => intersect_rect_rect(a, b),
            (Self::Rectangle(rect), Self::Circle(circle))
            | (Self::Circle(circle), Self::Rectangle(rect)) => intersect_rect_circle(rect, circle),
            (Self::Circle(a), Self::Circle(b)) => intersect_circle_circle(a, b),
        }
    }
}
