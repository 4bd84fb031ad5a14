//! Spatial partitioning data structures
//!
//! Provides a point-indexed quadtree for range queries and ray casting
//! in the 2D world plane.

mod quadtree;
mod ray_cast;

pub use quadtree::QuadTree;
