//! Parametric ray traversal of the quadtree
//!
//! Walks the quadrants a ray passes through in hit order using only the
//! ray's entry/exit parameters per node (Revelles et al., "An efficient
//! parametric algorithm for octree traversal", reduced to two dimensions).
//! Negative direction components are mirrored about the tree center so that
//! every case becomes a ray with non-negative direction; the mirror mask is
//! applied back only when indexing a node's real children.

use bitflags::bitflags;

use super::quadtree::{Node, NodeKind, QuadTree};
use crate::foundation::math::{Point2, Ray2D, Vec2};

bitflags! {
    /// Axes along which the ray was mirrored
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Mirror: u8 {
        const Y = 0b01;
        const X = 0b10;
    }
}

/// Sentinel state: the ray has left the node
const EXIT: u8 = 4;

/// Entry and exit parameters of the ray for one node
#[derive(Debug, Clone, Copy)]
struct Span {
    tx0: f32,
    ty0: f32,
    tx1: f32,
    ty1: f32,
}

impl Span {
    const fn new(tx0: f32, ty0: f32, tx1: f32, ty1: f32) -> Self {
        Self { tx0, ty0, tx1, ty1 }
    }
}

/// Per-cast traversal state
struct Walk {
    /// Ray origin after mirroring
    origin: Point2,
    /// Axes on which the ray has no direction component
    parallel_x: bool,
    parallel_y: bool,
    mirror: Mirror,
}

impl<Data: Clone> QuadTree<Data> {
    /// Append the data of every leaf the ray passes through, in travel
    /// order, returning how many entries were appended.
    ///
    /// Leaves are reported whole: no per-point test is done, so callers
    /// that need exact hits test the returned candidates themselves.
    /// Nodes entirely behind the ray origin are skipped. A ray with a zero
    /// direction hits nothing.
    pub fn ray_cast(&self, ray: &Ray2D, results: &mut Vec<Data>) -> usize {
        if ray.direction == Vec2::zeros() {
            log::trace!("QuadTree: ignoring ray cast with zero direction");
            return 0;
        }

        let center = self.region().center();
        let mut origin = ray.origin;
        let mut direction = ray.direction;
        let mut mirror = Mirror::empty();

        if direction.x < 0.0 {
            origin.x = 2.0 * center.x - origin.x;
            direction.x = -direction.x;
            mirror |= Mirror::X;
        }
        if direction.y < 0.0 {
            origin.y = 2.0 * center.y - origin.y;
            direction.y = -direction.y;
            mirror |= Mirror::Y;
        }
        // -0.0 would turn into a negative infinity below
        let direction = direction.abs();

        let min = self.origin;
        let max = self.origin + Vec2::repeat(self.length);
        let (tx0, tx1) = slab(min.x, max.x, origin.x, direction.x);
        let (ty0, ty1) = slab(min.y, max.y, origin.y, direction.y);

        if tx0.max(ty0) >= tx1.min(ty1) {
            return 0;
        }

        let walk = Walk {
            origin,
            parallel_x: direction.x == 0.0,
            parallel_y: direction.y == 0.0,
            mirror,
        };

        let before = results.len();
        walk.visit(&self.root, Span::new(tx0, ty0, tx1, ty1), results);
        results.len() - before
    }
}

/// Parameters at which the ray enters and leaves the slab `[lo, hi]`
fn slab(lo: f32, hi: f32, origin: f32, direction: f32) -> (f32, f32) {
    if direction == 0.0 {
        // Parallel: inside the slab for every t, or never
        if lo < origin && origin < hi {
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            (f32::INFINITY, f32::NEG_INFINITY)
        }
    } else {
        let inverse = 1.0 / direction;
        ((lo - origin) * inverse, (hi - origin) * inverse)
    }
}

/// First quadrant entered, from the entry plane and the midpoint parameters
fn first_node(tx0: f32, ty0: f32, txm: f32, tym: f32) -> u8 {
    if tx0 > ty0 {
        // Entered through the x = x0 side
        if tym < tx0 { 1 } else { 0 }
    } else if txm < ty0 {
        2
    } else {
        0
    }
}

/// Next quadrant: `x_next` when the ray leaves through the x plane first
fn next_node(tx: f32, x_next: u8, ty: f32, y_next: u8) -> u8 {
    if tx < ty { x_next } else { y_next }
}

impl Walk {
    fn midpoint(parallel: bool, t0: f32, t1: f32, origin: f32, center: f32) -> f32 {
        if parallel {
            // Never crosses the midline; which half it stays in depends on the origin
            if origin < center { f32::INFINITY } else { f32::NEG_INFINITY }
        } else {
            0.5 * (t0 + t1)
        }
    }

    fn visit<Data: Clone>(&self, node: &Node<Data>, span: Span, results: &mut Vec<Data>) {
        if span.tx1 < 0.0 || span.ty1 < 0.0 {
            return;
        }

        let children = match &node.kind {
            NodeKind::Leaf { bucket } => {
                results.extend(bucket.iter().map(|entry| entry.data.clone()));
                return;
            }
            NodeKind::Inner { children } => children,
        };

        // Parallel axes are never mirrored, so the real center is valid there
        let center = node.center();
        let Span { tx0, ty0, tx1, ty1 } = span;
        let txm = Self::midpoint(self.parallel_x, tx0, tx1, self.origin.x, center.x);
        let tym = Self::midpoint(self.parallel_y, ty0, ty1, self.origin.y, center.y);

        let mut current = first_node(tx0, ty0, txm, tym);
        while current < EXIT {
            let (child_span, next) = match current {
                0 => (Span::new(tx0, ty0, txm, tym), next_node(txm, 2, tym, 1)),
                1 => (Span::new(tx0, tym, txm, ty1), next_node(txm, 3, ty1, EXIT)),
                2 => (Span::new(txm, ty0, tx1, tym), next_node(tx1, EXIT, tym, 3)),
                _ => (Span::new(txm, tym, tx1, ty1), EXIT),
            };

            let index = usize::from(current ^ self.mirror.bits());
            if let Some(child) = &children[index] {
                self.visit(child, child_span, results);
            }
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuadTreeConfig;
    use crate::foundation::math::AABox;

    const A: char = 'A';
    const B: char = 'B';

    fn split_tree() -> QuadTree<char> {
        let mut tree = QuadTree::new(
            Point2::new(-16.0, -16.0),
            32.0,
            QuadTreeConfig { bucket_size: 1, max_depth: 8 },
        );
        assert!(tree.insert(Point2::new(5.0, 0.0), A));
        assert!(tree.insert(Point2::new(10.0, 0.0), B));
        tree
    }

    fn cast(tree: &QuadTree<char>, origin: Point2, direction: Vec2) -> Vec<char> {
        let mut results = Vec::new();
        let count = tree.ray_cast(&Ray2D::new(origin, direction), &mut results);
        assert_eq!(count, results.len());
        results
    }

    #[test]
    fn test_hits_in_travel_order() {
        let tree = split_tree();
        assert!(tree.depth() >= 2);

        assert_eq!(cast(&tree, Point2::new(0.0, 0.0), Vec2::new(1.0, 0.0)), vec![A, B]);
    }

    #[test]
    fn test_negative_direction_is_mirrored() {
        let tree = split_tree();

        assert_eq!(cast(&tree, Point2::new(15.0, 0.0), Vec2::new(-1.0, 0.0)), vec![B, A]);
    }

    #[test]
    fn test_ray_from_outside_enters_tree() {
        let tree = split_tree();

        assert_eq!(cast(&tree, Point2::new(-40.0, 0.5), Vec2::new(1.0, 0.0)), vec![A, B]);
        assert_eq!(cast(&tree, Point2::new(40.0, 0.5), Vec2::new(-1.0, 0.0)), vec![B, A]);
    }

    #[test]
    fn test_ray_pointing_away_hits_nothing() {
        let tree = split_tree();

        assert!(cast(&tree, Point2::new(40.0, 0.0), Vec2::new(1.0, 0.0)).is_empty());
        assert!(cast(&tree, Point2::new(0.0, 40.0), Vec2::new(0.0, 1.0)).is_empty());
    }

    #[test]
    fn test_ray_missing_occupied_quadrants() {
        let tree = split_tree();

        // Travels through the empty lower half only
        assert!(cast(&tree, Point2::new(-15.0, -8.0), Vec2::new(1.0, 0.0)).is_empty());
    }

    #[test]
    fn test_vertical_rays_both_ways() {
        let mut tree = QuadTree::new(
            Point2::new(0.0, 0.0),
            64.0,
            QuadTreeConfig { bucket_size: 1, max_depth: 8 },
        );
        tree.insert(Point2::new(3.0, 5.0), 1);
        tree.insert(Point2::new(3.0, 20.0), 2);
        tree.insert(Point2::new(3.0, 50.0), 3);
        tree.insert(Point2::new(40.0, 50.0), 4);

        let mut up = Vec::new();
        tree.ray_cast(&Ray2D::new(Point2::new(3.0, 1.0), Vec2::new(0.0, 1.0)), &mut up);
        assert_eq!(up, vec![1, 2, 3]);

        let mut down = Vec::new();
        tree.ray_cast(&Ray2D::new(Point2::new(3.0, 63.0), Vec2::new(0.0, -1.0)), &mut down);
        assert_eq!(down, vec![3, 2, 1]);
    }

    #[test]
    fn test_diagonal_ray_visits_cells_in_order() {
        let mut tree = QuadTree::new(
            Point2::new(0.0, 0.0),
            16.0,
            QuadTreeConfig { bucket_size: 1, max_depth: 8 },
        );
        tree.insert(Point2::new(2.0, 2.0), 1);
        tree.insert(Point2::new(14.0, 14.0), 2);
        tree.insert(Point2::new(14.0, 2.0), 3);

        let mut forward = Vec::new();
        tree.ray_cast(&Ray2D::new(Point2::new(0.5, 0.6), Vec2::new(1.0, 1.0)), &mut forward);
        assert_eq!(forward, vec![1, 2]);

        let mut backward = Vec::new();
        tree.ray_cast(&Ray2D::new(Point2::new(15.5, 15.4), Vec2::new(-1.0, -1.0)), &mut backward);
        // Crosses y = 8 just right of x = 8, so it clips the lower right quadrant
        assert_eq!(backward, vec![2, 3, 1]);
    }

    #[test]
    fn test_leaf_root_returns_everything_on_hit() {
        let mut tree = QuadTree::new(Point2::new(0.0, 0.0), 10.0, QuadTreeConfig::default());
        tree.insert(Point2::new(1.0, 9.0), 1);
        tree.insert(Point2::new(9.0, 1.0), 2);

        let mut results = Vec::new();
        tree.ray_cast(&Ray2D::new(Point2::new(5.0, -5.0), Vec2::new(0.0, 1.0)), &mut results);
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_zero_direction_hits_nothing() {
        let tree = split_tree();
        assert!(cast(&tree, Point2::new(5.0, 0.0), Vec2::zeros()).is_empty());
    }

    #[test]
    fn test_results_are_candidates_of_a_range_along_the_ray() {
        let tree = split_tree();
        let mut along = Vec::new();
        tree.query_range(
            &AABox::new(Point2::new(0.0, -0.1), Point2::new(16.0, 0.1)),
            &mut along,
        );

        let hits = cast(&tree, Point2::new(0.0, 0.0), Vec2::new(1.0, 0.0));
        assert!(along.iter().all(|data| hits.contains(data)));
    }
}
