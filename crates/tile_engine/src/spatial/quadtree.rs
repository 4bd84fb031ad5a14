//! Point quadtree spatial partitioning structure
//!
//! Divides a square region into four quadrants whenever a leaf bucket
//! overflows. Nodes are allocated lazily on first insert into a region and
//! freed bottom-up as soon as their subtree becomes empty.

use crate::config::QuadTreeConfig;
use crate::foundation::math::{AABox, Point2, Vec2};

/// A stored point and its payload
#[derive(Debug, Clone)]
pub(super) struct Entry<Data> {
    pub(super) point: Point2,
    pub(super) data: Data,
}

/// The two node variants
#[derive(Debug, Clone)]
pub(super) enum NodeKind<Data> {
    /// Insertion-ordered bucket of entries
    Leaf { bucket: Vec<Entry<Data>> },
    /// Four exclusively owned child slots, indexed by quadrant
    Inner { children: [Option<Box<Node<Data>>>; 4] },
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub(super) struct Node<Data> {
    /// Bottom-left corner of the node square
    pub(super) origin: Point2,
    /// Side length of the node square
    pub(super) length: f32,
    pub(super) kind: NodeKind<Data>,
}

impl<Data: Clone> Node<Data> {
    fn leaf(origin: Point2, length: f32) -> Self {
        Self {
            origin,
            length,
            kind: NodeKind::Leaf { bucket: Vec::new() },
        }
    }

    pub(super) fn center(&self) -> Point2 {
        self.origin + Vec2::repeat(self.length * 0.5)
    }

    fn region(&self) -> AABox {
        AABox::square(self.origin, self.length)
    }

    /// Get the quadrant index (0-3) of a point and the origin of that quadrant
    fn quadrant(&self, point: Point2) -> (usize, Point2) {
        let half = self.length * 0.5;
        let center = self.center();
        let mut index = 0;
        let mut origin = self.origin;

        // Quadrant layout:
        // 0: -X, -Y    1: -X, +Y
        // 2: +X, -Y    3: +X, +Y
        if point.x >= center.x {
            index |= 2;
            origin.x += half;
        }
        if point.y >= center.y {
            index |= 1;
            origin.y += half;
        }

        (index, origin)
    }

    fn insert(&mut self, entry: Entry<Data>, depth: usize, config: &QuadTreeConfig) {
        if let NodeKind::Leaf { bucket } = &mut self.kind {
            if bucket.len() < config.bucket_size || depth >= config.max_depth {
                bucket.push(entry);
                return;
            }

            // Full leaf: turn it into an inner node and push everything one level down
            let bucket = std::mem::take(bucket);
            log::debug!(
                "QuadTree: splitting leaf at depth {} ({} entries)",
                depth,
                bucket.len()
            );
            self.kind = NodeKind::Inner { children: Default::default() };
            for existing in bucket {
                self.insert(existing, depth, config);
            }
        }

        let (index, child_origin) = self.quadrant(entry.point);
        let half = self.length * 0.5;
        if let NodeKind::Inner { children } = &mut self.kind {
            children[index]
                .get_or_insert_with(|| Box::new(Node::leaf(child_origin, half)))
                .insert(entry, depth + 1, config);
        }
    }

    /// Remove the first entry at `point` accepted by `matches`.
    ///
    /// Consumes the node and hands back what should take its place: `None`
    /// when the node became empty.
    fn remove<F>(mut self: Box<Self>, point: Point2, matches: &F) -> (Option<Box<Self>>, Option<Data>)
    where
        F: Fn(&Data) -> bool,
    {
        let (index, _) = self.quadrant(point);
        let mut removed = None;

        let now_empty = match &mut self.kind {
            NodeKind::Leaf { bucket } => {
                if let Some(position) = bucket
                    .iter()
                    .position(|entry| entry.point == point && matches(&entry.data))
                {
                    removed = Some(bucket.remove(position).data);
                }
                bucket.is_empty()
            }
            NodeKind::Inner { children } => {
                if let Some(child) = children[index].take() {
                    let (child, data) = child.remove(point, matches);
                    children[index] = child;
                    removed = data;
                }
                children.iter().all(Option::is_none)
            }
        };

        if now_empty {
            (None, removed)
        } else {
            (Some(self), removed)
        }
    }

    fn query_range(&self, range: &AABox, results: &mut Vec<Data>) -> usize {
        match &self.kind {
            NodeKind::Leaf { bucket } => {
                let before = results.len();
                results.extend(
                    bucket
                        .iter()
                        .filter(|entry| range.contains_point(entry.point))
                        .map(|entry| entry.data.clone()),
                );
                results.len() - before
            }
            NodeKind::Inner { children } => children
                .iter()
                .flatten()
                .filter(|child| child.region().overlaps(range))
                .map(|child| child.query_range(range, results))
                .sum(),
        }
    }

    fn depth(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { .. } => 0,
            NodeKind::Inner { children } => {
                1 + children.iter().flatten().map(|child| child.depth()).max().unwrap_or(0)
            }
        }
    }
}

/// Point-indexed quadtree over a square region
///
/// `Data` is cloned into query results, so it should be a cheap handle
/// (an id or a key) rather than the object itself.
#[derive(Debug, Clone)]
pub struct QuadTree<Data> {
    pub(super) root: Box<Node<Data>>,
    pub(super) origin: Point2,
    pub(super) length: f32,
    config: QuadTreeConfig,
    len: usize,
}

impl<Data: Clone> QuadTree<Data> {
    /// Create an empty tree over the square starting at `origin` with side `length`
    pub fn new(origin: Point2, length: f32, config: QuadTreeConfig) -> Self {
        Self {
            root: Box::new(Node::leaf(origin, length)),
            origin,
            length,
            config,
            len: 0,
        }
    }

    /// Create an empty tree whose square starts at `bounds.min` and whose
    /// side is the larger side of `bounds`
    pub fn covering(bounds: &AABox, config: QuadTreeConfig) -> Self {
        Self::new(bounds.min, bounds.width().max(bounds.height()), config)
    }

    /// The square covered by the tree
    pub fn region(&self) -> AABox {
        AABox::square(self.origin, self.length)
    }

    /// Density parameters of this tree
    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `data` at `point`.
    ///
    /// Returns `false` when the point is not strictly inside the tree's
    /// square; points on the boundary are rejected.
    pub fn insert(&mut self, point: Point2, data: Data) -> bool {
        if !self.region().contains_point_strict(point) {
            return false;
        }

        self.root.insert(Entry { point, data }, 0, &self.config);
        self.len += 1;
        true
    }

    /// Remove the first entry stored at `point`, whatever its data
    pub fn remove(&mut self, point: Point2) -> Option<Data> {
        self.remove_where(point, &|_: &Data| true)
    }

    /// Remove the first entry stored at `point` whose data equals `data`
    pub fn remove_entry(&mut self, point: Point2, data: &Data) -> Option<Data>
    where
        Data: PartialEq,
    {
        self.remove_where(point, &|stored: &Data| stored == data)
    }

    /// Remove the first entry stored at `point` whose data satisfies `matches`
    pub fn remove_where<F>(&mut self, point: Point2, matches: &F) -> Option<Data>
    where
        F: Fn(&Data) -> bool,
    {
        if !self.region().contains_point_strict(point) {
            return None;
        }

        let root = std::mem::replace(&mut self.root, Box::new(Node::leaf(self.origin, self.length)));
        let (root, removed) = root.remove(point, matches);
        if let Some(root) = root {
            self.root = root;
        } else {
            log::debug!("QuadTree: collapsed to an empty root");
        }

        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Append the data of every point inside `range` (edges included) to
    /// `results`, returning how many were appended
    pub fn query_range(&self, range: &AABox, results: &mut Vec<Data>) -> usize {
        if !self.region().overlaps(range) {
            return 0;
        }
        self.root.query_range(range, results)
    }

    /// Longest path from the root to a leaf; 0 for a single leaf
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.root = Box::new(Node::leaf(self.origin, self.length));
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tree(bucket_size: usize, max_depth: usize) -> QuadTree<u32> {
        QuadTree::new(
            Point2::new(-100.0, -100.0),
            200.0,
            QuadTreeConfig { bucket_size, max_depth },
        )
    }

    fn everything(tree: &QuadTree<u32>) -> Vec<u32> {
        let mut results = Vec::new();
        tree.query_range(&tree.region(), &mut results);
        results.sort_unstable();
        results
    }

    #[test]
    fn test_quadtree_basic_insertion() {
        let mut tree = tree(4, 8);

        assert!(tree.insert(Point2::new(0.0, 0.0), 1));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_boundary_points_are_rejected() {
        let mut tree = tree(4, 8);

        assert!(!tree.insert(Point2::new(-100.0, 0.0), 1));
        assert!(!tree.insert(Point2::new(0.0, 100.0), 2));
        assert!(!tree.insert(Point2::new(100.0, 100.0), 3));
        assert!(!tree.insert(Point2::new(250.0, 0.0), 4));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_quadtree_subdivision() {
        let mut tree = tree(1, 8);

        tree.insert(Point2::new(50.0, 50.0), 1);
        tree.insert(Point2::new(-50.0, -50.0), 2);

        assert_eq!(tree.depth(), 1);
        match &tree.root.kind {
            NodeKind::Inner { children } => {
                assert!(children[3].is_some());
                assert!(children[0].is_some());
                assert!(children[1].is_none());
                assert!(children[2].is_none());
            }
            NodeKind::Leaf { .. } => panic!("root should have split"),
        }
    }

    #[test]
    fn test_center_point_goes_to_upper_right_quadrant() {
        let mut tree = tree(1, 8);

        tree.insert(Point2::new(0.0, 0.0), 1);
        tree.insert(Point2::new(-1.0, -1.0), 2);

        let NodeKind::Inner { children } = &tree.root.kind else {
            panic!("root should have split");
        };
        let upper_right = children[3].as_ref().expect("center point quadrant");
        assert_eq!(upper_right.origin, Point2::new(0.0, 0.0));
        assert_eq!(upper_right.length, 100.0);
    }

    #[test]
    fn test_max_depth_allows_overflow() {
        let mut tree = tree(1, 3);

        for id in 0..10 {
            assert!(tree.insert(Point2::new(10.0, 10.0), id));
        }

        assert_eq!(tree.len(), 10);
        assert_eq!(tree.depth(), 3);
        assert_eq!(everything(&tree), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_query_range_prunes_and_filters() {
        let mut tree = tree(1, 8);
        tree.insert(Point2::new(0.0, 0.0), 1);
        tree.insert(Point2::new(5.0, 0.0), 2);
        tree.insert(Point2::new(50.0, 0.0), 3);
        tree.insert(Point2::new(-60.0, 70.0), 4);

        let mut results = Vec::new();
        let found = tree.query_range(
            &AABox::new(Point2::new(-1.0, -1.0), Point2::new(10.0, 1.0)),
            &mut results,
        );

        assert_eq!(found, 2);
        results.sort_unstable();
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_query_range_includes_box_edges() {
        let mut tree = tree(4, 8);
        tree.insert(Point2::new(2.0, 2.0), 7);

        let mut results = Vec::new();
        tree.query_range(&AABox::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)), &mut results);

        assert_eq!(results, vec![7]);
    }

    #[test]
    fn test_query_range_appends_to_existing_results() {
        let mut tree = tree(4, 8);
        tree.insert(Point2::new(1.0, 1.0), 9);

        let mut results = vec![42];
        let found = tree.query_range(&tree.region(), &mut results);

        assert_eq!(found, 1);
        assert_eq!(results, vec![42, 9]);
    }

    #[test]
    fn test_insert_then_remove_round_trip() {
        let mut tree = tree(2, 8);
        let points = [
            Point2::new(1.0, 1.0),
            Point2::new(-30.0, 12.5),
            Point2::new(75.0, -80.0),
            Point2::new(1.5, 1.0),
        ];
        for (id, point) in points.iter().enumerate() {
            tree.insert(*point, id as u32);
        }

        assert_eq!(tree.remove(points[1]), Some(1));

        let mut results = Vec::new();
        tree.query_range(
            &AABox::from_center_extents(points[1], Vec2::new(1.0, 1.0)),
            &mut results,
        );
        assert!(results.is_empty());
        assert_eq!(everything(&tree), vec![0, 2, 3]);
    }

    #[test]
    fn test_remove_missing_point_is_noop() {
        let mut tree = tree(1, 8);
        tree.insert(Point2::new(10.0, 10.0), 1);
        tree.insert(Point2::new(-10.0, -10.0), 2);
        let depth = tree.depth();

        assert_eq!(tree.remove(Point2::new(10.0, 11.0)), None);
        assert_eq!(tree.remove(Point2::new(500.0, 0.0)), None);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.depth(), depth);
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut tree = tree(4, 8);
        let point = Point2::new(3.0, 3.0);
        tree.insert(point, 1);
        tree.insert(point, 2);

        assert_eq!(tree.remove(point), Some(1));
        assert_eq!(everything(&tree), vec![2]);
    }

    #[test]
    fn test_remove_entry_matches_data() {
        let mut tree = tree(1, 4);
        let point = Point2::new(3.0, 3.0);
        tree.insert(point, 1);
        tree.insert(point, 2);
        tree.insert(point, 3);

        assert_eq!(tree.remove_entry(point, &2), Some(2));
        assert_eq!(tree.remove_entry(point, &2), None);
        assert_eq!(everything(&tree), vec![1, 3]);
    }

    #[test]
    fn test_remove_where_uses_predicate() {
        let mut tree = tree(1, 4);
        let point = Point2::new(-2.0, 5.0);
        tree.insert(point, 10);
        tree.insert(point, 21);
        tree.insert(point, 30);

        assert_eq!(tree.remove_where(point, &|data: &u32| data % 2 == 1), Some(21));
        assert_eq!(tree.remove_where(point, &|data: &u32| data % 2 == 1), None);
        assert_eq!(tree.remove_where(Point2::new(2.0, 5.0), &|_: &u32| true), None);
        assert_eq!(everything(&tree), vec![10, 30]);
    }

    #[test]
    fn test_removing_everything_collapses_tree() {
        let mut tree = tree(1, 10);
        let points: Vec<Point2> = (0..20)
            .map(|i| Point2::new(i as f32 * 7.5 - 70.0, 40.0 - i as f32 * 3.0))
            .collect();
        for (id, point) in points.iter().enumerate() {
            assert!(tree.insert(*point, id as u32));
        }
        assert!(tree.depth() > 0);

        for point in &points {
            assert!(tree.remove(*point).is_some());
        }

        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);

        // Idempotent: removing from the empty tree keeps it a single leaf
        assert_eq!(tree.remove(points[0]), None);
        assert_eq!(tree.depth(), 0);
        assert!(matches!(tree.root.kind, NodeKind::Leaf { .. }));
    }

    #[test]
    fn test_partial_removal_prunes_empty_branches() {
        let mut tree = tree(1, 10);
        tree.insert(Point2::new(90.0, 90.0), 1);
        tree.insert(Point2::new(91.0, 91.0), 2);
        tree.insert(Point2::new(-90.0, -90.0), 3);
        assert!(tree.depth() > 2);

        tree.remove(Point2::new(90.0, 90.0));
        tree.remove(Point2::new(91.0, 91.0));

        let NodeKind::Inner { children } = &tree.root.kind else {
            panic!("root should still be inner");
        };
        assert!(children[3].is_none());
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_random_interleaved_insert_remove_keeps_count() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut tree = tree(3, 12);
        let mut live: Vec<(Point2, u32)> = Vec::new();

        for id in 0..2000u32 {
            if !live.is_empty() && rng.gen_bool(0.35) {
                let index = rng.gen_range(0..live.len());
                let (point, data) = live.swap_remove(index);
                assert_eq!(tree.remove_entry(point, &data), Some(data));
            } else {
                let point = Point2::new(rng.gen_range(-99.0..99.0), rng.gen_range(-99.0..99.0));
                assert!(tree.insert(point, id));
                live.push((point, id));
            }
        }

        let mut expected: Vec<u32> = live.iter().map(|(_, data)| *data).collect();
        expected.sort_unstable();
        assert_eq!(tree.len(), live.len());
        assert_eq!(everything(&tree), expected);
    }

    #[test]
    fn test_covering_uses_larger_side() {
        let bounds = AABox::new(Point2::new(0.0, 10.0), Point2::new(30.0, 20.0));
        let tree: QuadTree<u32> = QuadTree::covering(&bounds, QuadTreeConfig::default());

        assert_eq!(tree.region(), AABox::new(Point2::new(0.0, 10.0), Point2::new(30.0, 40.0)));
    }

    #[test]
    fn test_clear() {
        let mut tree = tree(1, 8);
        tree.insert(Point2::new(1.0, 1.0), 1);
        tree.insert(Point2::new(-1.0, 1.0), 2);

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(everything(&tree).is_empty());
    }
}
