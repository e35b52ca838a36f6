//! Static 2-D K-D tree over planar points
//!
//! The build follows <https://godoc.org/code.google.com/p/eaburns/kdtree>:
//! ids are pre-sorted on both dimensions once and split at the median, so the
//! tree is balanced and built in O(n log n).
//!
//! Original code is under New BSD License.
//! Author: Ethan Burns <burns.ethan@gmail.com>

use super::point::{Point, PointList};
use bitvec::prelude::*;

/// KD-Tree implementation for efficient spatial queries
///
/// Points are separated from nodes. Nodes hold only indices into the Points slice.
/// Points with a NaN coordinate are kept in `points` but never indexed, since
/// they can't satisfy any range or radius comparison.
#[derive(Debug)]
pub struct KDTree {
    /// All points in the tree
    pub points: PointList,
    /// Root node of the tree
    pub root: Option<Box<KDTreeNode>>,
}

/// A node in the K-D tree
///
/// Points in the left subtree are strictly less than this node's point on the
/// split dimension, points in the right subtree are greater or equal.
#[derive(Debug)]
pub struct KDTreeNode {
    /// Index of the point associated with this node
    pub point_id: usize,
    /// Indices of points equal to this node's point
    pub equal_ids: Vec<usize>,

    split: usize,
    left: Option<Box<KDTreeNode>>,
    right: Option<Box<KDTreeNode>>,
}

impl KDTree {
    /// Finds all points inside the (min, max) rectangle, borders included
    ///
    /// Same buffer convention as [`KDTree::in_range`].
    pub fn range(&self, min: &Point, max: &Point, mut nodes: Vec<usize>) -> Vec<usize> {
        self.range_recursive(self.root.as_deref(), min, max, &mut nodes);
        nodes
    }

    fn range_recursive(
        &self,
        t: Option<&KDTreeNode>,
        min: &Point,
        max: &Point,
        nodes: &mut Vec<usize>,
    ) {
        let t = match t {
            None => return,
            Some(t) => t,
        };

        let point = &self.points[t.point_id];
        let pivot = point.0[t.split];

        if min.0[t.split] < pivot {
            self.range_recursive(t.left.as_deref(), min, max, nodes);
        }
        if point.inside(min, max) {
            nodes.push(t.point_id);
            nodes.extend_from_slice(&t.equal_ids);
        }
        if max.0[t.split] >= pivot {
            self.range_recursive(t.right.as_deref(), min, max, nodes);
        }
    }

    /// Finds all points within a given distance from the given point, borders included
    ///
    /// To avoid allocation, the `nodes` vector can be pre-allocated with a larger
    /// capacity and re-used across multiple calls.
    pub fn in_range(&self, pt: &Point, dist: f64, mut nodes: Vec<usize>) -> Vec<usize> {
        if dist < 0.0 {
            return nodes;
        }
        self.in_range_recursive(self.root.as_deref(), pt, dist, &mut nodes);
        nodes
    }

    fn in_range_recursive(
        &self,
        t: Option<&KDTreeNode>,
        pt: &Point,
        r: f64,
        nodes: &mut Vec<usize>,
    ) {
        let t = match t {
            None => return,
            Some(t) => t,
        };

        let point = &self.points[t.point_id];
        let diff = pt.0[t.split] - point.0[t.split];

        let (this_side, other_side) = if diff < 0.0 {
            (t.left.as_deref(), t.right.as_deref())
        } else {
            (t.right.as_deref(), t.left.as_deref())
        };

        self.in_range_recursive(this_side, pt, r, nodes);
        // The splitting line is at least as close as anything behind it
        if diff * diff <= r * r {
            if point.sq_dist(pt) <= r * r {
                nodes.push(t.point_id);
                nodes.extend_from_slice(&t.equal_ids);
            }
            self.in_range_recursive(other_side, pt, r, nodes);
        }
    }

    /// Returns the height of the K-D tree
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.height())
    }
}

impl KDTreeNode {
    fn height(&self) -> usize {
        let ht = self.left.as_ref().map_or(0, |l| l.height());
        let rht = self.right.as_ref().map_or(0, |r| r.height());
        ht.max(rht) + 1
    }
}

/// Creates a new K-D tree built from the given points
pub fn new_kd_tree(points: PointList) -> KDTree {
    let root = {
        let sorted = pre_sort(&points);
        let mut scratch = Scratch {
            left: bitvec![0; points.len()],
            taken: bitvec![0; points.len()],
        };
        build_tree(0, &sorted, &mut scratch)
    };

    KDTree { points, root }
}

/// Builds a tree node by finding the median point and recursively building left and right subtrees
fn build_tree(
    depth: usize,
    nodes: &PreSorted<'_>,
    scratch: &mut Scratch,
) -> Option<Box<KDTreeNode>> {
    let split = depth % 2;
    match nodes.cur[split].len() {
        0 => None,
        1 => Some(Box::new(KDTreeNode {
            point_id: nodes.cur[split][0],
            equal_ids: Vec::new(),
            split,
            left: None,
            right: None,
        })),
        _ => {
            let (med, equal, left, right) = nodes.split_med(split, scratch);
            Some(Box::new(KDTreeNode {
                point_id: med,
                equal_ids: equal,
                split,
                left: build_tree(depth + 1, &left, scratch),
                right: build_tree(depth + 1, &right, scratch),
            }))
        }
    }
}

/// Per-point marks reused across splits, cleared after each use
struct Scratch {
    /// Point goes to the left subtree
    left: BitVec,
    /// Point is the median or equal to it
    taken: BitVec,
}

/// Holds nodes pre-sorted on each dimension
struct PreSorted<'a> {
    points: &'a [Point],
    /// Currently sorted set of point IDs by dimension
    cur: [Vec<usize>; 2],
}

/// Pre-sorts indexable (non-NaN) nodes on each dimension
fn pre_sort(points: &[Point]) -> PreSorted<'_> {
    let ids: Vec<usize> = (0..points.len())
        .filter(|&i| !points[i].0[0].is_nan() && !points[i].0[1].is_nan())
        .collect();

    let mut p = PreSorted {
        points,
        cur: [ids.clone(), ids],
    };
    for i in 0..2 {
        // For equal values, sort by the other dimension
        p.cur[i].sort_by(|&a, &b| {
            points[a].0[i]
                .total_cmp(&points[b].0[i])
                .then_with(|| points[a].0[1 - i].total_cmp(&points[b].0[1 - i]))
        });
    }
    p
}

impl<'a> PreSorted<'a> {
    /// Returns the median node on the split dimension and two PreSorted structs
    /// that contain the nodes (still sorted on each dimension) that are less than
    /// and greater than or equal to the median node value on the given splitting dimension.
    fn split_med(
        &self,
        dim: usize,
        scratch: &mut Scratch,
    ) -> (usize, Vec<usize>, PreSorted<'a>, PreSorted<'a>) {
        let cur = &self.cur[dim];
        let mut m = cur.len() / 2;
        while m > 0 && self.points[cur[m - 1]].0[dim] == self.points[cur[m]].0[dim] {
            m -= 1;
        }
        let mut mh = m;
        while mh < cur.len() - 1 && self.points[cur[mh + 1]] == self.points[cur[m]] {
            mh += 1;
        }
        let med = cur[m];
        let equal = cur[m + 1..=mh].to_vec();

        for &n in &cur[..m] {
            scratch.left.set(n, true);
        }
        for &n in &cur[m..=mh] {
            scratch.taken.set(n, true);
        }

        let mut left = PreSorted {
            points: self.points,
            cur: [Vec::new(), Vec::new()],
        };
        left.cur[dim] = cur[..m].to_vec();

        let mut right = PreSorted {
            points: self.points,
            cur: [Vec::new(), Vec::new()],
        };
        right.cur[dim] = cur[mh + 1..].to_vec();

        let other = 1 - dim;
        left.cur[other] = Vec::with_capacity(m);
        right.cur[other] = Vec::with_capacity(cur.len() - mh);

        for &n in &self.cur[other] {
            if scratch.taken[n] {
                continue;
            }
            if scratch.left[n] {
                left.cur[other].push(n);
            } else {
                right.cur[other].push(n);
            }
        }

        for &n in &cur[..m] {
            scratch.left.set(n, false);
        }
        for &n in &cur[m..=mh] {
            scratch.taken.set(n, false);
        }

        (med, equal, left, right)
    }
}
