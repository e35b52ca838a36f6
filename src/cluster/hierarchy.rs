//! Multi-zoom cluster hierarchy
//!
//! Points are projected and indexed once at `max_zoom + 1`, then every zoom
//! level is produced by clustering the level right above it:
//!
//! ```text
//! for zoom from max_zoom down to min_zoom
//!    r = radius / (extent * 2^zoom)
//!    for each node P of level zoom + 1 not yet visited at zoom
//!       mark P as visited
//!       Neighbors = unvisited nodes of level zoom + 1 within r of P
//!       if count(P) + count(Neighbors) >= minPoints and Neighbors is not empty
//!          mark Neighbors as visited, parent of P and Neighbors = new cluster C
//!          C = weighted centroid of P and Neighbors
//!          emit C into level zoom
//!       else
//!          mark Neighbors as visited
//!          emit P and Neighbors into level zoom unchanged
//! ```
//!
//! A built [`Hierarchy`] is never mutated again; a reload builds a new one.

use super::error::{ClusterError, Result};
use super::kdtree::{KDTree, new_kd_tree};
use super::options::ClusterOptions;
use super::point::{BoundingBox, Feature, IndexNode, LatLng, NodeKind, Point};
use super::projection::{
    bounded_lat_to_y, bounded_lng_to_x, fround, lat_to_y, lng_to_x, x_to_lng, y_to_lat,
};
use std::time::Instant;

/// Low bits of a cluster id holding the origin zoom
const ZOOM_BITS: u32 = 5;
const ZOOM_MASK: usize = (1 << ZOOM_BITS) - 1;

/// Encodes the node index and the level a cluster originated at
///
/// Layout: `(origin_index << 5) + origin_zoom + total_points`. The offset keeps
/// cluster ids apart from point ids, which are `0..total_points`.
pub(crate) fn encode_cluster_id(origin_index: usize, origin_zoom: u8, total_points: usize) -> usize {
    (origin_index << ZOOM_BITS) + usize::from(origin_zoom) + total_points
}

/// Inverse of [`encode_cluster_id`], `None` for point ids
pub(crate) fn decode_cluster_id(cluster_id: usize, total_points: usize) -> Option<(usize, u8)> {
    let rel = cluster_id.checked_sub(total_points)?;
    // Masked to five bits, always fits
    Some((rel >> ZOOM_BITS, (rel & ZOOM_MASK) as u8))
}

/// Nodes of one zoom level and a K-D tree over their positions
///
/// Nodes are sorted by (y, x), tree point ids are node indices.
#[derive(Debug)]
struct ZoomLevel {
    nodes: Vec<IndexNode>,
    tree: KDTree,
}

impl ZoomLevel {
    fn new(mut nodes: Vec<IndexNode>) -> Self {
        nodes.sort_by(|a, b| {
            a.pos.0[1]
                .total_cmp(&b.pos.0[1])
                .then_with(|| a.pos.0[0].total_cmp(&b.pos.0[0]))
        });
        let tree = new_kd_tree(nodes.iter().map(|n| n.pos).collect());
        Self { nodes, tree }
    }
}

/// One fully built generation of clusters for a set of points
#[derive(Debug)]
pub struct Hierarchy<T> {
    options: ClusterOptions,
    points: Vec<T>,
    /// Level `i` is zoom `min_zoom + i`, the last level holds the input points
    levels: Vec<ZoomLevel>,
}

impl<T> Hierarchy<T> {
    /// Hierarchy with no points and no levels, every query comes back empty
    pub(crate) fn empty(options: ClusterOptions) -> Self {
        Self {
            options,
            points: Vec::new(),
            levels: Vec::new(),
        }
    }

    /// Builds all zoom levels for `points`
    ///
    /// `cancelled` is polled once the points are projected and then before
    /// each zoom level; once it returns true the build is abandoned and `None`
    /// is returned.
    pub(crate) fn build<F>(
        points: Vec<T>,
        accessor: &F,
        options: ClusterOptions,
        cancelled: &dyn Fn() -> bool,
    ) -> Option<Self>
    where
        F: Fn(&T) -> LatLng,
    {
        let started = Instant::now();
        let total = points.len();

        let leaves = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let coords = accessor(p);
                let pos = Point([fround(lng_to_x(coords.lng)), fround(lat_to_y(coords.lat))]);
                IndexNode::leaf(pos, i)
            })
            .collect::<Vec<_>>();

        if cancelled() {
            log::debug!("Clustering of {} points cancelled before indexing", total);
            return None;
        }

        let mut current = ZoomLevel::new(leaves);
        let mut levels =
            Vec::with_capacity(usize::from(options.max_zoom - options.min_zoom) + 2);

        for zoom in (options.min_zoom..=options.max_zoom).rev() {
            if cancelled() {
                log::debug!("Clustering of {} points cancelled at zoom {}", total, zoom);
                return None;
            }
            let clustered = cluster_level(&mut current, zoom, total, &options);
            log::debug!(
                "Zoom {}: {} nodes clustered into {}",
                zoom,
                current.nodes.len(),
                clustered.len()
            );
            levels.push(std::mem::replace(&mut current, ZoomLevel::new(clustered)));
        }
        levels.push(current);
        levels.reverse();

        log::info!(
            "Clustered {} points on zooms {}..={} in {:?}",
            total,
            options.min_zoom,
            options.max_zoom,
            started.elapsed()
        );

        Some(Self {
            options,
            points,
            levels,
        })
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Points of the load this hierarchy was built from
    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn level(&self, zoom: u8) -> Option<&ZoomLevel> {
        let i = zoom.checked_sub(self.options.min_zoom)?;
        self.levels.get(usize::from(i))
    }

    fn feature(&self, node: &IndexNode) -> Feature<'_, T> {
        match node.kind {
            NodeKind::Leaf => Feature::Point {
                id: node.id,
                payload: &self.points[node.id],
            },
            NodeKind::Cluster { count } => Feature::Cluster {
                id: node.id,
                count,
                lat: y_to_lat(node.pos.0[1]),
                lng: x_to_lng(node.pos.0[0]),
            },
        }
    }

    /// Returns points and clusters inside the box at the given map zoom
    ///
    /// `zoom` is floored and clamped into `[min_zoom, max_zoom + 1]`.
    /// Longitudes are wrapped, so a box with `west_lng > east_lng` crosses the
    /// antimeridian; a span of 360° or more covers the whole world.
    /// The order of the result is unspecified.
    pub fn get_clusters(
        &self,
        zoom: f64,
        west_lng: f64,
        south_lat: f64,
        east_lng: f64,
        north_lat: f64,
    ) -> Vec<Feature<'_, T>> {
        let level = match self.level(self.options.limit_zoom(zoom)) {
            None => return Vec::new(),
            Some(level) => level,
        };

        let mut min_x = bounded_lng_to_x(west_lng);
        // 180 would wrap around to the west edge
        let mut max_x = if east_lng == 180.0 {
            1.0
        } else {
            bounded_lng_to_x(east_lng)
        };
        let min_y = bounded_lat_to_y(north_lat);
        let max_y = bounded_lat_to_y(south_lat);

        if east_lng - west_lng >= 360.0 {
            min_x = 0.0;
            max_x = 1.0;
        }

        let ids = if min_x > max_x {
            // Crosses the antimeridian, query both sides
            let eastern = level
                .tree
                .range(&Point([min_x, min_y]), &Point([1.0, max_y]), Vec::new());
            level
                .tree
                .range(&Point([0.0, min_y]), &Point([max_x, max_y]), eastern)
        } else {
            level
                .tree
                .range(&Point([min_x, min_y]), &Point([max_x, max_y]), Vec::new())
        };

        ids.into_iter()
            .map(|i| self.feature(&level.nodes[i]))
            .collect()
    }

    /// Same as [`Hierarchy::get_clusters`] with the box given as a [`BoundingBox`]
    pub fn get_clusters_in(&self, zoom: f64, bbox: &BoundingBox) -> Vec<Feature<'_, T>> {
        self.get_clusters(zoom, bbox.west, bbox.south, bbox.east, bbox.north)
    }

    /// Maps every feature in the box through `on_point` or `on_cluster`
    ///
    /// `on_point` gets the point id and payload, `on_cluster` gets the cluster
    /// id, the number of points in it and its center.
    pub fn map_clusters<R>(
        &self,
        zoom: f64,
        bbox: &BoundingBox,
        mut on_point: impl FnMut(usize, &T) -> R,
        mut on_cluster: impl FnMut(usize, usize, LatLng) -> R,
    ) -> Vec<R> {
        self.get_clusters_in(zoom, bbox)
            .into_iter()
            .map(|feature| match feature {
                Feature::Point { id, payload } => on_point(id, payload),
                Feature::Cluster { id, count, lat, lng } => {
                    on_cluster(id, count, LatLng::new(lat, lng))
                }
            })
            .collect()
    }

    /// Finds the level a cluster was formed into and its trigger node
    fn locate(&self, cluster_id: usize) -> Result<(u8, &ZoomLevel, &IndexNode)> {
        let not_found = || ClusterError::ClusterNotFound(cluster_id);

        let (origin_index, origin_zoom) =
            decode_cluster_id(cluster_id, self.points.len()).ok_or_else(not_found)?;
        // Clusters are formed while clustering origin_zoom into origin_zoom - 1
        if origin_zoom <= self.options.min_zoom {
            return Err(not_found());
        }
        let level = self.level(origin_zoom).ok_or_else(not_found)?;
        let origin = level.nodes.get(origin_index).ok_or_else(not_found)?;

        Ok((origin_zoom, level, origin))
    }

    /// Returns the direct children of a cluster, one zoom level below it
    ///
    /// Counts of the children add up to the count of the cluster.
    ///
    /// # Errors
    ///
    /// [`ClusterError::ClusterNotFound`] if the id is not a cluster of this
    /// hierarchy, e.g. one kept from a previous load.
    pub fn get_children(&self, cluster_id: usize) -> Result<Vec<Feature<'_, T>>> {
        let (origin_zoom, level, origin) = self.locate(cluster_id)?;
        let r = self.options.radius_at(origin_zoom - 1);

        let children: Vec<_> = level
            .tree
            .in_range(&origin.pos, r, Vec::new())
            .into_iter()
            .filter(|&i| level.nodes[i].parent_id == Some(cluster_id))
            .map(|i| self.feature(&level.nodes[i]))
            .collect();

        if children.is_empty() {
            return Err(ClusterError::ClusterNotFound(cluster_id));
        }
        Ok(children)
    }

    /// Returns the zoom on which the cluster expands into several markers
    ///
    /// # Errors
    ///
    /// [`ClusterError::ClusterNotFound`] under the same conditions as
    /// [`Hierarchy::get_children`].
    pub fn get_cluster_expansion_zoom(&self, cluster_id: usize) -> Result<u8> {
        let (origin_zoom, _, _) = self.locate(cluster_id)?;

        let mut cluster_id = cluster_id;
        let mut expansion_zoom = origin_zoom - 1;
        while expansion_zoom <= self.options.max_zoom {
            let children = self.get_children(cluster_id)?;
            expansion_zoom += 1;
            match children.as_slice() {
                [Feature::Cluster { id, .. }] => cluster_id = *id,
                _ => break,
            }
        }

        Ok(expansion_zoom)
    }
}

/// Clusters the nodes of `level` (zoom + 1) into the nodes of `zoom`
///
/// Marks visited nodes and their parents in `level` as a side effect.
fn cluster_level(
    level: &mut ZoomLevel,
    zoom: u8,
    total_points: usize,
    options: &ClusterOptions,
) -> Vec<IndexNode> {
    let r = options.radius_at(zoom);
    let ZoomLevel { nodes, tree } = level;

    let mut clusters = Vec::new();
    let mut neighbor_ids = Vec::new();

    for i in 0..nodes.len() {
        if nodes[i].visited_at(zoom) {
            continue;
        }
        nodes[i].zoom = Some(zoom);
        let p = nodes[i];

        neighbor_ids.clear();
        neighbor_ids = tree.in_range(&p.pos, r, neighbor_ids);

        let origin_count = p.count();
        let mut count = origin_count;
        for &j in &neighbor_ids {
            // p itself is already marked
            if !nodes[j].visited_at(zoom) {
                count += nodes[j].count();
            }
        }

        if count > origin_count && count >= options.min_points {
            let id = encode_cluster_id(i, zoom + 1, total_points);
            let mut wx = p.pos.0[0] * origin_count as f64;
            let mut wy = p.pos.0[1] * origin_count as f64;

            for &j in &neighbor_ids {
                let b = &mut nodes[j];
                if b.visited_at(zoom) {
                    continue;
                }
                b.zoom = Some(zoom);
                b.parent_id = Some(id);

                let weight = b.count() as f64;
                wx += b.pos.0[0] * weight;
                wy += b.pos.0[1] * weight;
            }
            nodes[i].parent_id = Some(id);

            let pos = Point([fround(wx / count as f64), fround(wy / count as f64)]);
            clusters.push(IndexNode::cluster(pos, id, count));
        } else {
            clusters.push(p);

            if count > 1 {
                for &j in &neighbor_ids {
                    let b = &mut nodes[j];
                    if b.visited_at(zoom) {
                        continue;
                    }
                    b.zoom = Some(zoom);
                    clusters.push(*b);
                }
            }
        }
    }

    clusters
}
