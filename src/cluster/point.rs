//! Point and cluster shapes shared by the index and the public query results

/// Point in the normalized Mercator plane
///
/// The point is stored as [x, y] where:
/// - `[0]` is x, projected from longitude, `0` at 180°W and `1` at 180°E
/// - `[1]` is y, projected from latitude, `0` at the north edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point(pub [f64; 2]);

/// PointList is a collection of Points
pub type PointList = Vec<Point>;

impl Point {
    /// Returns squared Euclidean distance between two points
    pub fn sq_dist(&self, b: &Point) -> f64 {
        let dx = self.0[0] - b.0[0];
        let dy = self.0[1] - b.0[1];
        dx * dx + dy * dy
    }

    /// Checks if the point lies inside the (min, max) rectangle, borders included
    pub fn inside(&self, min: &Point, max: &Point) -> bool {
        self.0[0] >= min.0[0]
            && self.0[0] <= max.0[0]
            && self.0[1] >= min.0[1]
            && self.0[1] <= max.0[1]
    }
}

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// What an index node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// One input point, `id` is its index in the loaded slice
    Leaf,
    /// Merged nodes, `count` is the number of input points below it
    Cluster { count: usize },
}

/// Entry of a per-zoom index
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct IndexNode {
    pub(crate) pos: Point,
    /// Last zoom the node was visited at while clustering, `None` if never
    pub(crate) zoom: Option<u8>,
    /// Cluster that absorbed this node at `zoom`
    pub(crate) parent_id: Option<usize>,
    pub(crate) id: usize,
    pub(crate) kind: NodeKind,
}

impl IndexNode {
    pub(crate) fn leaf(pos: Point, id: usize) -> Self {
        Self {
            pos,
            zoom: None,
            parent_id: None,
            id,
            kind: NodeKind::Leaf,
        }
    }

    pub(crate) fn cluster(pos: Point, id: usize, count: usize) -> Self {
        Self {
            pos,
            zoom: None,
            parent_id: None,
            id,
            kind: NodeKind::Cluster { count },
        }
    }

    /// Number of input points represented by the node
    pub(crate) fn count(&self) -> usize {
        match self.kind {
            NodeKind::Leaf => 1,
            NodeKind::Cluster { count } => count,
        }
    }

    /// Whether the node has already been processed at `zoom` or a coarser one
    pub(crate) fn visited_at(&self, zoom: u8) -> bool {
        matches!(self.zoom, Some(z) if z <= zoom)
    }
}

/// Result of a cluster query: either an input point or a cluster of them
#[derive(Debug, PartialEq)]
pub enum Feature<'a, T> {
    Point {
        /// Index of the point in the loaded slice
        id: usize,
        payload: &'a T,
    },
    Cluster {
        /// Cluster id, valid until the next load
        id: usize,
        count: usize,
        lat: f64,
        lng: f64,
    },
}

// Derived Clone/Copy would require T: Clone
impl<T> Clone for Feature<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Feature<'_, T> {}

impl<'a, T> Feature<'a, T> {
    pub fn id(&self) -> usize {
        match *self {
            Feature::Point { id, .. } | Feature::Cluster { id, .. } => id,
        }
    }

    /// Number of input points the feature stands for, 1 for a point
    pub fn count(&self) -> usize {
        match *self {
            Feature::Point { .. } => 1,
            Feature::Cluster { count, .. } => count,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Feature::Cluster { .. })
    }

    /// Payload of a point feature
    pub fn payload(&self) -> Option<&'a T> {
        match *self {
            Feature::Point { payload, .. } => Some(payload),
            Feature::Cluster { .. } => None,
        }
    }
}

/// Viewport in degrees
///
/// `west > east` describes a box crossing the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// The whole map
    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Grows every side by `factor` times the box span
    ///
    /// Used to pre-fetch markers just outside the viewport, so they are
    /// already in place when the map is panned a bit. A box grown to 360° of
    /// longitude or more covers all longitudes.
    pub fn expanded(&self, factor: f64) -> Self {
        let lng_span = if self.east >= self.west {
            self.east - self.west
        } else {
            self.east + 360.0 - self.west
        };
        let lng_adj = lng_span * factor;
        let lat_adj = (self.north - self.south) * factor;

        // Sides of a wrapped box would pass each other
        if lng_span + 2.0 * lng_adj >= 360.0 {
            return Self::new(-180.0, self.south - lat_adj, 180.0, self.north + lat_adj);
        }

        Self::new(
            self.west - lng_adj,
            self.south - lat_adj,
            self.east + lng_adj,
            self.north + lat_adj,
        )
    }
}
