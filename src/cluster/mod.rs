//! Package cluster groups (lat, lng) points into per-zoom clusters using K-D Trees
pub mod background;
pub mod clusterer;
pub mod error;
pub mod hierarchy;
pub mod kdtree;
pub mod options;
pub mod point;
pub mod projection;

#[cfg(test)]
mod background_test;
#[cfg(test)]
mod kdtree_test;
#[cfg(test)]
mod projection_test;

pub use background::{BackgroundClusterer, LoadHandle};
pub use clusterer::Clusterer;
pub use error::{ClusterError, Result};
pub use hierarchy::Hierarchy;
pub use kdtree::{KDTree, new_kd_tree};
pub use options::{ClusterOptions, MAX_SUPPORTED_ZOOM};
pub use point::{BoundingBox, Feature, LatLng, Point, PointList};
pub use projection::{
    bounded_lat_to_y, bounded_lng_to_x, lat_to_y, lng_to_x, wrap_lng, x_to_lng, y_to_lat,
};
