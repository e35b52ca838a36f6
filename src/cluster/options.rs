//! Clustering configuration

use super::error::{ClusterError, Result};

/// Highest `max_zoom` the cluster id layout can encode
///
/// Cluster ids reserve five bits for the origin zoom, which is `zoom + 1`.
pub const MAX_SUPPORTED_ZOOM: u8 = 30;

/// Options of a [`Clusterer`](super::Clusterer)
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOptions {
    /// Min zoom level to cluster the points on
    pub min_zoom: u8,
    /// Max zoom level to cluster the points on
    pub max_zoom: u8,
    /// Minimum points to form a cluster
    pub min_points: usize,
    /// Cluster radius in pixels
    pub radius: f64,
    /// Tile extent in pixels, the radius is relative to it
    pub extent: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 16,
            min_points: 2,
            radius: 40.0,
            extent: 512.0,
        }
    }
}

impl ClusterOptions {
    pub fn with_min_zoom(mut self, zoom: u8) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, zoom: u8) -> Self {
        self.max_zoom = zoom;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_extent(mut self, extent: f64) -> Self {
        self.extent = extent;
        self
    }

    /// Checks that the options describe a buildable hierarchy
    pub fn validate(&self) -> Result<()> {
        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidOptions(format!(
                "min_zoom {} is greater than max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(ClusterError::InvalidOptions(format!(
                "max_zoom {} exceeds {}",
                self.max_zoom, MAX_SUPPORTED_ZOOM
            )));
        }
        if self.min_points == 0 {
            return Err(ClusterError::InvalidOptions(
                "min_points must be at least 1".to_string(),
            ));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ClusterError::InvalidOptions(format!(
                "radius must be a positive number, got {}",
                self.radius
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ClusterError::InvalidOptions(format!(
                "extent must be a positive number, got {}",
                self.extent
            )));
        }
        Ok(())
    }

    /// Cluster radius in plane units when clustering into `zoom`
    pub fn radius_at(&self, zoom: u8) -> f64 {
        self.radius / (self.extent * 2f64.powi(i32::from(zoom)))
    }

    /// Clamps a map zoom into the range of built levels, `[min_zoom, max_zoom + 1]`
    ///
    /// Fractional zooms are floored, NaN falls back to `min_zoom`.
    pub fn limit_zoom(&self, zoom: f64) -> u8 {
        if zoom.is_nan() {
            return self.min_zoom;
        }
        let z = zoom
            .floor()
            .min(f64::from(self.max_zoom) + 1.0)
            .max(f64::from(self.min_zoom));
        z as u8
    }
}
