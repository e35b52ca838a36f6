use super::error::Result;
use super::hierarchy::Hierarchy;
use super::options::ClusterOptions;
use super::point::{BoundingBox, Feature, LatLng};

/// Groups geographic points into clusters for every zoom level of a map
///
/// `accessor` extracts coordinates from a point. Points are reloaded as a
/// whole with [`Clusterer::load`]; queries always see the last load.
///
/// ```
/// use rust_geocluster::cluster::{ClusterOptions, Clusterer, LatLng};
///
/// let mut clusterer = Clusterer::new(|p: &(f64, f64)| LatLng::new(p.0, p.1), ClusterOptions::default())?;
/// clusterer.load(vec![(0.0, 0.0), (0.0, 0.0001), (50.0, 50.0)]);
///
/// let features = clusterer.get_clusters(16.0, -180.0, -90.0, 180.0, 90.0);
/// assert_eq!(features.len(), 2);
/// # Ok::<(), rust_geocluster::cluster::ClusterError>(())
/// ```
#[derive(Debug)]
pub struct Clusterer<T, F> {
    accessor: F,
    hierarchy: Hierarchy<T>,
}

impl<T, F> Clusterer<T, F>
where
    F: Fn(&T) -> LatLng,
{
    /// Creates an empty clusterer
    ///
    /// # Errors
    ///
    /// [`ClusterError::InvalidOptions`](super::ClusterError::InvalidOptions)
    /// if `options` don't pass [`ClusterOptions::validate`].
    pub fn new(accessor: F, options: ClusterOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            accessor,
            hierarchy: Hierarchy::empty(options),
        })
    }

    /// Creates an empty clusterer with default options
    pub fn with_default_options(accessor: F) -> Self {
        Self {
            accessor,
            hierarchy: Hierarchy::empty(ClusterOptions::default()),
        }
    }

    pub fn options(&self) -> &ClusterOptions {
        self.hierarchy.options()
    }

    /// Replaces all points and rebuilds every zoom level
    ///
    /// Cluster ids handed out before the call are no longer valid.
    pub fn load(&mut self, points: Vec<T>) {
        let options = self.hierarchy.options().clone();
        if let Some(hierarchy) = Hierarchy::build(points, &self.accessor, options, &|| false) {
            self.hierarchy = hierarchy;
        }
    }

    /// Points of the last load
    pub fn points(&self) -> &[T] {
        self.hierarchy.points()
    }

    /// The hierarchy built by the last load
    pub fn hierarchy(&self) -> &Hierarchy<T> {
        &self.hierarchy
    }

    /// See [`Hierarchy::get_clusters`]
    pub fn get_clusters(
        &self,
        zoom: f64,
        west_lng: f64,
        south_lat: f64,
        east_lng: f64,
        north_lat: f64,
    ) -> Vec<Feature<'_, T>> {
        self.hierarchy
            .get_clusters(zoom, west_lng, south_lat, east_lng, north_lat)
    }

    /// See [`Hierarchy::get_clusters_in`]
    pub fn get_clusters_in(&self, zoom: f64, bbox: &BoundingBox) -> Vec<Feature<'_, T>> {
        self.hierarchy.get_clusters_in(zoom, bbox)
    }

    /// See [`Hierarchy::map_clusters`]
    pub fn map_clusters<R>(
        &self,
        zoom: f64,
        bbox: &BoundingBox,
        on_point: impl FnMut(usize, &T) -> R,
        on_cluster: impl FnMut(usize, usize, LatLng) -> R,
    ) -> Vec<R> {
        self.hierarchy.map_clusters(zoom, bbox, on_point, on_cluster)
    }

    /// See [`Hierarchy::get_children`]
    pub fn get_children(&self, cluster_id: usize) -> Result<Vec<Feature<'_, T>>> {
        self.hierarchy.get_children(cluster_id)
    }

    /// See [`Hierarchy::get_cluster_expansion_zoom`]
    pub fn get_cluster_expansion_zoom(&self, cluster_id: usize) -> Result<u8> {
        self.hierarchy.get_cluster_expansion_zoom(cluster_id)
    }
}
