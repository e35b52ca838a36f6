#[cfg(test)]
mod tests {
    use crate::cluster::{BackgroundClusterer, ClusterError, ClusterOptions, LatLng};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn grid(n: i32) -> Vec<LatLng> {
        (0..n)
            .map(|i| LatLng::new(f64::from(i % 50) * 0.1, f64::from(i / 50) * 0.1))
            .collect()
    }

    /// Clusterer whose accessor blocks while the returned gate is locked
    fn gated() -> (
        BackgroundClusterer<LatLng, impl Fn(&LatLng) -> LatLng + Send + Sync + 'static>,
        Arc<Mutex<()>>,
    ) {
        let gate = Arc::new(Mutex::new(()));
        let accessor_gate = Arc::clone(&gate);
        let clusterer = BackgroundClusterer::new(
            move |p: &LatLng| {
                drop(accessor_gate.lock());
                *p
            },
            ClusterOptions::default(),
        )
        .expect("valid options");
        (clusterer, gate)
    }

    #[test]
    fn test_not_ready_before_first_load() {
        let clusterer =
            BackgroundClusterer::new(|p: &LatLng| *p, ClusterOptions::default()).expect("options");
        assert!(!clusterer.is_ready());
        assert!(clusterer.snapshot().is_none());
        assert_eq!(clusterer.query(|h| h.len()), None);
    }

    #[test]
    fn test_invalid_options() {
        let result = BackgroundClusterer::new(
            |p: &LatLng| *p,
            ClusterOptions::default().with_min_points(0),
        );
        assert!(matches!(result, Err(ClusterError::InvalidOptions(_))));
    }

    #[test]
    fn test_load_async_installs() {
        let clusterer =
            BackgroundClusterer::new(|p: &LatLng| *p, ClusterOptions::default()).expect("options");
        let handle = clusterer.load_async(grid(500));
        assert_eq!(handle.generation(), 1);
        assert_eq!(handle.wait(), Ok(true));

        assert!(clusterer.is_ready());
        let total = clusterer.query(|h| {
            h.get_clusters(3.0, -180.0, -90.0, 180.0, 90.0)
                .iter()
                .map(|f| f.count())
                .sum::<usize>()
        });
        assert_eq!(total, Some(500));
    }

    #[test]
    fn test_last_load_wins() {
        let (clusterer, gate) = gated();

        let guard = gate.lock();
        let first = clusterer.load_async(grid(300));
        let second = clusterer.load_async(grid(40));
        assert!(second.generation() > first.generation());
        drop(guard);

        assert_eq!(first.wait(), Ok(false));
        assert_eq!(second.wait(), Ok(true));
        assert_eq!(clusterer.query(|h| h.len()), Some(40));
    }

    #[test]
    fn test_cancel_discards_result() {
        let (clusterer, gate) = gated();

        let guard = gate.lock();
        let handle = clusterer.load_async(grid(100));
        clusterer.cancel();
        drop(guard);

        assert_eq!(handle.wait(), Ok(false));
        assert!(!clusterer.is_ready());
    }

    #[test]
    fn test_drop_discards_result() {
        let (clusterer, gate) = gated();

        let guard = gate.lock();
        let handle = clusterer.load_async(grid(100));
        drop(clusterer);
        drop(guard);

        assert_eq!(handle.wait(), Ok(false));
    }

    #[test]
    fn test_sync_load_supersedes_pending() {
        let (clusterer, gate) = gated();

        let guard = gate.lock();
        let pending = clusterer.load_async(grid(300));
        drop(guard);
        clusterer.load(grid(20));

        // The pending worker may have installed before the reload, never after it
        assert!(pending.wait().is_ok());
        assert_eq!(clusterer.query(|h| h.len()), Some(20));
    }

    #[test]
    fn test_snapshot_outlives_reload() {
        let clusterer =
            BackgroundClusterer::new(|p: &LatLng| *p, ClusterOptions::default()).expect("options");
        clusterer.load(grid(10));
        let old = clusterer.snapshot().expect("installed");

        clusterer.load(grid(30));
        assert_eq!(old.len(), 10);
        assert_eq!(clusterer.snapshot().map(|h| h.len()), Some(30));
    }
}
