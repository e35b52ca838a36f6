//! Clustering off the calling thread
//!
//! [`BackgroundClusterer`] builds hierarchies on worker threads and installs
//! them with a single pointer swap, so readers only ever see a complete
//! generation. The latest request wins: a worker whose generation was
//! superseded stops at the next zoom level and its result is dropped.

use super::error::{ClusterError, Result};
use super::hierarchy::Hierarchy;
use super::options::ClusterOptions;
use super::point::LatLng;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

struct Shared<T> {
    installed: RwLock<Option<Arc<Hierarchy<T>>>>,
    /// Generation of the latest load request
    generation: AtomicU64,
}

impl<T> Shared<T> {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    /// Installs `hierarchy` if no newer load was requested meanwhile
    fn install(&self, generation: u64, hierarchy: Hierarchy<T>) -> bool {
        let mut installed = self.installed.write();
        if !self.is_current(generation) {
            log::debug!("Dropping stale clustering result of generation {}", generation);
            return false;
        }
        *installed = Some(Arc::new(hierarchy));
        true
    }
}

/// Clusterer whose loads run on a background thread
///
/// Until the first load is installed the clusterer is not ready: [`snapshot`]
/// is `None` and [`query`] returns `None`.
///
/// [`snapshot`]: BackgroundClusterer::snapshot
/// [`query`]: BackgroundClusterer::query
pub struct BackgroundClusterer<T, F> {
    accessor: Arc<F>,
    options: ClusterOptions,
    shared: Arc<Shared<T>>,
}

/// Pending background load
#[derive(Debug)]
pub struct LoadHandle {
    generation: u64,
    handle: JoinHandle<bool>,
}

impl LoadHandle {
    /// Generation number of this load, increasing with every request
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the worker is done, installed or not
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the worker, returns whether its result was installed
    ///
    /// # Errors
    ///
    /// [`ClusterError::WorkerPanicked`] if the worker thread panicked.
    pub fn wait(self) -> Result<bool> {
        self.handle.join().map_err(|_| ClusterError::WorkerPanicked)
    }
}

impl<T, F> BackgroundClusterer<T, F>
where
    T: Send + Sync + 'static,
    F: Fn(&T) -> LatLng + Send + Sync + 'static,
{
    /// Creates a clusterer with nothing loaded
    ///
    /// # Errors
    ///
    /// [`ClusterError::InvalidOptions`] if `options` don't pass
    /// [`ClusterOptions::validate`].
    pub fn new(accessor: F, options: ClusterOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            accessor: Arc::new(accessor),
            options,
            shared: Arc::new(Shared {
                installed: RwLock::new(None),
                generation: AtomicU64::new(0),
            }),
        })
    }

    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    fn next_generation(&self) -> u64 {
        self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Starts rebuilding the hierarchy for `points` on a new thread
    ///
    /// Any load still in flight is superseded and its result is never installed.
    pub fn load_async(&self, points: Vec<T>) -> LoadHandle {
        let generation = self.next_generation();
        let shared = Arc::clone(&self.shared);
        let accessor = Arc::clone(&self.accessor);
        let options = self.options.clone();

        let handle = thread::spawn(move || {
            let cancelled = || !shared.is_current(generation);
            if cancelled() {
                return false;
            }
            match Hierarchy::build(points, accessor.as_ref(), options, &cancelled) {
                Some(hierarchy) => shared.install(generation, hierarchy),
                None => false,
            }
        });

        LoadHandle { generation, handle }
    }

    /// Rebuilds the hierarchy on the calling thread and installs it
    ///
    /// Supersedes any load in flight.
    pub fn load(&self, points: Vec<T>) {
        let generation = self.next_generation();
        let cancelled = || !self.shared.is_current(generation);
        if let Some(hierarchy) =
            Hierarchy::build(points, self.accessor.as_ref(), self.options.clone(), &cancelled)
        {
            self.shared.install(generation, hierarchy);
        }
    }

    /// Discards the result of any load in flight
    ///
    /// The installed hierarchy, if any, stays in place.
    pub fn cancel(&self) {
        self.next_generation();
    }

    /// Whether a hierarchy has been installed
    pub fn is_ready(&self) -> bool {
        self.shared.installed.read().is_some()
    }

    /// The last installed hierarchy
    ///
    /// The snapshot stays valid and unchanged after later loads install.
    pub fn snapshot(&self) -> Option<Arc<Hierarchy<T>>> {
        self.shared.installed.read().clone()
    }

    /// Runs `f` against the last installed hierarchy, `None` if not ready
    pub fn query<R>(&self, f: impl FnOnce(&Hierarchy<T>) -> R) -> Option<R> {
        self.snapshot().map(|hierarchy| f(&hierarchy))
    }
}

impl<T, F> Drop for BackgroundClusterer<T, F> {
    fn drop(&mut self) {
        // Workers still running stop at their next zoom level
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
    }
}
