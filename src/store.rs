//! Session snapshot store
//!
//! A single-slot cache holding the current [`HealthSnapshot`] of a session.
//! The slot is filled at session start, replaced wholesale on every sync and
//! emptied at session end. Regeneration is serialised: at most one sync runs
//! at a time, and readers only ever observe complete snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::error::ComputeError;
use crate::generator::SnapshotGenerator;
use crate::types::HealthSnapshot;

/// Single-slot, swap-on-write snapshot cache
pub struct SnapshotStore<R = ChaCha8Rng> {
    generator: Mutex<SnapshotGenerator<R>>,
    current: RwLock<Option<Arc<HealthSnapshot>>>,
    syncs: AtomicU64,
}

impl<R: Rng> SnapshotStore<R> {
    /// Create a store with an empty slot
    pub fn new(generator: SnapshotGenerator<R>) -> Self {
        Self {
            generator: Mutex::new(generator),
            current: RwLock::new(None),
            syncs: AtomicU64::new(0),
        }
    }

    /// Start a session: create the store and generate its first snapshot
    pub fn open(generator: SnapshotGenerator<R>) -> Self {
        let store = Self::new(generator);
        store.sync();
        store
    }

    /// The current snapshot, if the session has one
    pub fn current(&self) -> Option<Arc<HealthSnapshot>> {
        self.current.read().clone()
    }

    /// Regenerate and swap in a new snapshot, waiting for any in-flight sync first
    pub fn sync(&self) -> Arc<HealthSnapshot> {
        let mut generator = self.generator.lock();
        self.regenerate(&mut generator)
    }

    /// Like [`SnapshotStore::sync`], but fails instead of waiting when a sync is in flight
    pub fn try_sync(&self) -> Result<Arc<HealthSnapshot>, ComputeError> {
        match self.generator.try_lock() {
            Some(mut generator) => Ok(self.regenerate(&mut generator)),
            None => {
                warn!("sync rejected, another sync is in flight");
                Err(ComputeError::SyncInProgress)
            }
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.generator.is_locked()
    }

    /// Number of completed syncs
    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Acquire)
    }

    /// End the session, discarding the current snapshot
    pub fn close(&self) -> Option<Arc<HealthSnapshot>> {
        let previous = self.current.write().take();
        if let Some(snapshot) = &previous {
            info!(snapshot_id = %snapshot.id(), "closed snapshot session");
        }
        previous
    }

    fn regenerate(&self, generator: &mut SnapshotGenerator<R>) -> Arc<HealthSnapshot> {
        let snapshot = Arc::new(generator.generate());
        let previous = self.current.write().replace(Arc::clone(&snapshot));
        let count = self.syncs.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            snapshot_id = %snapshot.id(),
            replaced = ?previous.map(|p| p.id()),
            health_score = snapshot.health_score(),
            sync_count = count,
            "synced health snapshot"
        );

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricKind;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_new_store_is_empty() {
        let store = SnapshotStore::new(SnapshotGenerator::from_seed(1));
        assert!(store.current().is_none());
        assert_eq!(store.sync_count(), 0);
        assert!(!store.is_syncing());
    }

    #[test]
    fn test_open_generates_first_snapshot() {
        let store = SnapshotStore::open(SnapshotGenerator::from_seed(1));
        assert!(store.current().is_some());
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn test_sync_replaces_wholesale() {
        let store = SnapshotStore::open(SnapshotGenerator::from_seed(1));
        let before = store.current().unwrap();
        let after = store.sync();

        assert_ne!(before.id(), after.id());
        assert_eq!(store.current().unwrap().id(), after.id());
        // Readers holding the old snapshot keep an unchanged copy
        assert_eq!(before.metric(MetricKind::Mood).history().len(), 7);
        assert_eq!(store.sync_count(), 2);
    }

    #[test]
    fn test_close_empties_slot() {
        let store = SnapshotStore::open(SnapshotGenerator::from_seed(1));
        let closed = store.close();
        assert!(closed.is_some());
        assert!(store.current().is_none());
        assert!(store.close().is_none());
    }

    #[test]
    fn test_try_sync_rejects_concurrent_regeneration() {
        let store = Arc::new(SnapshotStore::new(SnapshotGenerator::from_seed(1)));
        let guard = store.generator.lock();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                tx.send(store.try_sync().is_err()).unwrap();
            })
        };

        assert!(rx.recv().unwrap());
        assert!(store.is_syncing());
        drop(guard);
        worker.join().unwrap();

        assert!(store.try_sync().is_ok());
        assert_eq!(store.sync_count(), 1);
    }

    #[test]
    fn test_concurrent_syncs_and_reads_see_complete_snapshots() {
        let store = SnapshotStore::open(SnapshotGenerator::from_seed(99));

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..10 {
                        store.sync();
                    }
                });
            }
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let snapshot = store.current().unwrap();
                        for metric in snapshot.metrics().iter() {
                            assert_eq!(metric.history().len(), 7);
                            assert_eq!(
                                metric.current(),
                                metric.history().last().unwrap().value
                            );
                        }
                        assert_eq!(
                            snapshot.health_score(),
                            crate::score::compute_health_score(&snapshot)
                        );
                    }
                });
            }
        });

        assert_eq!(store.sync_count(), 41);
    }
}
