//! Process-wide persistence lifecycle: bootstrap the stores from the
//! database, then serialize every subsequent state change back to it
//! with write-coalescing.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::db::SnapshotRepository;
use crate::models::AgencySnapshot;
use crate::store::{AgencyStore, SubscriptionId, TrackStore};

/// Both reactive containers, owned together so hydration and snapshot
/// assembly can span them. The Domain Store itself never holds a Track
/// Store reference; this layer performs the one cross-container write.
#[derive(Clone)]
pub struct Stores {
    pub agency: Arc<AgencyStore>,
    pub tracks: Arc<TrackStore>,
}

impl Default for Stores {
    fn default() -> Self {
        Self::new()
    }
}

impl Stores {
    pub fn new() -> Self {
        Self {
            agency: Arc::new(AgencyStore::new()),
            tracks: Arc::new(TrackStore::new()),
        }
    }

    /// The unified snapshot: the domain slices merged with the Track
    /// Store's current tracks.
    pub fn snapshot(&self) -> AgencySnapshot {
        self.agency.state().to_snapshot(self.tracks.tracks())
    }

    /// Replaces both containers from a validated snapshot. Used by the
    /// coordinator at bootstrap and by the explicit import action.
    pub fn hydrate(&self, snapshot: &AgencySnapshot) {
        self.agency.hydrate(snapshot);
        self.tracks.replace_all(snapshot.tracks.clone());
    }
}

/// Started once when the application shell mounts; torn down with
/// [`shutdown`](Self::shutdown), which flushes any pending save.
///
/// Saves never run concurrently: one saver task performs them in order,
/// and the watch channel in between keeps only the most recently
/// requested snapshot, so rapid-fire mutations collapse into at most
/// one in-flight save plus one pending one. Intermediate states may be
/// skipped, never reordered.
pub struct PersistenceCoordinator {
    stores: Stores,
    tx: watch::Sender<Option<AgencySnapshot>>,
    agency_sub: SubscriptionId,
    track_sub: SubscriptionId,
    saver: JoinHandle<()>,
}

impl PersistenceCoordinator {
    /// Bootstraps the stores and begins persisting changes. Hydrates
    /// from the database when a snapshot exists; otherwise seeds the
    /// database with the in-memory defaults. Subscriptions are only
    /// registered after the bootstrap completes, so hydration itself
    /// never triggers a save.
    pub async fn start(stores: Stores, repository: Arc<dyn SnapshotRepository>) -> Result<Self> {
        let loaded = {
            let repo = repository.clone();
            tokio::task::spawn_blocking(move || repo.load())
                .await
                .context("snapshot load task panicked")??
        };
        match loaded {
            Some(snapshot) => {
                stores.hydrate(&snapshot);
                info!("hydrated stores from on-device database");
            }
            None => {
                let seed = stores.snapshot();
                let repo = repository.clone();
                tokio::task::spawn_blocking(move || repo.save(&seed))
                    .await
                    .context("seed save task panicked")??;
                info!("seeded first-run database with default snapshot");
            }
        }

        let (tx, rx) = watch::channel::<Option<AgencySnapshot>>(None);
        let saver = tokio::spawn(run_saver(rx, repository));

        let agency_sub = {
            let stores = stores.clone();
            let tx = tx.clone();
            stores
                .agency
                .clone()
                .subscribe(move |_| request_save(&stores, &tx))
        };
        let track_sub = {
            let stores = stores.clone();
            let tx = tx.clone();
            stores
                .tracks
                .clone()
                .subscribe(move |_| request_save(&stores, &tx))
        };

        Ok(Self {
            stores,
            tx,
            agency_sub,
            track_sub,
            saver,
        })
    }

    /// Unsubscribes from both stores, flushes any still-pending
    /// snapshot, and joins the saver task.
    pub async fn shutdown(self) {
        self.stores.agency.unsubscribe(self.agency_sub);
        self.stores.tracks.unsubscribe(self.track_sub);
        drop(self.tx);
        if let Err(e) = self.saver.await {
            warn!(error = %e, "saver task did not shut down cleanly");
        }
    }
}

fn request_save(stores: &Stores, tx: &watch::Sender<Option<AgencySnapshot>>) {
    // Overwrites any queued-but-unstarted snapshot: only the latest
    // pending state is ever flushed.
    let _ = tx.send(Some(stores.snapshot()));
}

async fn run_saver(
    mut rx: watch::Receiver<Option<AgencySnapshot>>,
    repository: Arc<dyn SnapshotRepository>,
) {
    while rx.changed().await.is_ok() {
        let Some(snapshot) = rx.borrow_and_update().clone() else {
            continue;
        };
        let repo = repository.clone();
        match tokio::task::spawn_blocking(move || repo.save(&snapshot)).await {
            Ok(Ok(())) => debug!("background save completed"),
            // The in-memory store stays the source of truth; the next
            // mutation triggers a fresh attempt.
            Ok(Err(e)) => warn!(error = %e, "background save failed"),
            Err(e) => warn!(error = %e, "background save task panicked"),
        }
    }
}
