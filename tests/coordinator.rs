use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agency_core::db::SnapshotRepository;
use agency_core::models::{AgencySnapshot, CampaignPatch, CreateTrackInput};
use agency_core::{Database, PersistenceCoordinator, Stores};
use anyhow::Result;

/// Repository double that records save traffic and can simulate a slow
/// or failing disk.
struct RecordingRepo {
    preload: Option<AgencySnapshot>,
    delay: Duration,
    fail: bool,
    started: AtomicUsize,
    completed: AtomicUsize,
    last: Mutex<Option<AgencySnapshot>>,
}

impl RecordingRepo {
    fn new(preload: Option<AgencySnapshot>, delay: Duration) -> Self {
        Self {
            preload,
            delay,
            fail: false,
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    fn failing(preload: Option<AgencySnapshot>) -> Self {
        Self {
            fail: true,
            ..Self::new(preload, Duration::from_millis(10))
        }
    }
}

impl SnapshotRepository for RecordingRepo {
    fn load(&self) -> Result<Option<AgencySnapshot>> {
        Ok(self.preload.clone())
    }

    fn save(&self, snapshot: &AgencySnapshot) -> Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        if self.fail {
            anyhow::bail!("simulated disk failure");
        }
        *self.last.lock().unwrap() = Some(snapshot.clone());
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn first_run_seeds_the_database_with_the_default_snapshot() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.migrate().unwrap();

    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), db.clone())
        .await
        .unwrap();

    let seeded = db.load().unwrap().expect("seed save should have run");
    assert_eq!(seeded, stores.snapshot());
    assert_eq!(seeded.campaign, stores.agency.state().campaign);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn existing_snapshot_hydrates_both_stores() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    db.migrate().unwrap();

    let mut snapshot = AgencySnapshot::first_run();
    snapshot.campaign.name = "Resumed Campaign".to_string();
    snapshot.tracks.push(agency_core::models::CustomTrack {
        id: uuid::Uuid::new_v4(),
        name: "Doom clock".to_string(),
        color: "#112233".to_string(),
        items: Vec::new(),
    });
    db.save(&snapshot).unwrap();

    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), db)
        .await
        .unwrap();

    assert_eq!(stores.agency.state().campaign.name, "Resumed Campaign");
    assert_eq!(stores.tracks.tracks().len(), 1);
    assert_eq!(stores.snapshot(), snapshot);

    coordinator.shutdown().await;
}

#[tokio::test]
async fn rapid_mutations_coalesce_into_at_most_two_saves() {
    let preload = AgencySnapshot::first_run();
    let repo = Arc::new(RecordingRepo::new(
        Some(preload),
        Duration::from_millis(150),
    ));
    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), repo.clone())
        .await
        .unwrap();

    stores.agency.patch_campaign(CampaignPatch {
        name: Some("mutation 0".to_string()),
        ..Default::default()
    });
    let repo_started = repo.clone();
    wait_until(move || repo_started.started.load(Ordering::SeqCst) == 1).await;

    // Five rapid-fire mutations while the first save is still sleeping.
    for i in 1..=5 {
        stores.agency.patch_campaign(CampaignPatch {
            name: Some(format!("mutation {i}")),
            ..Default::default()
        });
    }

    coordinator.shutdown().await;

    let started = repo.started.load(Ordering::SeqCst);
    assert!(
        (1..=2).contains(&started),
        "expected at most 2 saves, saw {started}"
    );
    let last = repo.last.lock().unwrap().clone().unwrap();
    assert_eq!(last.campaign.name, "mutation 5");
}

#[tokio::test]
async fn failed_saves_are_swallowed_and_retried_on_the_next_mutation() {
    let repo = Arc::new(RecordingRepo::failing(Some(AgencySnapshot::first_run())));
    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), repo.clone())
        .await
        .unwrap();

    stores.agency.patch_campaign(CampaignPatch {
        name: Some("first attempt".to_string()),
        ..Default::default()
    });
    let repo_started = repo.clone();
    wait_until(move || repo_started.started.load(Ordering::SeqCst) >= 1).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    // The store keeps working and the next mutation triggers a fresh
    // attempt.
    stores.agency.patch_campaign(CampaignPatch {
        name: Some("second attempt".to_string()),
        ..Default::default()
    });
    let repo_started = repo.clone();
    wait_until(move || repo_started.started.load(Ordering::SeqCst) >= 2).await;

    coordinator.shutdown().await;

    assert_eq!(repo.completed.load(Ordering::SeqCst), 0);
    assert_eq!(stores.agency.state().campaign.name, "second attempt");
}

#[tokio::test]
async fn track_mutations_are_persisted_too() {
    let repo = Arc::new(RecordingRepo::new(
        Some(AgencySnapshot::first_run()),
        Duration::from_millis(1),
    ));
    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), repo.clone())
        .await
        .unwrap();

    stores.tracks.create_track(CreateTrackInput {
        name: "Ritual progress".to_string(),
        color: "#00ffcc".to_string(),
        item_count: 3,
    });

    coordinator.shutdown().await;

    let last = repo.last.lock().unwrap().clone().unwrap();
    assert_eq!(last.tracks.len(), 1);
    assert_eq!(last.tracks[0].items.len(), 3);
}

#[tokio::test]
async fn import_hydration_is_persisted() {
    let repo = Arc::new(RecordingRepo::new(
        Some(AgencySnapshot::first_run()),
        Duration::from_millis(1),
    ));
    let stores = Stores::new();
    let coordinator = PersistenceCoordinator::start(stores.clone(), repo.clone())
        .await
        .unwrap();

    let mut imported = AgencySnapshot::first_run();
    imported.campaign.name = "Imported Campaign".to_string();
    let exported = agency_core::models::export_envelope(&imported).unwrap();
    let parsed = agency_core::models::parse_import(&exported).unwrap();
    stores.hydrate(&parsed);

    coordinator.shutdown().await;

    let last = repo.last.lock().unwrap().clone().unwrap();
    assert_eq!(last.campaign.name, "Imported Campaign");
}
