use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::models::{CreateTrackInput, CustomTrack, TrackItem, TrackItemPatch, TrackMetaPatch};

use super::{SubscriberSet, SubscriptionId};

/// Independent reactive container for checklist tracks. Kept apart from
/// the domain store so track pages subscribe without re-rendering on
/// campaign mutations, and so its persistence versioning can move on
/// its own schedule.
pub struct TrackStore {
    tracks: Mutex<Vec<CustomTrack>>,
    subscribers: Mutex<SubscriberSet<Vec<CustomTrack>>>,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackStore {
    pub fn new() -> Self {
        Self {
            tracks: Mutex::new(Vec::new()),
            subscribers: Mutex::new(SubscriberSet::new()),
        }
    }

    fn lock_tracks(&self) -> MutexGuard<'_, Vec<CustomTrack>> {
        self.tracks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(&self) -> MutexGuard<'_, SubscriberSet<Vec<CustomTrack>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, f: impl Fn(&Vec<CustomTrack>) + Send + 'static) -> SubscriptionId {
        self.lock_subscribers().add(Box::new(f))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_subscribers().remove(id);
    }

    pub fn tracks(&self) -> Vec<CustomTrack> {
        self.lock_tracks().clone()
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<CustomTrack>) -> R) -> R {
        let (result, after) = {
            let mut tracks = self.lock_tracks();
            let result = f(&mut tracks);
            (result, tracks.clone())
        };
        self.lock_subscribers().notify(&after);
        result
    }

    /// Creates a track with `item_count` (minimum 1) synthesized
    /// placeholder items.
    pub fn create_track(&self, input: CreateTrackInput) -> Uuid {
        self.mutate(|tracks| {
            let id = Uuid::new_v4();
            let count = input.item_count.max(1);
            let items = (0..count)
                .map(|i| TrackItem {
                    id: Uuid::new_v4(),
                    label: format!("Item {}", i + 1),
                    checked: false,
                })
                .collect();
            tracks.push(CustomTrack {
                id,
                name: input.name,
                color: input.color,
                items,
            });
            id
        })
    }

    /// Patches name/color only; items are untouched.
    pub fn update_track_meta(&self, id: Uuid, patch: TrackMetaPatch) {
        self.mutate(|tracks| {
            if let Some(track) = tracks.iter_mut().find(|t| t.id == id) {
                if let Some(name) = patch.name {
                    track.name = name;
                }
                if let Some(color) = patch.color {
                    track.color = color;
                }
            }
        });
    }

    pub fn update_track_item(&self, track_id: Uuid, item_id: Uuid, patch: TrackItemPatch) {
        self.mutate(|tracks| {
            let Some(track) = tracks.iter_mut().find(|t| t.id == track_id) else {
                return;
            };
            if let Some(item) = track.items.iter_mut().find(|i| i.id == item_id) {
                if let Some(label) = patch.label {
                    item.label = label;
                }
                if let Some(checked) = patch.checked {
                    item.checked = checked;
                }
            }
        });
    }

    pub fn delete_track(&self, id: Uuid) {
        self.mutate(|tracks| tracks.retain(|t| t.id != id));
    }

    /// Hydration entry point; called only from the coordinator layer.
    pub fn replace_all(&self, tracks: Vec<CustomTrack>) {
        self.mutate(|current| *current = tracks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, item_count: usize) -> CreateTrackInput {
        CreateTrackInput {
            name: name.to_string(),
            color: "#ff00aa".to_string(),
            item_count,
        }
    }

    #[test]
    fn create_synthesizes_at_least_one_item() {
        let store = TrackStore::new();
        store.create_track(input("Doom clock", 0));

        let tracks = store.tracks();
        assert_eq!(tracks[0].items.len(), 1);
        assert_eq!(tracks[0].items[0].label, "Item 1");
        assert!(!tracks[0].items[0].checked);
    }

    #[test]
    fn item_patch_touches_one_item_only() {
        let store = TrackStore::new();
        let track_id = store.create_track(input("Ritual progress", 3));
        let item_id = store.tracks()[0].items[1].id;

        store.update_track_item(
            track_id,
            item_id,
            TrackItemPatch {
                label: Some("Second seal".to_string()),
                checked: Some(true),
            },
        );

        let track = &store.tracks()[0];
        assert_eq!(track.items[1].label, "Second seal");
        assert!(track.items[1].checked);
        assert_eq!(track.items[0].label, "Item 1");
        assert!(!track.items[0].checked);
    }

    #[test]
    fn subscribers_hear_every_mutation() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let store = TrackStore::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        store.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let id = store.create_track(input("Clock", 2));
        store.update_track_meta(
            id,
            TrackMetaPatch {
                name: Some("Clock II".to_string()),
                color: None,
            },
        );
        store.delete_track(id);

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
