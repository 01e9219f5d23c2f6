use chrono::Utc;
use uuid::Uuid;

use crate::models::{Note, NoteInput};

pub(super) fn create(notes: &mut Vec<Note>, input: NoteInput) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    notes.push(Note {
        id,
        title: input.title,
        summary: input.summary,
        body: input.body,
        created_at: now,
        updated_at: now,
    });
    id
}

pub(super) fn update(notes: &mut [Note], id: Uuid, input: NoteInput) {
    if let Some(note) = notes.iter_mut().find(|n| n.id == id) {
        note.title = input.title;
        note.summary = input.summary;
        note.body = input.body;
        note.updated_at = Utc::now();
    }
}

pub(super) fn delete(notes: &mut Vec<Note>, id: Uuid) {
    notes.retain(|n| n.id != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_stamps_updated_at_but_keeps_created_at() {
        let mut notes = Vec::new();
        let id = create(
            &mut notes,
            NoteInput {
                title: "Safehouse".to_string(),
                summary: String::new(),
                body: "<p>Under the laundromat.</p>".to_string(),
            },
        );
        let created = notes[0].created_at;

        update(
            &mut notes,
            id,
            NoteInput {
                title: "Safehouse (burned)".to_string(),
                summary: String::new(),
                body: String::new(),
            },
        );

        assert_eq!(notes[0].created_at, created);
        assert!(notes[0].updated_at >= created);
        assert_eq!(notes[0].title, "Safehouse (burned)");
    }
}
