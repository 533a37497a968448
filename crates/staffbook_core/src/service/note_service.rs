//! Note use-cases.
//!
//! # Invariants
//! - Notes are append-only: they can be added and deleted, never edited.
//! - Tags are stored lowercase, deduplicated and sorted.

use super::{require_staff, same_text, update_record};
use crate::model::note::{Note, NoteId};
use crate::model::staff::StaffId;
use crate::model::{normalize_tags, optional_line, required_body, EntityKind};
use crate::store::{DocumentStore, StoreError, StoreResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    /// Multi-line text; line endings are normalized to LF.
    pub body: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Where the note came from, e.g. a meeting or a transcript title.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub tag: Option<String>,
    pub category: Option<String>,
    /// Only notes created on or after this date.
    pub since: Option<NaiveDate>,
}

impl NoteFilter {
    fn matches(&self, note: &Note) -> bool {
        self.tag.as_deref().map_or(true, |tag| note.has_tag(tag))
            && self
                .category
                .as_deref()
                .map_or(true, |category| same_text(note.category.as_deref(), category))
            && self
                .since
                .map_or(true, |since| note.created_at.date_naive() >= since)
    }
}

pub struct NoteService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> NoteService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn add_note(&mut self, staff_id: StaffId, input: NewNote) -> StoreResult<Note> {
        let kind = EntityKind::Note;
        let mut note = Note::new(staff_id, required_body(kind, "body", &input.body)?);
        note.tags = normalize_tags(kind, &input.tags)?;
        note.category = optional_line(kind, "category", input.category.as_deref())?;
        note.source = optional_line(kind, "source", input.source.as_deref())?;
        require_staff(self.store, kind, staff_id)?;

        update_record(self.store, staff_id, |record, at| {
            note.created_at = at;
            record.notes.push(note.clone());
            Ok(note)
        })
    }

    pub fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        let owner = self.store.owner_of(EntityKind::Note, id)?;
        self.store
            .staff_record(owner)?
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
            .ok_or(not_found(id))
    }

    /// Notes of one staff member in creation order.
    pub fn list_notes(&self, staff_id: StaffId, filter: &NoteFilter) -> StoreResult<Vec<Note>> {
        Ok(self
            .store
            .staff_record(staff_id)?
            .notes
            .iter()
            .filter(|note| filter.matches(note))
            .cloned()
            .collect())
    }

    pub fn delete_note(&mut self, id: NoteId) -> StoreResult<()> {
        let owner = self.store.owner_of(EntityKind::Note, id)?;
        update_record(self.store, owner, |record, _| {
            let before = record.notes.len();
            record.notes.retain(|note| note.id != id);
            if record.notes.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }
}

fn not_found(id: NoteId) -> StoreError {
    StoreError::NotFound {
        kind: EntityKind::Note,
        id,
    }
}
