//! Core use-case services.
//!
//! # Responsibility
//! - Turn caller input into validated entity changes.
//! - Keep callers away from documents, paths and the codec.
//!
//! # Invariants
//! - Every mutation goes through one store write; a failed write leaves the
//!   store exactly as it was.
//! - Every write advances the written document's `updated_at`.

pub mod achievement_service;
pub mod goal_service;
pub mod note_service;
pub mod reminder_service;
pub mod staff_service;
pub mod transcript_service;

use crate::model::staff::{StaffId, StaffRecord};
use crate::model::{EntityKind, ValidationError};
use crate::model::time::{advance, Timestamp};
use crate::store::{DocumentStore, StoreResult};

pub use achievement_service::{AchievementService, NewAchievement};
pub use goal_service::{GoalFilter, GoalService, NewGoal};
pub use note_service::{NewNote, NoteFilter, NoteService};
pub use reminder_service::{NewReminder, ReminderFilter, ReminderPatch, ReminderService};
pub use staff_service::{DeleteMode, NewStaff, StaffFilter, StaffPatch, StaffService};
pub use transcript_service::{NewTranscript, TranscriptFilter, TranscriptService};

/// Applies `change` to a copy of one staff record and writes it back with a
/// fresh `updated_at`. The cached record is untouched when anything fails.
pub(crate) fn update_record<T>(
    store: &mut DocumentStore,
    staff_id: StaffId,
    change: impl FnOnce(&mut StaffRecord, Timestamp) -> StoreResult<T>,
) -> StoreResult<T> {
    let mut record = store.staff_record(staff_id)?.clone();
    let at = advance(record.staff.updated_at);
    let output = change(&mut record, at)?;
    record.staff.updated_at = at;
    store.put_staff(record)?;
    Ok(output)
}

/// Rejects a new `kind` item that points at a staff member who does not exist.
pub(crate) fn require_staff(
    store: &DocumentStore,
    kind: EntityKind,
    staff_id: StaffId,
) -> StoreResult<()> {
    if store.staff_record(staff_id).is_err() {
        return Err(ValidationError::DanglingReference {
            kind,
            target: EntityKind::Staff,
            target_id: staff_id,
        }
        .into());
    }
    Ok(())
}

/// Case-insensitive equality for filter fields.
pub(crate) fn same_text(value: Option<&str>, wanted: &str) -> bool {
    value.is_some_and(|value| value.trim().to_lowercase() == wanted.trim().to_lowercase())
}
