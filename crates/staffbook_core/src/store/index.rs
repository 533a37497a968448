//! In-memory index entries and child ownership maps.

use crate::model::achievement::AchievementId;
use crate::model::goal::GoalId;
use crate::model::note::NoteId;
use crate::model::reminder::ReminderBook;
use crate::model::staff::{StaffId, StaffRecord};
use crate::model::EntityKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Cached entity together with its backing document.
#[derive(Debug, Clone)]
pub(crate) struct Indexed<T> {
    pub value: T,
    pub path: PathBuf,
    /// Document text as last read or written.
    pub raw: String,
}

/// Singleton reminders document.
#[derive(Debug, Clone)]
pub(crate) struct RemindersSlot {
    pub book: ReminderBook,
    pub path: PathBuf,
    /// `None` until the document has been loaded or written successfully.
    pub raw: Option<String>,
}

/// Path and text of one document, as handed out to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef<'a> {
    pub path: &'a Path,
    pub text: &'a str,
}

/// Maps every note, goal and achievement id to the staff document holding it.
#[derive(Debug, Default)]
pub(crate) struct ChildIndex {
    notes: HashMap<NoteId, StaffId>,
    goals: HashMap<GoalId, StaffId>,
    achievements: HashMap<AchievementId, StaffId>,
}

impl ChildIndex {
    pub fn owner(&self, kind: EntityKind, id: Uuid) -> Option<StaffId> {
        let map = match kind {
            EntityKind::Note => &self.notes,
            EntityKind::Goal => &self.goals,
            EntityKind::Achievement => &self.achievements,
            _ => return None,
        };
        map.get(&id).copied()
    }

    /// First child of `record` already indexed under another staff member.
    pub fn conflict(&self, record: &StaffRecord) -> Option<(EntityKind, Uuid)> {
        let staff_id = record.id();
        let foreign = |owner: Option<&StaffId>| owner.is_some_and(|owner| *owner != staff_id);
        record
            .notes
            .iter()
            .find(|note| foreign(self.notes.get(&note.id)))
            .map(|note| (EntityKind::Note, note.id))
            .or_else(|| {
                record
                    .goals
                    .iter()
                    .find(|goal| foreign(self.goals.get(&goal.id)))
                    .map(|goal| (EntityKind::Goal, goal.id))
            })
            .or_else(|| {
                record
                    .achievements
                    .iter()
                    .find(|item| foreign(self.achievements.get(&item.id)))
                    .map(|item| (EntityKind::Achievement, item.id))
            })
    }

    pub fn insert_record(&mut self, record: &StaffRecord) {
        let staff_id = record.id();
        self.notes
            .extend(record.notes.iter().map(|note| (note.id, staff_id)));
        self.goals
            .extend(record.goals.iter().map(|goal| (goal.id, staff_id)));
        self.achievements
            .extend(record.achievements.iter().map(|item| (item.id, staff_id)));
    }

    pub fn remove_record(&mut self, record: &StaffRecord) {
        for note in &record.notes {
            self.notes.remove(&note.id);
        }
        for goal in &record.goals {
            self.goals.remove(&goal.id);
        }
        for item in &record.achievements {
            self.achievements.remove(&item.id);
        }
    }
}
