//! Note model.
//!
//! # Invariants
//! - A note belongs to exactly one staff member for its whole lifetime.
//! - Notes are append-only: nothing but deletion changes a stored note.
//! - Tags are lowercase, deduplicated and sorted.

use super::staff::StaffId;
use super::time::{now, Timestamp};
use super::{check_list, check_optional_line, ensure_id, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub staff_id: StaffId,
    /// Free text, may span several lines. LF line endings, no trailing blanks.
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Where the note came from, e.g. `one_on_one` or `call_transcript`.
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: Timestamp,
}

impl Note {
    pub fn new(staff_id: StaffId, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            body: body.into(),
            tags: Vec::new(),
            category: None,
            source: None,
            created_at: now(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Note;
        ensure_id(kind, self.id)?;
        ensure_id(EntityKind::Staff, self.staff_id)?;
        if self.body.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "body",
            });
        }
        if self.body.contains('\r') || self.body.trim_end() != self.body {
            return Err(ValidationError::UntrimmedField {
                kind,
                field: "body",
            });
        }
        check_list(kind, "tags", &self.tags)?;
        if self.tags.iter().any(|tag| tag.to_lowercase() != *tag)
            || self.tags.windows(2).any(|pair| pair[0] >= pair[1])
        {
            return Err(ValidationError::InvalidListItem {
                kind,
                field: "tags",
                value: self.tags.join(", "),
            });
        }
        check_optional_line(kind, "category", self.category.as_deref())?;
        check_optional_line(kind, "source", self.source.as_deref())?;
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.tags.iter().any(|value| *value == wanted)
    }
}
