//! Call transcript model.
//!
//! # Invariants
//! - `text` is immutable after creation; LF line endings, no trailing blanks.
//! - `processed` becomes true the first time extracted items are recorded.

use super::time::{now, Timestamp};
use super::{check_line, check_list, ensure_id, EntityKind, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TranscriptId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: TranscriptId,
    pub title: String,
    /// When the call took place.
    pub date: Timestamp,
    pub participants: Vec<String>,
    pub text: String,
    /// Items produced by an external extraction step, one line each.
    pub extracted_items: Vec<String>,
    pub processed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transcript {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            date: stamp,
            participants: Vec::new(),
            text: text.into(),
            extracted_items: Vec::new(),
            processed: false,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn has_participant(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.participants
            .iter()
            .any(|participant| participant.to_lowercase() == wanted)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Transcript;
        ensure_id(kind, self.id)?;
        check_line(kind, "title", &self.title)?;
        check_list(kind, "participants", &self.participants)?;
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                kind,
                field: "text",
            });
        }
        if self.text.contains('\r') || self.text.trim_end() != self.text {
            return Err(ValidationError::UntrimmedField {
                kind,
                field: "text",
            });
        }
        for item in &self.extracted_items {
            check_line(kind, "extracted_items", item)?;
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder { kind, id: self.id });
        }
        Ok(())
    }
}
