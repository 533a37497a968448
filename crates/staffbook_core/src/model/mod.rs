//! Typed records for staff, their owned children, reminders and transcripts.
//!
//! # Responsibility
//! - Define canonical data structures used by the codec and the store.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - Every entity is identified by a stable, non-nil UUID.
//! - Scalar text fields are single-line and trimmed; list items never contain
//!   list delimiters, so they survive inline `[a, b]` header rendering.
//! - Timestamps carry microsecond precision so they round-trip through text.
//!
//! # See also
//! - docs/document-format.md

pub mod achievement;
pub mod goal;
pub mod note;
pub mod reminder;
pub mod staff;
pub mod time;
pub mod transcript;

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Entity categories known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Staff,
    Note,
    Goal,
    Achievement,
    Reminder,
    Transcript,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Note => "note",
            Self::Goal => "goal",
            Self::Achievement => "achievement",
            Self::Reminder => "reminder",
            Self::Transcript => "transcript",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input or state rejected before any mutation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity is the nil UUID.
    NilId(EntityKind),
    /// Required text field is blank after trim.
    EmptyField {
        kind: EntityKind,
        field: &'static str,
    },
    /// Scalar field contains a line break.
    MultilineField {
        kind: EntityKind,
        field: &'static str,
    },
    /// Stored field carries leading or trailing whitespace.
    UntrimmedField {
        kind: EntityKind,
        field: &'static str,
    },
    /// List item is blank or contains a list delimiter.
    InvalidListItem {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Enum text does not name a known variant.
    InvalidEnum {
        field: &'static str,
        value: String,
    },
    /// `updated_at` (or another later stamp) precedes `created_at`.
    TimestampOrder {
        kind: EntityKind,
        id: Uuid,
    },
    /// `completed` flag and `completed_at` disagree.
    CompletionMismatch(Uuid),
    /// Child record claims a different owner than the record holding it.
    OwnerMismatch {
        kind: EntityKind,
        id: Uuid,
        owner: Uuid,
        expected: Uuid,
    },
    /// Identity appears twice where it must be unique.
    DuplicateIdentity {
        kind: EntityKind,
        id: Uuid,
    },
    /// Reference to an entity that does not exist.
    DanglingReference {
        kind: EntityKind,
        target: EntityKind,
        target_id: Uuid,
    },
    /// Staff delete rejected because other records still reference it.
    StaffHasDependents {
        staff_id: Uuid,
        notes: usize,
        goals: usize,
        achievements: usize,
        reminders: usize,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(kind) => write!(f, "{kind} id must not be nil"),
            Self::EmptyField { kind, field } => write!(f, "{kind}.{field} must not be blank"),
            Self::MultilineField { kind, field } => {
                write!(f, "{kind}.{field} must be a single line")
            }
            Self::UntrimmedField { kind, field } => {
                write!(f, "{kind}.{field} must not have surrounding whitespace")
            }
            Self::InvalidListItem { kind, field, value } => {
                write!(f, "invalid {kind}.{field} item `{value}`")
            }
            Self::InvalidEnum { field, value } => write!(f, "invalid {field} value `{value}`"),
            Self::TimestampOrder { kind, id } => {
                write!(f, "{kind} {id} has a timestamp earlier than created_at")
            }
            Self::CompletionMismatch(id) => {
                write!(f, "reminder {id} completed flag disagrees with completed_at")
            }
            Self::OwnerMismatch {
                kind,
                id,
                owner,
                expected,
            } => write!(
                f,
                "{kind} {id} belongs to staff {owner} but is stored under {expected}"
            ),
            Self::DuplicateIdentity { kind, id } => write!(f, "duplicate {kind} id {id}"),
            Self::DanglingReference {
                kind,
                target,
                target_id,
            } => write!(f, "{kind} references unknown {target} {target_id}"),
            Self::StaffHasDependents {
                staff_id,
                notes,
                goals,
                achievements,
                reminders,
            } => write!(
                f,
                "staff {staff_id} still has {notes} notes, {goals} goals, {achievements} achievements and {reminders} reminders"
            ),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn ensure_id(kind: EntityKind, id: Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilId(kind));
    }
    Ok(())
}

/// Trims a required single-line field.
pub(crate) fn required_line(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { kind, field });
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(ValidationError::MultilineField { kind, field });
    }
    Ok(trimmed.to_string())
}

/// Trims an optional single-line field; blank collapses to `None`.
pub(crate) fn optional_line(
    kind: EntityKind,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.contains(['\n', '\r']) => {
            Err(ValidationError::MultilineField { kind, field })
        }
        Some(text) => Ok(Some(text.to_string())),
    }
}

/// Normalizes a multi-line body: CRLF to LF, trailing whitespace removed.
pub(crate) fn required_body(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<String, ValidationError> {
    let normalized = value.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = normalized.trim_end().trim_start_matches('\n');
    if trimmed.trim().is_empty() {
        return Err(ValidationError::EmptyField { kind, field });
    }
    Ok(trimmed.to_string())
}

/// Trims list items, rejects delimiters, drops duplicates keeping first order.
pub(crate) fn normalize_list(
    kind: EntityKind,
    field: &'static str,
    items: &[String],
) -> Result<Vec<String>, ValidationError> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() || trimmed.contains([',', '[', ']', '\n', '\r']) {
            return Err(ValidationError::InvalidListItem {
                kind,
                field,
                value: item.clone(),
            });
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    Ok(out)
}

/// Lowercases, deduplicates and sorts tag values.
pub(crate) fn normalize_tags(
    kind: EntityKind,
    tags: &[String],
) -> Result<Vec<String>, ValidationError> {
    let lowered: Vec<String> = tags.iter().map(|tag| tag.trim().to_lowercase()).collect();
    let checked = normalize_list(kind, "tags", &lowered)?;
    let sorted: BTreeSet<String> = checked.into_iter().collect();
    Ok(sorted.into_iter().collect())
}

/// Checks an already-normalized list without rewriting it.
pub(crate) fn check_list(
    kind: EntityKind,
    field: &'static str,
    items: &[String],
) -> Result<(), ValidationError> {
    if normalize_list(kind, field, items)?.as_slice() != items {
        return Err(ValidationError::InvalidListItem {
            kind,
            field,
            value: items.join(", "),
        });
    }
    Ok(())
}

pub(crate) fn check_line(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if required_line(kind, field, value)? != value {
        return Err(ValidationError::UntrimmedField { kind, field });
    }
    Ok(())
}

pub(crate) fn check_optional_line(
    kind: EntityKind,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    if let Some(text) = value {
        check_line(kind, field, text)?;
    }
    Ok(())
}
