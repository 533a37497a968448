//! Staff profile model and the per-document staff aggregate.
//!
//! # Responsibility
//! - Define the scalar staff profile stored in a document header.
//! - Group a profile with the notes, goals and achievements rendered into
//!   the same document.
//!
//! # Invariants
//! - `updated_at >= created_at`.
//! - Every child in a `StaffRecord` names the record's staff id as owner and
//!   carries an id unique within the record.

use super::achievement::Achievement;
use super::goal::Goal;
use super::note::Note;
use super::time::{now, Timestamp};
use super::{
    check_line, check_list, check_optional_line, ensure_id, EntityKind, ValidationError,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier of a staff member.
pub type StaffId = Uuid;

/// Scalar staff profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub team: Option<String>,
    /// Manager name or id, free-form.
    pub manager: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub last_one_on_one: Option<NaiveDate>,
    pub next_review: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub concerns: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Staff {
    /// Creates a profile with a generated id and `created_at == updated_at`.
    pub fn new(name: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            role: None,
            department: None,
            team: None,
            manager: None,
            hire_date: None,
            last_one_on_one: None,
            next_review: None,
            skills: Vec::new(),
            concerns: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Staff;
        ensure_id(kind, self.id)?;
        check_line(kind, "name", &self.name)?;
        check_optional_line(kind, "email", self.email.as_deref())?;
        check_optional_line(kind, "role", self.role.as_deref())?;
        check_optional_line(kind, "department", self.department.as_deref())?;
        check_optional_line(kind, "team", self.team.as_deref())?;
        check_optional_line(kind, "manager", self.manager.as_deref())?;
        check_list(kind, "skills", &self.skills)?;
        check_list(kind, "concerns", &self.concerns)?;
        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder { kind, id: self.id });
        }
        Ok(())
    }
}

/// One staff document's worth of state: profile plus owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRecord {
    pub staff: Staff,
    /// Creation order.
    pub notes: Vec<Note>,
    /// Creation order.
    pub goals: Vec<Goal>,
    /// Creation order.
    pub achievements: Vec<Achievement>,
}

impl StaffRecord {
    pub fn new(staff: Staff) -> Self {
        Self {
            staff,
            notes: Vec::new(),
            goals: Vec::new(),
            achievements: Vec::new(),
        }
    }

    pub fn id(&self) -> StaffId {
        self.staff.id
    }

    /// Number of owned children of any kind.
    pub fn dependent_count(&self) -> usize {
        self.notes.len() + self.goals.len() + self.achievements.len()
    }

    /// Validates the profile, every child, ownership and id uniqueness.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.staff.validate()?;
        let owner = self.staff.id;
        let mut ids = HashSet::new();

        for note in &self.notes {
            note.validate()?;
            check_owner(EntityKind::Note, note.id, note.staff_id, owner)?;
            check_unique(&mut ids, EntityKind::Note, note.id)?;
        }
        for goal in &self.goals {
            goal.validate()?;
            check_owner(EntityKind::Goal, goal.id, goal.staff_id, owner)?;
            check_unique(&mut ids, EntityKind::Goal, goal.id)?;
        }
        for achievement in &self.achievements {
            achievement.validate()?;
            check_owner(
                EntityKind::Achievement,
                achievement.id,
                achievement.staff_id,
                owner,
            )?;
            check_unique(&mut ids, EntityKind::Achievement, achievement.id)?;
        }
        Ok(())
    }

    /// Restores creation order after children were read in document order.
    pub(crate) fn sort_children(&mut self) {
        self.notes.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        self.goals.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        self.achievements
            .sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    }
}

fn check_owner(
    kind: EntityKind,
    id: Uuid,
    owner: StaffId,
    expected: StaffId,
) -> Result<(), ValidationError> {
    if owner != expected {
        return Err(ValidationError::OwnerMismatch {
            kind,
            id,
            owner,
            expected,
        });
    }
    Ok(())
}

fn check_unique(ids: &mut HashSet<Uuid>, kind: EntityKind, id: Uuid) -> Result<(), ValidationError> {
    if !ids.insert(id) {
        return Err(ValidationError::DuplicateIdentity { kind, id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Staff, StaffRecord};
    use crate::model::note::Note;
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn new_staff_starts_with_equal_timestamps() {
        let staff = Staff::new("Jane Doe");
        assert!(!staff.id.is_nil());
        assert_eq!(staff.created_at, staff.updated_at);
        staff.validate().unwrap();
    }

    #[test]
    fn record_rejects_child_owned_by_someone_else() {
        let staff = Staff::new("Jane Doe");
        let mut record = StaffRecord::new(staff);
        let stranger = Uuid::new_v4();
        record.notes.push(Note::new(stranger, "misfiled"));

        let err = record.validate().unwrap_err();
        assert!(matches!(err, ValidationError::OwnerMismatch { owner, .. } if owner == stranger));
    }

    #[test]
    fn validate_rejects_untrimmed_name() {
        let mut staff = Staff::new("Jane Doe");
        staff.name = " Jane ".to_string();
        assert!(staff.validate().is_err());
    }
}
