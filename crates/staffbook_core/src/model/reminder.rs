//! Reminder model and the aggregate reminder book.
//!
//! # Responsibility
//! - Define the independent reminder record.
//! - Define `ReminderBook`, the single-document collection of all reminders.
//!
//! # Invariants
//! - `completed == completed_at.is_some()`.
//! - `completed_at` is written once; completing twice keeps the first stamp.

use super::staff::StaffId;
use super::time::{now, Timestamp};
use super::{check_line, check_list, ensure_id, EntityKind, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type ReminderId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    /// Older documents spell this `medium`.
    #[serde(alias = "medium")]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" | "medium" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(ValidationError::InvalidEnum {
                field: "reminder.priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Optional related staff member.
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Reminder {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            priority: Priority::Normal,
            due_date: None,
            staff_id: None,
            tags: Vec::new(),
            completed: false,
            completed_at: None,
            created_at: now(),
        }
    }

    /// Marks the reminder done. Returns `false` when it already was.
    pub fn complete(&mut self, at: Timestamp) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(at);
        true
    }

    /// Pending and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Reminder;
        ensure_id(kind, self.id)?;
        if let Some(staff_id) = self.staff_id {
            ensure_id(EntityKind::Staff, staff_id)?;
        }
        check_line(kind, "description", &self.description)?;
        check_list(kind, "tags", &self.tags)?;
        if self.completed != self.completed_at.is_some() {
            return Err(ValidationError::CompletionMismatch(self.id));
        }
        if self.completed_at.is_some_and(|at| at < self.created_at) {
            return Err(ValidationError::TimestampOrder { kind, id: self.id });
        }
        Ok(())
    }
}

/// Every reminder, persisted together in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderBook {
    pub reminders: Vec<Reminder>,
    pub updated_at: Timestamp,
}

impl ReminderBook {
    /// Book that has never been written.
    pub fn empty() -> Self {
        Self {
            reminders: Vec::new(),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|reminder| reminder.id == id)
    }

    pub fn get_mut(&mut self, id: ReminderId) -> Option<&mut Reminder> {
        self.reminders.iter_mut().find(|reminder| reminder.id == id)
    }

    pub fn referencing(&self, staff_id: StaffId) -> impl Iterator<Item = &Reminder> {
        self.reminders
            .iter()
            .filter(move |reminder| reminder.staff_id == Some(staff_id))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut ids = HashSet::new();
        for reminder in &self.reminders {
            reminder.validate()?;
            if !ids.insert(reminder.id) {
                return Err(ValidationError::DuplicateIdentity {
                    kind: EntityKind::Reminder,
                    id: reminder.id,
                });
            }
        }
        Ok(())
    }
}
