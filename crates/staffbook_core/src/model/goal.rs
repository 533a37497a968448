//! Goal model with status lifecycle and progress history.
//!
//! # Invariants
//! - Only `status` and `progress` change after creation.
//! - `progress` is ordered by entry time; `updated_at` is never earlier than
//!   the latest entry.

use super::staff::StaffId;
use super::time::{now, Timestamp};
use super::{check_line, ensure_id, EntityKind, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

pub type GoalId = Uuid;

/// Lifecycle state of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl Display for GoalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            other => Err(ValidationError::InvalidEnum {
                field: "goal.status",
                value: other.to_string(),
            }),
        }
    }
}

/// One timestamped progress note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub at: Timestamp,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub staff_id: StaffId,
    pub description: String,
    pub status: GoalStatus,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Goal {
    /// Creates a goal in `not_started` state.
    pub fn new(staff_id: StaffId, description: impl Into<String>) -> Self {
        let stamp = now();
        Self {
            id: Uuid::new_v4(),
            staff_id,
            description: description.into(),
            status: GoalStatus::NotStarted,
            target_date: None,
            progress: Vec::new(),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    pub fn latest_progress(&self) -> Option<&ProgressEntry> {
        self.progress.last()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let kind = EntityKind::Goal;
        ensure_id(kind, self.id)?;
        ensure_id(EntityKind::Staff, self.staff_id)?;
        check_line(kind, "description", &self.description)?;
        for entry in &self.progress {
            check_line(kind, "progress", &entry.note)?;
        }
        let ordered = self.progress.windows(2).all(|pair| pair[0].at <= pair[1].at);
        let latest_ok = self
            .latest_progress()
            .map_or(true, |entry| entry.at <= self.updated_at);
        if self.updated_at < self.created_at || !ordered || !latest_ok {
            return Err(ValidationError::TimestampOrder { kind, id: self.id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Goal, GoalStatus, ProgressEntry};
    use crate::model::ValidationError;
    use chrono::Duration;
    use uuid::Uuid;

    #[test]
    fn status_parses_case_insensitively_and_rejects_unknown() {
        assert_eq!("IN_PROGRESS".parse::<GoalStatus>().unwrap(), GoalStatus::InProgress);
        let err = "paused".parse::<GoalStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEnum { .. }));
    }

    #[test]
    fn validate_rejects_progress_after_updated_at() {
        let mut goal = Goal::new(Uuid::new_v4(), "Finish cert");
        goal.progress.push(ProgressEntry {
            at: goal.updated_at + Duration::seconds(5),
            note: "too late".to_string(),
        });
        assert!(goal.validate().is_err());
    }
}
