//! Achievement model: a dated accomplishment recorded for a staff member.

use super::staff::StaffId;
use super::time::{now, Timestamp};
use super::{check_line, ensure_id, EntityKind, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AchievementId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub staff_id: StaffId,
    pub description: String,
    pub achieved_on: NaiveDate,
    pub created_at: Timestamp,
}

impl Achievement {
    /// Creates an achievement dated today (UTC).
    pub fn new(staff_id: StaffId, description: impl Into<String>) -> Self {
        let created_at = now();
        Self {
            id: Uuid::new_v4(),
            staff_id,
            description: description.into(),
            achieved_on: created_at.date_naive(),
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(EntityKind::Achievement, self.id)?;
        ensure_id(EntityKind::Staff, self.staff_id)?;
        check_line(EntityKind::Achievement, "description", &self.description)
    }
}
