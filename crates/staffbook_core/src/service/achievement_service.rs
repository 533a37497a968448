//! Achievement use-cases.

use super::{require_staff, update_record};
use crate::model::achievement::{Achievement, AchievementId};
use crate::model::staff::StaffId;
use crate::model::{required_line, EntityKind};
use crate::store::{DocumentStore, StoreError, StoreResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAchievement {
    pub description: String,
    /// Defaults to the UTC date of creation.
    pub achieved_on: Option<NaiveDate>,
}

pub struct AchievementService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> AchievementService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn add_achievement(
        &mut self,
        staff_id: StaffId,
        input: NewAchievement,
    ) -> StoreResult<Achievement> {
        let description =
            required_line(EntityKind::Achievement, "description", &input.description)?;
        let mut achievement = Achievement::new(staff_id, description);
        require_staff(self.store, EntityKind::Achievement, staff_id)?;

        update_record(self.store, staff_id, |record, at| {
            achievement.created_at = at;
            achievement.achieved_on = input.achieved_on.unwrap_or_else(|| at.date_naive());
            record.achievements.push(achievement.clone());
            Ok(achievement)
        })
    }

    pub fn get_achievement(&self, id: AchievementId) -> StoreResult<Achievement> {
        let owner = self.store.owner_of(EntityKind::Achievement, id)?;
        self.store
            .staff_record(owner)?
            .achievements
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(not_found(id))
    }

    /// Achievements of one staff member in creation order.
    pub fn list_achievements(&self, staff_id: StaffId) -> StoreResult<Vec<Achievement>> {
        Ok(self.store.staff_record(staff_id)?.achievements.clone())
    }

    pub fn delete_achievement(&mut self, id: AchievementId) -> StoreResult<()> {
        let owner = self.store.owner_of(EntityKind::Achievement, id)?;
        update_record(self.store, owner, |record, _| {
            let before = record.achievements.len();
            record.achievements.retain(|item| item.id != id);
            if record.achievements.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }
}

fn not_found(id: AchievementId) -> StoreError {
    StoreError::NotFound {
        kind: EntityKind::Achievement,
        id,
    }
}
