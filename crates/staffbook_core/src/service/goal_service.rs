//! Goal use-cases: creation, status changes and progress updates.

use super::{require_staff, update_record};
use crate::model::goal::{Goal, GoalId, GoalStatus, ProgressEntry};
use crate::model::staff::{StaffId, StaffRecord};
use crate::model::time::{advance, Timestamp};
use crate::model::{required_line, EntityKind};
use crate::store::{DocumentStore, StoreError, StoreResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewGoal {
    pub description: String,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalFilter {
    pub status: Option<GoalStatus>,
}

pub struct GoalService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> GoalService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    /// Adds a goal in `not_started` state.
    pub fn add_goal(&mut self, staff_id: StaffId, input: NewGoal) -> StoreResult<Goal> {
        let description = required_line(EntityKind::Goal, "description", &input.description)?;
        let mut goal = Goal::new(staff_id, description);
        goal.target_date = input.target_date;
        require_staff(self.store, EntityKind::Goal, staff_id)?;

        update_record(self.store, staff_id, |record, at| {
            goal.created_at = at;
            goal.updated_at = at;
            record.goals.push(goal.clone());
            Ok(goal)
        })
    }

    pub fn get_goal(&self, id: GoalId) -> StoreResult<Goal> {
        let owner = self.store.owner_of(EntityKind::Goal, id)?;
        self.store
            .staff_record(owner)?
            .goals
            .iter()
            .find(|goal| goal.id == id)
            .cloned()
            .ok_or(not_found(id))
    }

    /// Goals of one staff member in creation order.
    pub fn list_goals(&self, staff_id: StaffId, filter: &GoalFilter) -> StoreResult<Vec<Goal>> {
        Ok(self
            .store
            .staff_record(staff_id)?
            .goals
            .iter()
            .filter(|goal| filter.status.map_or(true, |status| goal.status == status))
            .cloned()
            .collect())
    }

    /// Sets the status; setting the current status again writes nothing.
    pub fn update_goal_status(&mut self, id: GoalId, status: GoalStatus) -> StoreResult<Goal> {
        let current = self.get_goal(id)?;
        if current.status == status {
            return Ok(current);
        }
        self.change_goal(id, |goal, _| goal.status = status)
    }

    /// Appends a dated progress entry.
    pub fn add_goal_progress(&mut self, id: GoalId, note: &str) -> StoreResult<Goal> {
        let note = required_line(EntityKind::Goal, "progress", note)?;
        self.change_goal(id, |goal, at| goal.progress.push(ProgressEntry { at, note }))
    }

    pub fn delete_goal(&mut self, id: GoalId) -> StoreResult<()> {
        let owner = self.store.owner_of(EntityKind::Goal, id)?;
        update_record(self.store, owner, |record, _| {
            let before = record.goals.len();
            record.goals.retain(|goal| goal.id != id);
            if record.goals.len() == before {
                return Err(not_found(id));
            }
            Ok(())
        })
    }

    fn change_goal(
        &mut self,
        id: GoalId,
        change: impl FnOnce(&mut Goal, Timestamp),
    ) -> StoreResult<Goal> {
        let owner = self.store.owner_of(EntityKind::Goal, id)?;
        update_record(self.store, owner, |record: &mut StaffRecord, at| {
            let goal = record
                .goals
                .iter_mut()
                .find(|goal| goal.id == id)
                .ok_or(not_found(id))?;
            let stamp = at.max(advance(goal.updated_at));
            change(goal, stamp);
            goal.updated_at = stamp;
            Ok(goal.clone())
        })
    }
}

fn not_found(id: GoalId) -> StoreError {
    StoreError::NotFound {
        kind: EntityKind::Goal,
        id,
    }
}
