//! Staff profile use-cases.
//!
//! # Responsibility
//! - Create, read, list, update and delete staff profiles.
//! - Enforce the delete policy for staff that still have dependents.
//!
//! # Invariants
//! - `Reject` deletes only a staff member with no notes, goals, achievements
//!   or referencing reminders.
//! - `Cascade` drops the owned children with the document and detaches
//!   reminders before the document is removed.

use super::{same_text, update_record};
use crate::model::staff::{Staff, StaffId, StaffRecord};
use crate::model::time::advance;
use crate::model::{normalize_list, optional_line, required_line, EntityKind, ValidationError};
use crate::store::{DocumentStore, StoreResult};
use chrono::NaiveDate;
use log::info;

/// Input for `create_staff`. Text is trimmed and blank optionals dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStaff {
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub team: Option<String>,
    pub manager: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub skills: Vec<String>,
    pub concerns: Vec<String>,
}

/// Partial profile update. The outer `Option` means "leave unchanged"; an
/// inner `None` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffPatch {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub role: Option<Option<String>>,
    pub department: Option<Option<String>>,
    pub team: Option<Option<String>>,
    pub manager: Option<Option<String>>,
    pub hire_date: Option<Option<NaiveDate>>,
    pub last_one_on_one: Option<Option<NaiveDate>>,
    pub next_review: Option<Option<NaiveDate>>,
    pub skills: Option<Vec<String>>,
    pub concerns: Option<Vec<String>>,
}

/// Listing filter; every set field must match (case-insensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffFilter {
    pub department: Option<String>,
    pub role: Option<String>,
    pub team: Option<String>,
    pub manager: Option<String>,
}

impl StaffFilter {
    fn matches(&self, staff: &Staff) -> bool {
        let field = |wanted: &Option<String>, value: &Option<String>| {
            wanted
                .as_deref()
                .map_or(true, |wanted| same_text(value.as_deref(), wanted))
        };
        field(&self.department, &staff.department)
            && field(&self.role, &staff.role)
            && field(&self.team, &staff.team)
            && field(&self.manager, &staff.manager)
    }
}

/// What happens to dependents when a staff member is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Refuse while anything still depends on the staff member.
    #[default]
    Reject,
    /// Delete owned notes, goals and achievements; detach reminders.
    Cascade,
}

pub struct StaffService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> StaffService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn create_staff(&mut self, input: NewStaff) -> StoreResult<Staff> {
        let kind = EntityKind::Staff;
        let mut staff = Staff::new(required_line(kind, "name", &input.name)?);
        staff.email = optional_line(kind, "email", input.email.as_deref())?;
        staff.role = optional_line(kind, "role", input.role.as_deref())?;
        staff.department = optional_line(kind, "department", input.department.as_deref())?;
        staff.team = optional_line(kind, "team", input.team.as_deref())?;
        staff.manager = optional_line(kind, "manager", input.manager.as_deref())?;
        staff.hire_date = input.hire_date;
        staff.skills = normalize_list(kind, "skills", &input.skills)?;
        staff.concerns = normalize_list(kind, "concerns", &input.concerns)?;

        self.store.put_staff(StaffRecord::new(staff.clone()))?;
        Ok(staff)
    }

    pub fn get_staff(&self, id: StaffId) -> StoreResult<Staff> {
        Ok(self.store.staff_record(id)?.staff.clone())
    }

    /// Profile plus notes, goals and achievements.
    pub fn get_staff_record(&self, id: StaffId) -> StoreResult<StaffRecord> {
        self.store.staff_record(id).cloned()
    }

    /// First staff member (in listing order) whose name matches, ignoring case.
    pub fn find_staff_by_name(&self, name: &str) -> Option<Staff> {
        self.store
            .staff_records()
            .into_iter()
            .find(|record| same_text(Some(record.staff.name.as_str()), name))
            .map(|record| record.staff.clone())
    }

    /// Staff ordered by `(created_at, id)`.
    pub fn list_staff(&self, filter: &StaffFilter) -> Vec<Staff> {
        self.store
            .staff_records()
            .into_iter()
            .filter(|record| filter.matches(&record.staff))
            .map(|record| record.staff.clone())
            .collect()
    }

    /// Applies a partial update. Renaming keeps the document at its path.
    pub fn update_staff(&mut self, id: StaffId, patch: StaffPatch) -> StoreResult<Staff> {
        update_record(self.store, id, |record, _| {
            apply_patch(&mut record.staff, patch)?;
            Ok(())
        })?;
        self.get_staff(id)
    }

    pub fn delete_staff(&mut self, id: StaffId, mode: DeleteMode) -> StoreResult<()> {
        let record = self.store.staff_record(id)?;
        let reminders = self.store.reminder_book().referencing(id).count();
        let (notes, goals, achievements) = (
            record.notes.len(),
            record.goals.len(),
            record.achievements.len(),
        );

        match mode {
            DeleteMode::Reject => {
                if record.dependent_count() > 0 || reminders > 0 {
                    return Err(ValidationError::StaffHasDependents {
                        staff_id: id,
                        notes,
                        goals,
                        achievements,
                        reminders,
                    }
                    .into());
                }
                self.store.remove_staff(id)?;
            }
            DeleteMode::Cascade if reminders == 0 => {
                self.store.remove_staff(id)?;
            }
            DeleteMode::Cascade => {
                let mut book = self.store.reminder_book().clone();
                for reminder in book
                    .reminders
                    .iter_mut()
                    .filter(|reminder| reminder.staff_id == Some(id))
                {
                    reminder.staff_id = None;
                }
                book.updated_at = advance(book.updated_at);
                self.store.remove_staff_detaching(id, book)?;
            }
        }

        info!(
            "event=staff_delete module=service status=ok mode={:?} notes={} goals={} achievements={} reminders_detached={}",
            mode,
            notes,
            goals,
            achievements,
            if mode == DeleteMode::Cascade { reminders } else { 0 }
        );
        Ok(())
    }
}

fn apply_patch(staff: &mut Staff, patch: StaffPatch) -> Result<(), ValidationError> {
    let kind = EntityKind::Staff;
    if let Some(name) = patch.name {
        staff.name = required_line(kind, "name", &name)?;
    }
    if let Some(email) = patch.email {
        staff.email = optional_line(kind, "email", email.as_deref())?;
    }
    if let Some(role) = patch.role {
        staff.role = optional_line(kind, "role", role.as_deref())?;
    }
    if let Some(department) = patch.department {
        staff.department = optional_line(kind, "department", department.as_deref())?;
    }
    if let Some(team) = patch.team {
        staff.team = optional_line(kind, "team", team.as_deref())?;
    }
    if let Some(manager) = patch.manager {
        staff.manager = optional_line(kind, "manager", manager.as_deref())?;
    }
    if let Some(hire_date) = patch.hire_date {
        staff.hire_date = hire_date;
    }
    if let Some(last) = patch.last_one_on_one {
        staff.last_one_on_one = last;
    }
    if let Some(next) = patch.next_review {
        staff.next_review = next;
    }
    if let Some(skills) = patch.skills {
        staff.skills = normalize_list(kind, "skills", &skills)?;
    }
    if let Some(concerns) = patch.concerns {
        staff.concerns = normalize_list(kind, "concerns", &concerns)?;
    }
    Ok(())
}
