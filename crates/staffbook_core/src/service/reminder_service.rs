//! Reminder use-cases over the single reminders document.
//!
//! # Invariants
//! - A new reminder may only reference a staff member that exists.
//! - Completing is idempotent: completing a done reminder writes nothing and
//!   keeps the original `completed_at`.

use super::require_staff;
use crate::model::reminder::{Priority, Reminder, ReminderBook, ReminderId};
use crate::model::staff::StaffId;
use crate::model::time::advance;
use crate::model::{normalize_list, required_line, EntityKind};
use crate::store::{DocumentStore, StoreError, StoreResult};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewReminder {
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub staff_id: Option<StaffId>,
    pub tags: Vec<String>,
}

/// Mutable reminder fields. `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderPatch {
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderFilter {
    pub completed: Option<bool>,
    pub staff_id: Option<StaffId>,
    pub priority: Option<Priority>,
    /// Upcoming work: due on or before this date.
    pub due_on_or_before: Option<NaiveDate>,
    /// Pending and due strictly before this date.
    pub overdue_as_of: Option<NaiveDate>,
}

impl ReminderFilter {
    fn matches(&self, reminder: &Reminder) -> bool {
        self.completed.map_or(true, |done| reminder.completed == done)
            && self
                .staff_id
                .map_or(true, |staff_id| reminder.staff_id == Some(staff_id))
            && self.priority.map_or(true, |priority| reminder.priority == priority)
            && self.due_on_or_before.map_or(true, |limit| {
                reminder.due_date.is_some_and(|due| due <= limit)
            })
            && self
                .overdue_as_of
                .map_or(true, |today| reminder.is_overdue(today))
    }
}

pub struct ReminderService<'a> {
    store: &'a mut DocumentStore,
}

impl<'a> ReminderService<'a> {
    pub fn new(store: &'a mut DocumentStore) -> Self {
        Self { store }
    }

    pub fn create_reminder(&mut self, input: NewReminder) -> StoreResult<Reminder> {
        let kind = EntityKind::Reminder;
        if let Some(staff_id) = input.staff_id {
            require_staff(self.store, kind, staff_id)?;
        }

        let mut reminder = Reminder::new(required_line(kind, "description", &input.description)?);
        reminder.priority = input.priority;
        reminder.due_date = input.due_date;
        reminder.staff_id = input.staff_id;
        reminder.tags = normalize_list(kind, "tags", &input.tags)?;

        self.write(|book| {
            book.reminders.push(reminder.clone());
            Ok(reminder)
        })
    }

    pub fn get_reminder(&self, id: ReminderId) -> StoreResult<Reminder> {
        self.store
            .reminder_book()
            .get(id)
            .cloned()
            .ok_or(not_found(id))
    }

    /// Ordered by due date (undated last), then creation.
    pub fn list_reminders(&self, filter: &ReminderFilter) -> Vec<Reminder> {
        let mut items: Vec<Reminder> = self
            .store
            .reminder_book()
            .reminders
            .iter()
            .filter(|reminder| filter.matches(reminder))
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.due_date.is_none(), item.due_date, item.created_at, item.id));
        items
    }

    pub fn update_reminder(&mut self, id: ReminderId, patch: ReminderPatch) -> StoreResult<Reminder> {
        self.get_reminder(id)?;
        self.write(|book| {
            let reminder = book.get_mut(id).ok_or(not_found(id))?;
            if let Some(priority) = patch.priority {
                reminder.priority = priority;
            }
            if let Some(due_date) = patch.due_date {
                reminder.due_date = due_date;
            }
            Ok(reminder.clone())
        })
    }

    pub fn complete_reminder(&mut self, id: ReminderId) -> StoreResult<Reminder> {
        let current = self.get_reminder(id)?;
        if current.completed {
            return Ok(current);
        }
        self.write(|book| {
            let at = book.updated_at;
            let reminder = book.get_mut(id).ok_or(not_found(id))?;
            reminder.complete(at);
            Ok(reminder.clone())
        })
    }

    pub fn delete_reminder(&mut self, id: ReminderId) -> StoreResult<()> {
        self.get_reminder(id)?;
        self.write(|book| {
            book.reminders.retain(|reminder| reminder.id != id);
            Ok(())
        })
    }

    /// Applies `change` to a copy of the book stamped with a fresh
    /// `updated_at`, then writes it.
    fn write<T>(
        &mut self,
        change: impl FnOnce(&mut ReminderBook) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut book = self.store.reminder_book().clone();
        book.updated_at = advance(book.updated_at);
        let output = change(&mut book)?;
        self.store.put_reminders(book)?;
        Ok(output)
    }
}

fn not_found(id: ReminderId) -> StoreError {
    StoreError::NotFound {
        kind: EntityKind::Reminder,
        id,
    }
}
