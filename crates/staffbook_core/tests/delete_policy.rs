use staffbook_core::{
    AchievementService, DeleteMode, DocumentStore, GoalService, NewAchievement, NewGoal, NewNote,
    NewReminder, NewStaff, NoteService, ReminderFilter, ReminderService, StaffService, StoreConfig,
    StoreError, ValidationError,
};
use std::fs;
use std::path::Path;
use uuid::Uuid;

fn open(root: &Path) -> DocumentStore {
    DocumentStore::open(&StoreConfig::new(root)).unwrap().0
}

fn add_staff(store: &mut DocumentStore, name: &str) -> Uuid {
    StaffService::new(store)
        .create_staff(NewStaff {
            name: name.to_string(),
            ..NewStaff::default()
        })
        .unwrap()
        .id
}

fn add_reminder(store: &mut DocumentStore, description: &str, staff_id: Option<Uuid>) -> Uuid {
    ReminderService::new(store)
        .create_reminder(NewReminder {
            description: description.to_string(),
            staff_id,
            ..NewReminder::default()
        })
        .unwrap()
        .id
}

#[test]
fn reject_refuses_staff_with_children() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let ada = add_staff(&mut store, "Ada");
    NoteService::new(&mut store)
        .add_note(
            ada,
            NewNote {
                body: "Quarterly check-in".to_string(),
                ..NewNote::default()
            },
        )
        .unwrap();
    let path = store.staff_document(ada).unwrap().path.to_path_buf();

    let err = StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::Reject)
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::StaffHasDependents {
            notes: 1,
            reminders: 0,
            ..
        })
    ));
    assert!(path.is_file());
    assert!(store.staff_record(ada).is_ok());
}

#[test]
fn reject_refuses_staff_referenced_by_reminder() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let ada = add_staff(&mut store, "Ada");
    add_reminder(&mut store, "Book the offsite", Some(ada));

    let err = StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::default())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::StaffHasDependents { reminders: 1, .. })
    ));
}

#[test]
fn reject_deletes_staff_without_dependents() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let ada = add_staff(&mut store, "Ada");
    let path = store.staff_document(ada).unwrap().path.to_path_buf();

    StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::Reject)
        .unwrap();

    assert!(!path.exists());
    assert!(matches!(
        store.staff_record(ada).unwrap_err(),
        StoreError::NotFound { id, .. } if id == ada
    ));
    assert!(StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::Reject)
        .is_err());
}

#[test]
fn cascade_removes_children_and_detaches_reminders() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let ada = add_staff(&mut store, "Ada");
    let grace = add_staff(&mut store, "Grace");

    let note = NoteService::new(&mut store)
        .add_note(
            ada,
            NewNote {
                body: "Moving teams".to_string(),
                ..NewNote::default()
            },
        )
        .unwrap();
    let goal = GoalService::new(&mut store)
        .add_goal(
            ada,
            NewGoal {
                description: "Hand over on-call".to_string(),
                target_date: None,
            },
        )
        .unwrap();
    AchievementService::new(&mut store)
        .add_achievement(
            ada,
            NewAchievement {
                description: "Shipped v2".to_string(),
                achieved_on: None,
            },
        )
        .unwrap();
    let detached = add_reminder(&mut store, "Exit interview", Some(ada));
    let untouched = add_reminder(&mut store, "Grace promo packet", Some(grace));
    let staff_path = store.staff_document(ada).unwrap().path.to_path_buf();

    StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::Cascade)
        .unwrap();

    assert!(!staff_path.exists());
    assert!(NoteService::new(&mut store).get_note(note.id).is_err());
    assert!(GoalService::new(&mut store).get_goal(goal.id).is_err());

    let reminders = ReminderService::new(&mut store);
    assert_eq!(reminders.get_reminder(detached).unwrap().staff_id, None);
    assert_eq!(reminders.get_reminder(untouched).unwrap().staff_id, Some(grace));
    assert!(reminders
        .list_reminders(&ReminderFilter {
            staff_id: Some(ada),
            ..ReminderFilter::default()
        })
        .is_empty());

    let on_disk = fs::read_to_string(dir.path().join("reminders.md")).unwrap();
    assert!(!on_disk.contains(&ada.to_string()));
    assert!(on_disk.contains(&grace.to_string()));

    let (reopened, report) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.staff, 1);
    assert_eq!(reopened.reminder_book().reminders.len(), 2);
}

#[test]
fn child_deletes_rewrite_owning_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let ada = add_staff(&mut store, "Ada");
    let note = NoteService::new(&mut store)
        .add_note(
            ada,
            NewNote {
                body: "Temporary".to_string(),
                ..NewNote::default()
            },
        )
        .unwrap();

    NoteService::new(&mut store).delete_note(note.id).unwrap();

    let text = store.staff_document(ada).unwrap().text;
    assert!(!text.contains("Temporary"));
    assert!(text.contains("_No notes yet._"));
    assert!(matches!(
        NoteService::new(&mut store).delete_note(note.id).unwrap_err(),
        StoreError::NotFound { .. }
    ));

    StaffService::new(&mut store)
        .delete_staff(ada, DeleteMode::Reject)
        .unwrap();
}
