use staffbook_core::{
    DocumentStore, GoalService, GoalStatus, NewGoal, NewNote, NewStaff, NoteFilter, NoteService,
    ParseError, StaffPatch, StaffService, StoreConfig, StoreError,
};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn open(root: &Path) -> DocumentStore {
    let (store, report) = DocumentStore::open(&StoreConfig::new(root)).unwrap();
    assert!(report.is_clean(), "unexpected load problems: {report:?}");
    store
}

fn create_jane(store: &mut DocumentStore) -> Uuid {
    StaffService::new(store)
        .create_staff(NewStaff {
            name: "Jane Doe".to_string(),
            role: Some("Senior Engineer".to_string()),
            department: Some("Platform".to_string()),
            skills: vec!["Rust".to_string(), "Postgres".to_string()],
            ..NewStaff::default()
        })
        .unwrap()
        .id
}

fn note(body: &str) -> NewNote {
    NewNote {
        body: body.to_string(),
        ..NewNote::default()
    }
}

fn doc_path(store: &DocumentStore, id: Uuid) -> PathBuf {
    store.staff_document(id).unwrap().path.to_path_buf()
}

#[test]
fn human_section_survives_regeneration_between_owned_sections() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    GoalService::new(&mut store)
        .add_goal(
            jane,
            NewGoal {
                description: "Lead the billing migration".to_string(),
                target_date: None,
            },
        )
        .unwrap();
    NoteService::new(&mut store)
        .add_note(jane, note("Strong design review."))
        .unwrap();

    let path = doc_path(&store, jane);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("# Jane Doe\n"));
    assert!(text.contains("- **Role:** Senior Engineer\n"));
    let personal = "## Personal Notes\nLikes hiking.\n  Two kids.   \n\n";
    let edited = text.replace("## Notes\n", &format!("{personal}## Notes\n"));
    fs::write(&path, &edited).unwrap();

    let mut store = open(dir.path());
    NoteService::new(&mut store)
        .add_note(jane, note("Asked about the staff track."))
        .unwrap();

    let merged = fs::read_to_string(&path).unwrap();
    let goals_at = merged.find("## Goals").unwrap();
    let personal_at = merged.find(personal).unwrap();
    let notes_at = merged.find("## Notes").unwrap();
    assert!(goals_at < personal_at && personal_at < notes_at);
    assert!(merged.contains("Strong design review."));
    assert!(merged.contains("Asked about the staff track."));

    let reopened = open(dir.path());
    let record = reopened.staff_record(jane).unwrap();
    assert_eq!(record.notes.len(), 2);
    assert_eq!(record.goals.len(), 1);
    assert_eq!(reopened.staff_document(jane).unwrap().text, merged);
}

#[test]
fn disk_edit_made_after_load_is_kept_by_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    let path = doc_path(&store, jane);

    let mut text = fs::read_to_string(&path).unwrap();
    text.push_str("\nP.S. prefers async updates.\n");
    fs::write(&path, &text).unwrap();

    StaffService::new(&mut store)
        .update_staff(
            jane,
            StaffPatch {
                team: Some(Some("Billing".to_string())),
                ..StaffPatch::default()
            },
        )
        .unwrap();

    let merged = fs::read_to_string(&path).unwrap();
    assert!(merged.ends_with("\nP.S. prefers async updates.\n"));
    assert!(merged.contains("- **Team:** Billing\n"));
    assert!(merged.contains("team: Billing\n"));
}

#[test]
fn fenced_heading_in_foreign_section_is_not_owned() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    let path = doc_path(&store, jane);

    let snippet = "## Snippets\n```md\n## Notes\n- fake note\n```\n\n";
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("---\n*Last updated", &format!("{snippet}---\n*Last updated"))).unwrap();

    NoteService::new(&mut store)
        .add_note(jane, note("Real note."))
        .unwrap();

    let merged = fs::read_to_string(&path).unwrap();
    assert!(merged.contains(snippet));
    assert_eq!(merged.matches("Real note.").count(), 2);

    let reopened = open(dir.path());
    let notes = NoteService::new(&mut { reopened })
        .list_notes(jane, &NoteFilter::default())
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "Real note.");
}

#[test]
fn deleted_owned_section_is_recreated_in_canonical_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    let path = doc_path(&store, jane);

    let text = fs::read_to_string(&path).unwrap();
    let without_goals = text.replace("## Goals\n\n_No goals yet._\n\n", "");
    assert_ne!(text, without_goals);
    fs::write(&path, without_goals).unwrap();

    GoalService::new(&mut store)
        .add_goal(
            jane,
            NewGoal {
                description: "Mentor a new hire".to_string(),
                target_date: None,
            },
        )
        .unwrap();

    let merged = fs::read_to_string(&path).unwrap();
    let overview_at = merged.find("## Overview").unwrap();
    let goals_at = merged.find("## Goals").unwrap();
    let notes_at = merged.find("## Notes").unwrap();
    assert!(overview_at < goals_at && goals_at < notes_at);
    assert!(merged.contains("- Mentor a new hire — not_started\n"));
}

#[test]
fn unanchored_bullet_in_owned_section_is_regenerated_away() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    let path = doc_path(&store, jane);

    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("_No notes yet._", "- typed straight into the file")).unwrap();

    let reopened = open(dir.path());
    assert!(reopened.staff_record(jane).unwrap().notes.is_empty());

    let mut store = reopened;
    NoteService::new(&mut store)
        .add_note(jane, note("Recorded properly."))
        .unwrap();
    let merged = fs::read_to_string(&path).unwrap();
    assert!(!merged.contains("typed straight into the file"));
}

#[test]
fn every_write_advances_updated_at_and_footer() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);

    let mut stamps = vec![store.staff_record(jane).unwrap().staff.updated_at];
    let mut goals = GoalService::new(&mut store);
    let goal = goals
        .add_goal(
            jane,
            NewGoal {
                description: "Ship the audit log".to_string(),
                target_date: None,
            },
        )
        .unwrap();
    goals
        .update_goal_status(goal.id, GoalStatus::InProgress)
        .unwrap();
    let updated = goals.add_goal_progress(goal.id, "Schema merged").unwrap();
    assert_eq!(updated.progress.len(), 1);
    assert!(updated.updated_at > goal.updated_at);

    for body in ["one", "two", "three"] {
        NoteService::new(&mut store).add_note(jane, note(body)).unwrap();
        stamps.push(store.staff_record(jane).unwrap().staff.updated_at);
    }
    assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));

    let record = store.staff_record(jane).unwrap();
    let text = store.staff_document(jane).unwrap().text;
    let stamp = record
        .staff
        .updated_at
        .to_rfc3339_opts(chrono::SecondsFormat::Micros, true);
    assert!(text.ends_with(&format!("---\n*Last updated: {stamp}*\n")));
    assert!(text.contains(&format!("updated_at: {stamp}\n")));
}

#[test]
fn reopen_yields_equal_records_and_rename_keeps_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    NoteService::new(&mut store)
        .add_note(
            jane,
            NewNote {
                body: "Multi-line\n\nnote with `code`\n## not a heading".to_string(),
                tags: vec!["Career".to_string(), "feedback".to_string()],
                category: Some("one_on_one".to_string()),
                source: Some("weekly sync".to_string()),
            },
        )
        .unwrap();
    let path = doc_path(&store, jane);

    let renamed = StaffService::new(&mut store)
        .update_staff(
            jane,
            StaffPatch {
                name: Some("Jane Smith".to_string()),
                ..StaffPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Jane Smith");
    assert_eq!(doc_path(&store, jane), path);

    let reopened = open(dir.path());
    assert_eq!(
        reopened.staff_record(jane).unwrap(),
        store.staff_record(jane).unwrap()
    );
    let found = StaffService::new(&mut { reopened })
        .find_staff_by_name("jane smith")
        .unwrap();
    assert_eq!(found.id, jane);
}

#[test]
fn hand_written_duplicate_heading_makes_document_unreadable_not_lossy() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    NoteService::new(&mut store)
        .add_note(jane, note("Strong design review."))
        .unwrap();

    let path = doc_path(&store, jane);
    let text = fs::read_to_string(&path).unwrap();
    let edited = text.replace(
        "## Goals",
        "## Notes\nMy own jottings about Jane.\n\n## Goals",
    );
    fs::write(&path, &edited).unwrap();

    let (reopened, report) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    assert_eq!(report.corrupt.len(), 1);
    assert_eq!(report.corrupt[0].path, path);
    assert!(matches!(
        report.corrupt[0].error,
        StoreError::Parse {
            source: ParseError::MalformedItem { .. },
            ..
        }
    ));
    assert!(reopened.staff_record(jane).is_err());

    let before = store.staff_record(jane).unwrap().clone();
    let err = NoteService::new(&mut store)
        .add_note(jane, note("Would be lost."))
        .unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), edited);
    assert_eq!(store.staff_record(jane).unwrap(), &before);
}

#[test]
fn unclosed_fence_above_owned_sections_reports_corrupt_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = open(dir.path());
    let jane = create_jane(&mut store);
    NoteService::new(&mut store)
        .add_note(jane, note("Strong design review."))
        .unwrap();

    let path = doc_path(&store, jane);
    let text = fs::read_to_string(&path).unwrap();
    let personal = "## Personal\n```\nstarted a snippet and never closed it\n\n";
    fs::write(&path, text.replace("## Goals", &format!("{personal}## Goals"))).unwrap();

    let (reopened, report) = DocumentStore::open(&StoreConfig::new(dir.path())).unwrap();
    assert_eq!(report.corrupt.len(), 1);
    assert!(reopened.staff_record(jane).is_err());
}
