//! Core domain logic for staffbook.
//! Staff, reminders and call transcripts persisted as hand-editable Markdown
//! documents; this crate is the single source of truth for their invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod merge;
pub mod model;
pub mod service;
pub mod store;

pub use codec::ParseError;
pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use merge::merge_document;
pub use model::achievement::{Achievement, AchievementId};
pub use model::goal::{Goal, GoalId, GoalStatus, ProgressEntry};
pub use model::note::{Note, NoteId};
pub use model::reminder::{Priority, Reminder, ReminderBook, ReminderId};
pub use model::staff::{Staff, StaffId, StaffRecord};
pub use model::transcript::{Transcript, TranscriptId};
pub use model::{EntityKind, ValidationError};
pub use service::{
    AchievementService, DeleteMode, GoalFilter, GoalService, NewAchievement, NewGoal, NewNote,
    NewReminder, NewStaff, NewTranscript, NoteFilter, NoteService, ReminderFilter, ReminderPatch,
    ReminderService, StaffFilter, StaffPatch, StaffService, TranscriptFilter, TranscriptService,
};
pub use store::{
    CorruptDocument, DanglingReminder, DocumentRef, DocumentStore, LoadReport, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
