//! Write-through document store.
//!
//! # Responsibility
//! - Own the in-memory index of every loaded entity and its document.
//! - Route every write through encode or merge, persist it atomically, then
//!   update the index.
//!
//! # Invariants
//! - Reads never touch disk.
//! - The index changes only after the backing write succeeded.
//! - Existing documents are re-read at write time, so edits made on disk
//!   after load survive the next write.
//! - A document path is fixed when its entity is created.
//!
//! # See also
//! - docs/document-format.md

mod index;
pub mod layout;
mod load;
mod persist;

use crate::codec::reminders_doc::encode_reminders;
use crate::codec::staff_doc::encode_staff;
use crate::codec::transcript_doc::encode_transcript;
use crate::codec::{ParseError, RenderedDocument};
use crate::config::StoreConfig;
use crate::merge::merge_document;
use crate::model::reminder::ReminderBook;
use crate::model::staff::{StaffId, StaffRecord};
use crate::model::transcript::{Transcript, TranscriptId};
use crate::model::{EntityKind, ValidationError};
use index::{ChildIndex, Indexed, RemindersSlot};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

pub use index::DocumentRef;
pub use load::{CorruptDocument, DanglingReminder, LoadReport};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure, always carrying enough context to locate the cause.
#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    NotFound { kind: EntityKind, id: Uuid },
    Parse { path: PathBuf, source: ParseError },
    Io { path: PathBuf, source: io::Error },
}

impl StoreError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Parse { .. } => "parse_failed",
            Self::Io { .. } => "io_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Parse { path, source } => {
                write!(f, "cannot parse `{}`: {source}", path.display())
            }
            Self::Io { path, source } => write!(f, "I/O error on `{}`: {source}", path.display()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Parse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// How a document was produced by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Merge,
    /// Known entity whose file was removed from disk.
    Recreate,
}

impl WriteMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Merge => "merge",
            Self::Recreate => "recreate",
        }
    }
}

/// Loaded document tree with a write-through cache.
#[derive(Debug)]
pub struct DocumentStore {
    config: StoreConfig,
    staff: HashMap<StaffId, Indexed<StaffRecord>>,
    children: ChildIndex,
    reminders: RemindersSlot,
    transcripts: HashMap<TranscriptId, Indexed<Transcript>>,
}

impl DocumentStore {
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn staff_record(&self, id: StaffId) -> StoreResult<&StaffRecord> {
        self.staff
            .get(&id)
            .map(|entry| &entry.value)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Staff,
                id,
            })
    }

    /// Every staff record ordered by `(created_at, id)`.
    pub fn staff_records(&self) -> Vec<&StaffRecord> {
        let mut records: Vec<&StaffRecord> = self.staff.values().map(|entry| &entry.value).collect();
        records.sort_by_key(|record| (record.staff.created_at, record.id()));
        records
    }

    /// Staff member whose document holds the given note, goal or achievement.
    pub fn owner_of(&self, kind: EntityKind, id: Uuid) -> StoreResult<StaffId> {
        self.children
            .owner(kind, id)
            .ok_or(StoreError::NotFound { kind, id })
    }

    pub fn staff_document(&self, id: StaffId) -> Option<DocumentRef<'_>> {
        self.staff.get(&id).map(|entry| DocumentRef {
            path: &entry.path,
            text: &entry.raw,
        })
    }

    /// Validates, writes and indexes a staff record (new or existing).
    pub fn put_staff(&mut self, record: StaffRecord) -> StoreResult<()> {
        record.validate()?;
        if let Some((kind, id)) = self.children.conflict(&record) {
            return Err(ValidationError::DuplicateIdentity { kind, id }.into());
        }

        let id = record.id();
        let (path, known) = match self.staff.get(&id) {
            Some(entry) => (entry.path.clone(), true),
            None => (layout::staff_path(&self.config, &record.staff), false),
        };
        let raw = write_document(EntityKind::Staff, &path, &encode_staff(&record), known)?;

        if let Some(previous) = self.staff.get(&id) {
            self.children.remove_record(&previous.value);
        }
        self.children.insert_record(&record);
        self.staff.insert(
            id,
            Indexed {
                value: record,
                path,
                raw,
            },
        );
        Ok(())
    }

    /// Deletes a staff document and drops it from the index.
    pub fn remove_staff(&mut self, id: StaffId) -> StoreResult<StaffRecord> {
        let path = self
            .staff
            .get(&id)
            .map(|entry| entry.path.clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Staff,
                id,
            })?;
        remove_document(EntityKind::Staff, &path)?;

        let removed = self.staff.remove(&id).ok_or(StoreError::NotFound {
            kind: EntityKind::Staff,
            id,
        })?;
        self.children.remove_record(&removed.value);
        Ok(removed.value)
    }

    /// Writes `detached` as the reminder book, then deletes the staff
    /// document. When the delete fails the previous reminders document is
    /// put back on a best-effort basis.
    pub fn remove_staff_detaching(
        &mut self,
        id: StaffId,
        detached: ReminderBook,
    ) -> StoreResult<StaffRecord> {
        self.staff_record(id)?;
        let previous = self.reminders.clone();
        self.put_reminders(detached)?;

        match self.remove_staff(id) {
            Ok(record) => Ok(record),
            Err(err) => {
                self.restore_reminders(previous);
                Err(err)
            }
        }
    }

    pub fn reminder_book(&self) -> &ReminderBook {
        &self.reminders.book
    }

    /// `None` until the reminders document exists.
    pub fn reminders_document(&self) -> Option<DocumentRef<'_>> {
        self.reminders.raw.as_deref().map(|text| DocumentRef {
            path: &self.reminders.path,
            text,
        })
    }

    pub fn put_reminders(&mut self, book: ReminderBook) -> StoreResult<()> {
        book.validate()?;
        let path = self.reminders.path.clone();
        let known = self.reminders.raw.is_some();
        let raw = write_document(EntityKind::Reminder, &path, &encode_reminders(&book), known)?;
        self.reminders = RemindersSlot {
            book,
            path,
            raw: Some(raw),
        };
        Ok(())
    }

    pub fn transcript(&self, id: TranscriptId) -> StoreResult<&Transcript> {
        self.transcripts
            .get(&id)
            .map(|entry| &entry.value)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Transcript,
                id,
            })
    }

    /// Every transcript ordered by `(date, created_at, id)`.
    pub fn transcripts(&self) -> Vec<&Transcript> {
        let mut items: Vec<&Transcript> =
            self.transcripts.values().map(|entry| &entry.value).collect();
        items.sort_by_key(|item| (item.date, item.created_at, item.id));
        items
    }

    pub fn transcript_document(&self, id: TranscriptId) -> Option<DocumentRef<'_>> {
        self.transcripts.get(&id).map(|entry| DocumentRef {
            path: &entry.path,
            text: &entry.raw,
        })
    }

    pub fn put_transcript(&mut self, transcript: Transcript) -> StoreResult<()> {
        transcript.validate()?;
        let (path, known) = match self.transcripts.get(&transcript.id) {
            Some(entry) => (entry.path.clone(), true),
            None => (layout::transcript_path(&self.config, &transcript), false),
        };
        let raw = write_document(
            EntityKind::Transcript,
            &path,
            &encode_transcript(&transcript),
            known,
        )?;
        self.transcripts.insert(
            transcript.id,
            Indexed {
                value: transcript,
                path,
                raw,
            },
        );
        Ok(())
    }

    pub fn remove_transcript(&mut self, id: TranscriptId) -> StoreResult<Transcript> {
        let path = self
            .transcripts
            .get(&id)
            .map(|entry| entry.path.clone())
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Transcript,
                id,
            })?;
        remove_document(EntityKind::Transcript, &path)?;
        self.transcripts
            .remove(&id)
            .map(|entry| entry.value)
            .ok_or(StoreError::NotFound {
                kind: EntityKind::Transcript,
                id,
            })
    }

    fn restore_reminders(&mut self, previous: RemindersSlot) {
        let restored = match &previous.raw {
            Some(raw) => persist::write_atomic(&previous.path, raw),
            None => persist::remove_document(&previous.path),
        };
        match restored {
            Ok(()) => {
                info!("event=reminders_restore module=store status=ok");
                self.reminders = previous;
            }
            Err(err) => {
                warn!(
                    "event=reminders_restore module=store status=error error_code={}",
                    err.code()
                );
            }
        }
    }
}

/// Produces and persists the text for one document; returns what was written.
///
/// A `known` document is merged with its current on-disk text. An unknown
/// one must not exist yet: the file may be a document that failed to load.
fn write_document(
    kind: EntityKind,
    path: &Path,
    fresh: &RenderedDocument,
    known: bool,
) -> StoreResult<String> {
    let started_at = Instant::now();
    let result = persist::read_existing(path).and_then(|existing| {
        let (text, mode) = match (existing, known) {
            (Some(existing), true) => {
                let merged =
                    merge_document(&existing, fresh).map_err(|source| StoreError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
                (merged, WriteMode::Merge)
            }
            (Some(_), false) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "document exists on disk but is not indexed",
                    ),
                })
            }
            (None, true) => (fresh.to_text(), WriteMode::Recreate),
            (None, false) => (fresh.to_text(), WriteMode::Create),
        };
        persist::write_atomic(path, &text)?;
        Ok((text, mode))
    });

    match result {
        Ok((text, mode)) => {
            info!(
                "event=document_write module=store status=ok kind={} mode={} bytes={} duration_ms={}",
                kind,
                mode.as_str(),
                text.len(),
                started_at.elapsed().as_millis()
            );
            Ok(text)
        }
        Err(err) => {
            error!(
                "event=document_write module=store status=error kind={} duration_ms={} error_code={}",
                kind,
                started_at.elapsed().as_millis(),
                err.code()
            );
            Err(err)
        }
    }
}

fn remove_document(kind: EntityKind, path: &Path) -> StoreResult<()> {
    match persist::remove_document(path) {
        Ok(()) => {
            info!("event=document_delete module=store status=ok kind={kind}");
            Ok(())
        }
        Err(err) => {
            error!(
                "event=document_delete module=store status=error kind={kind} error_code={}",
                err.code()
            );
            Err(err)
        }
    }
}
