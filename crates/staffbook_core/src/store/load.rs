//! Startup scan of the document tree.
//!
//! # Invariants
//! - One unreadable or invalid document never aborts the load; it is
//!   reported and left out of the index.
//! - Documents are visited in file-name order, so when two files claim the
//!   same identity the first one wins deterministically.

use super::index::{ChildIndex, Indexed, RemindersSlot};
use super::layout::is_document;
use super::persist::read_existing;
use super::{DocumentStore, StoreError, StoreResult};
use crate::codec::reminders_doc::decode_reminders;
use crate::codec::staff_doc::decode_staff;
use crate::codec::transcript_doc::decode_transcript;
use crate::codec::ParseError;
use crate::config::StoreConfig;
use crate::model::reminder::{ReminderBook, ReminderId};
use crate::model::staff::StaffId;
use crate::model::{EntityKind, ValidationError};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of `DocumentStore::open` beyond the store itself.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub staff: usize,
    pub transcripts: usize,
    pub reminders: usize,
    /// Documents left out of the index.
    pub corrupt: Vec<CorruptDocument>,
    /// Reminders naming a staff member that was not loaded.
    pub dangling: Vec<DanglingReminder>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty() && self.dangling.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptDocument {
    pub path: PathBuf,
    pub error: StoreError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReminder {
    pub reminder_id: ReminderId,
    pub staff_id: StaffId,
}

impl DocumentStore {
    /// Creates missing directories, then loads every document under the
    /// configured root.
    ///
    /// # Errors
    /// - `Io` when a directory cannot be created or listed. Per-document
    ///   failures are reported in `LoadReport::corrupt` instead.
    pub fn open(config: &StoreConfig) -> StoreResult<(Self, LoadReport)> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start");

        config.validate().map_err(|err| {
            io_error(
                &config.root,
                io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
            )
        })?;
        for dir in [
            config.root.clone(),
            config.staff_dir_path(),
            config.transcripts_dir_path(),
        ] {
            fs::create_dir_all(&dir).map_err(|source| io_error(&dir, source))?;
        }

        let mut store = DocumentStore {
            config: config.clone(),
            staff: HashMap::new(),
            children: ChildIndex::default(),
            reminders: RemindersSlot {
                book: ReminderBook::empty(),
                path: config.reminders_path(),
                raw: None,
            },
            transcripts: HashMap::new(),
        };
        let mut report = LoadReport::default();

        store.load_staff(&mut report)?;
        store.load_transcripts(&mut report)?;
        store.load_reminders(&mut report);
        store.check_references(&mut report);

        report.staff = store.staff.len();
        report.transcripts = store.transcripts.len();
        report.reminders = store.reminders.book.reminders.len();
        info!(
            "event=store_open module=store status=ok staff={} transcripts={} reminders={} corrupt={} dangling={} duration_ms={}",
            report.staff,
            report.transcripts,
            report.reminders,
            report.corrupt.len(),
            report.dangling.len(),
            started_at.elapsed().as_millis()
        );
        Ok((store, report))
    }

    fn load_staff(&mut self, report: &mut LoadReport) -> StoreResult<()> {
        for path in list_documents(&self.config.staff_dir_path())? {
            let loaded = read_decoded(&path, decode_staff).and_then(|(record, raw)| {
                let id = record.id();
                if self.staff.contains_key(&id) {
                    return Err(duplicate(EntityKind::Staff, id));
                }
                if let Some((kind, child)) = self.children.conflict(&record) {
                    return Err(duplicate(kind, child));
                }
                Ok((record, raw))
            });

            match loaded {
                Ok((record, raw)) => {
                    self.children.insert_record(&record);
                    self.staff.insert(
                        record.id(),
                        Indexed {
                            value: record,
                            path,
                            raw,
                        },
                    );
                }
                Err(error) => report_corrupt(report, EntityKind::Staff, path, error),
            }
        }
        Ok(())
    }

    fn load_transcripts(&mut self, report: &mut LoadReport) -> StoreResult<()> {
        for path in list_documents(&self.config.transcripts_dir_path())? {
            let loaded = read_decoded(&path, decode_transcript).and_then(|(transcript, raw)| {
                if self.transcripts.contains_key(&transcript.id) {
                    return Err(duplicate(EntityKind::Transcript, transcript.id));
                }
                Ok((transcript, raw))
            });

            match loaded {
                Ok((transcript, raw)) => {
                    self.transcripts.insert(
                        transcript.id,
                        Indexed {
                            value: transcript,
                            path,
                            raw,
                        },
                    );
                }
                Err(error) => report_corrupt(report, EntityKind::Transcript, path, error),
            }
        }
        Ok(())
    }

    fn load_reminders(&mut self, report: &mut LoadReport) {
        let path = self.reminders.path.clone();
        match read_existing(&path) {
            Ok(None) => {}
            Ok(Some(raw)) => match decode_reminders(&raw) {
                Ok(book) => {
                    self.reminders.book = book;
                    self.reminders.raw = Some(raw);
                }
                Err(source) => report_corrupt(
                    report,
                    EntityKind::Reminder,
                    path.clone(),
                    StoreError::Parse { path, source },
                ),
            },
            Err(error) => report_corrupt(report, EntityKind::Reminder, path, error),
        }
    }

    fn check_references(&self, report: &mut LoadReport) {
        for reminder in &self.reminders.book.reminders {
            let Some(staff_id) = reminder.staff_id else {
                continue;
            };
            if !self.staff.contains_key(&staff_id) {
                warn!(
                    "event=reference_check module=store status=error kind=reminder id={} error_code=dangling_staff",
                    reminder.id
                );
                report.dangling.push(DanglingReminder {
                    reminder_id: reminder.id,
                    staff_id,
                });
            }
        }
    }
}

/// `.md` files directly under `dir`, sorted by file name.
fn list_documents(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(dir, source))?;
        let path = entry.path();
        if is_document(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn read_decoded<T>(
    path: &Path,
    decode: fn(&str) -> Result<T, ParseError>,
) -> StoreResult<(T, String)> {
    let raw = read_existing(path)?
        .ok_or_else(|| io_error(path, io::Error::from(io::ErrorKind::NotFound)))?;
    let value = decode(&raw).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((value, raw))
}

fn report_corrupt(report: &mut LoadReport, kind: EntityKind, path: PathBuf, error: StoreError) {
    warn!(
        "event=document_load module=store status=error kind={} error_code={}",
        kind,
        error.code()
    );
    report.corrupt.push(CorruptDocument { path, error });
}

fn duplicate(kind: EntityKind, id: uuid::Uuid) -> StoreError {
    StoreError::Validation(ValidationError::DuplicateIdentity { kind, id })
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
