//! File-system primitives for document persistence.
//!
//! # Invariants
//! - A document is replaced by rename, so readers see the old or the new
//!   bytes and never a partial write.
//! - Temp files never carry the `.md` extension and are skipped by load.
//! - Once the rename succeeds the write is reported as done; a failed
//!   directory sync afterwards is logged, not returned.

use super::{StoreError, StoreResult};
use crate::codec::ParseError;
use log::warn;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reads a document as UTF-8; `Ok(None)` when the file does not exist.
pub(crate) fn read_existing(path: &Path) -> StoreResult<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| StoreError::Parse {
                path: path.to_path_buf(),
                source: ParseError::NotUtf8,
            }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `contents` to a sibling temp file, syncs it, then renames it over
/// `path`.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    let io_err = |path: &Path, source: io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(io_err(path, io::Error::other("path has no parent or file name")));
    };
    fs::create_dir_all(parent).map_err(|source| io_err(parent, source))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = parent.join(format!(
        ".staffbook.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| io_err(&tmp_path, source))?;
    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(&tmp_path, source));
    }

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(path, source));
    }

    if let Err(err) = sync_parent_dir(parent) {
        warn!(
            "event=dir_sync module=store status=error error_code=io_failed io_kind={:?}",
            err.kind()
        );
    }

    Ok(())
}

/// Flushes the directory entry of a rename to disk.
fn sync_parent_dir(parent: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        fs::File::open(parent)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = parent;
    }
    Ok(())
}

/// Deletes a document; a file that is already gone counts as deleted.
pub(crate) fn remove_document(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_existing, remove_document, sync_parent_dir, write_atomic};
    use crate::store::StoreError;

    #[test]
    fn write_atomic_replaces_content_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staff").join("jane-doe-1a2b3c4d.md");

        write_atomic(&path, "first\n").unwrap();
        write_atomic(&path, "second\n").unwrap();

        assert_eq!(read_existing(&path).unwrap().as_deref(), Some("second\n"));
        let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn missing_file_reads_as_none_and_removes_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.md");
        assert!(read_existing(&path).unwrap().is_none());
        remove_document(&path).unwrap();
    }

    #[test]
    fn invalid_utf8_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            read_existing(&path).unwrap_err(),
            StoreError::Parse { .. }
        ));
    }

    #[test]
    fn directory_sync_reports_a_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sync_parent_dir(dir.path()).is_ok());
        #[cfg(unix)]
        assert!(sync_parent_dir(&dir.path().join("missing")).is_err());
    }
}
