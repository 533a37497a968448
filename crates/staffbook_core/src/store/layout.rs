//! Document file naming.
//!
//! Paths are derived once, when an entity is created, and never recomputed:
//! renaming a staff member does not move their document.

use crate::config::StoreConfig;
use crate::model::staff::Staff;
use crate::model::time::format_date;
use crate::model::transcript::Transcript;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use uuid::Uuid;

static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid slug strip regex"));
static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_-]+").expect("valid slug separator regex"));

pub(crate) const DOCUMENT_EXTENSION: &str = "md";

/// Lowercase file-name slug; `fallback` when nothing usable remains.
pub fn slugify(text: &str, fallback: &str) -> String {
    let stripped = NON_WORD_RE.replace_all(text, "");
    let joined = SEPARATOR_RUN_RE.replace_all(stripped.trim(), "-");
    let slug = joined.to_lowercase().trim_matches('-').to_string();
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

pub(crate) fn staff_path(config: &StoreConfig, staff: &Staff) -> PathBuf {
    config.staff_dir_path().join(format!(
        "{}-{}.{DOCUMENT_EXTENSION}",
        slugify(&staff.name, "staff"),
        short_id(&staff.id)
    ))
}

pub(crate) fn transcript_path(config: &StoreConfig, transcript: &Transcript) -> PathBuf {
    config.transcripts_dir_path().join(format!(
        "{}-{}-{}.{DOCUMENT_EXTENSION}",
        format_date(&transcript.date.date_naive()),
        slugify(&transcript.title, "transcript"),
        short_id(&transcript.id)
    ))
}

pub(crate) fn is_document(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION)
        && path
            .file_name()
            .is_some_and(|name| !name.to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::{is_document, slugify, staff_path};
    use crate::config::StoreConfig;
    use crate::model::staff::Staff;
    use std::path::Path;

    #[test]
    fn slugify_collapses_separators_and_drops_punctuation() {
        assert_eq!(slugify("  Jane  O'Neil -- Smith ", "staff"), "jane-oneil-smith");
        assert_eq!(slugify("Q3 review: plan_b", "transcript"), "q3-review-plan-b");
        assert_eq!(slugify("!!!", "staff"), "staff");
    }

    #[test]
    fn staff_path_carries_slug_and_short_id() {
        let config = StoreConfig::new("/data");
        let staff = Staff::new("Jane Doe");
        let path = staff_path(&config, &staff);
        let expected = format!("jane-doe-{}.md", &staff.id.simple().to_string()[..8]);
        assert_eq!(path, Path::new("/data/staff").join(expected));
    }

    #[test]
    fn temp_and_foreign_files_are_not_documents() {
        assert!(is_document(Path::new("/d/staff/jane.md")));
        assert!(!is_document(Path::new("/d/staff/.staffbook.tmp.jane.md.123")));
        assert!(!is_document(Path::new("/d/staff/.hidden.md")));
        assert!(!is_document(Path::new("/d/staff/notes.txt")));
    }
}
