//! Markdown document codec.
//!
//! # Responsibility
//! - Render entity state into a canonical document: header block, title,
//!   owned sections in layout order, footer.
//! - Split any document (generated or hand-edited) into ordered segments that
//!   keep every byte of the body, classified as owned or foreign.
//! - Decode header fields and owned items back into typed records.
//!
//! # Invariants
//! - Rendering is total and deterministic: the same state renders the same
//!   bytes, and empty collections still render their section heading.
//! - Concatenating decoded segment texts reproduces the body exactly.
//!
//! # See also
//! - docs/document-format.md

pub mod anchor;
pub mod header;
pub mod reminders_doc;
pub mod render;
pub mod section;
pub mod staff_doc;
pub mod transcript_doc;

use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use header::{split_header, Header};
pub use render::RenderedDocument;
pub use section::{decode_document, DecodedDocument, Segment, SegmentKind};

/// Owned section names in canonical order for one document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLayout {
    /// Value of the `kind:` header field.
    pub kind: &'static str,
    pub sections: &'static [&'static str],
}

impl DocumentLayout {
    /// Canonical position of an owned section name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|section| *section == name)
    }
}

pub const STAFF_LAYOUT: DocumentLayout = DocumentLayout {
    kind: "staff",
    sections: &["Overview", "Goals", "Notes", "Achievements"],
};

pub const REMINDERS_LAYOUT: DocumentLayout = DocumentLayout {
    kind: "reminders",
    sections: &["Pending", "Completed"],
};

pub const TRANSCRIPT_LAYOUT: DocumentLayout = DocumentLayout {
    kind: "transcript",
    sections: &["Transcript", "Extracted Items"],
};

/// Document text that cannot be turned back into entity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    NotUtf8,
    /// Document does not start with a `---` header fence.
    MissingHeader,
    /// Header fence is opened but never closed.
    UnterminatedHeader,
    /// Header line without `key: value` shape (1-based line number).
    MalformedHeaderLine { line: usize, text: String },
    MissingField(&'static str),
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// `kind:` header names another document kind.
    UnexpectedKind {
        expected: &'static str,
        found: String,
    },
    /// Owned section holding non-derivable data is absent.
    MissingSection(&'static str),
    /// Anchor comment inside an owned section cannot be decoded.
    MalformedItem { section: String, reason: String },
    /// Decoded state breaks a model invariant.
    Invalid(ValidationError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "document is not valid UTF-8"),
            Self::MissingHeader => write!(f, "document has no header block"),
            Self::UnterminatedHeader => write!(f, "header block is not terminated by `---`"),
            Self::MalformedHeaderLine { line, text } => {
                write!(f, "malformed header line {line}: `{text}`")
            }
            Self::MissingField(field) => write!(f, "missing header field `{field}`"),
            Self::InvalidField {
                field,
                value,
                reason,
            } => write!(f, "invalid header field `{field}` value `{value}`: {reason}"),
            Self::UnexpectedKind { expected, found } => {
                write!(f, "expected a `{expected}` document, found `{found}`")
            }
            Self::MissingSection(name) => write!(f, "missing section `{name}`"),
            Self::MalformedItem { section, reason } => {
                write!(f, "malformed item in section `{section}`: {reason}")
            }
            Self::Invalid(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ParseError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

/// Checks the `kind:` header against the expected layout.
pub(crate) fn expect_kind(header: &Header, layout: &DocumentLayout) -> Result<(), ParseError> {
    let found = header.required("kind")?;
    if found != layout.kind {
        return Err(ParseError::UnexpectedKind {
            expected: layout.kind,
            found: found.to_string(),
        });
    }
    Ok(())
}
