//! Header block (`---` fenced `key: value` lines) parsing and rendering.
//!
//! # Invariants
//! - The header starts at the first byte of a document.
//! - Rendering emits entries in insertion order, one per line.
//! - List values use inline `[a, b]` syntax; absent optionals are omitted.

use super::ParseError;
use crate::model::time::{format_date, format_timestamp, parse_date, parse_timestamp, Timestamp};
use chrono::NaiveDate;
use uuid::Uuid;

const FENCE: &str = "---";

/// Ordered header entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: Vec<(String, String)>,
}

impl Header {
    /// Starts a header with its `kind:` entry.
    pub fn new(kind: &str) -> Self {
        let mut header = Self::default();
        header.push("kind", kind);
        header
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_string(), value.into()));
    }

    pub fn push_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn push_date(&mut self, key: &str, value: Option<&NaiveDate>) {
        if let Some(value) = value {
            self.push(key, format_date(value));
        }
    }

    pub fn push_timestamp(&mut self, key: &str, value: &Timestamp) {
        self.push(key, format_timestamp(value));
    }

    pub fn push_list(&mut self, key: &str, items: &[String]) {
        if !items.is_empty() {
            self.push(key, format!("[{}]", items.join(", ")));
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// First value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64 + self.entries.len() * 32);
        out.push_str(FENCE);
        out.push('\n');
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out.push_str(FENCE);
        out.push('\n');
        out
    }

    pub fn required(&self, key: &'static str) -> Result<&str, ParseError> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ParseError::MissingField(key)),
        }
    }

    pub fn optional(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn uuid(&self, key: &'static str) -> Result<Uuid, ParseError> {
        let value = self.required(key)?;
        match Uuid::parse_str(value) {
            Ok(id) if !id.is_nil() => Ok(id),
            Ok(_) => Err(invalid(key, value, "nil identity")),
            Err(err) => Err(invalid(key, value, &err.to_string())),
        }
    }

    pub fn timestamp(&self, key: &'static str) -> Result<Timestamp, ParseError> {
        let value = self.required(key)?;
        parse_timestamp(value).map_err(|err| invalid(key, value, &err.to_string()))
    }

    pub fn optional_date(&self, key: &'static str) -> Result<Option<NaiveDate>, ParseError> {
        match self.optional(key) {
            None => Ok(None),
            Some(value) => parse_date(&value)
                .map(Some)
                .map_err(|err| invalid(key, &value, &err.to_string())),
        }
    }

    /// Inline list; an absent key reads as empty.
    pub fn list(&self, key: &'static str) -> Result<Vec<String>, ParseError> {
        let Some(value) = self.optional(key) else {
            return Ok(Vec::new());
        };
        let inner = value
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| invalid(key, &value, "expected `[a, b]` list"))?;
        Ok(inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Boolean flag; an absent key reads as `false`.
    pub fn flag(&self, key: &'static str) -> Result<bool, ParseError> {
        match self.optional(key).as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(invalid(key, other, "expected `true` or `false`")),
        }
    }
}

fn invalid(field: &'static str, value: &str, reason: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Splits a document into its header and the untouched body that follows.
///
/// Blank lines and `#` comment lines inside the header are ignored.
pub fn split_header(text: &str) -> Result<(Header, &str), ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let opening = lines.next().ok_or(ParseError::MissingHeader)?;
    if opening.trim_end() != FENCE {
        return Err(ParseError::MissingHeader);
    }

    let mut offset = opening.len();
    let mut header = Header::default();
    for (index, line) in lines.enumerate() {
        offset += line.len();
        if line.trim_end() == FENCE {
            return Ok((header, &text[offset..]));
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                header.push(key.trim(), value.trim());
            }
            _ => {
                return Err(ParseError::MalformedHeaderLine {
                    line: index + 2,
                    text: trimmed.to_string(),
                })
            }
        }
    }

    Err(ParseError::UnterminatedHeader)
}
