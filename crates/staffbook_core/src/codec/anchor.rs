//! Machine-readable item anchors embedded as HTML comments.
//!
//! Each owned list item is a human-readable bullet followed by one anchor
//! line carrying the full record as JSON. The anchor is authoritative on
//! decode; the visible bullet is regenerated on every write.
//!
//! # Invariants
//! - Anchor JSON never contains `-->`, so the comment cannot end early.
//! - Bullets without an anchor are not items.
//! - Anchors only appear inside the owned copy of their section.

use super::section::{DecodedDocument, Segment};
use super::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

const ANCHOR_PREFIX: &str = "<!-- staffbook:";

static ANCHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<!-- staffbook:([a-z_]+) (\{.*\}) -->$").expect("valid anchor regex")
});

/// Renders the indented anchor line for one item, newline included.
pub fn render_anchor<T: Serialize>(tag: &str, item: &T) -> String {
    let json = serde_json::to_string(item)
        .expect("model records serialize to JSON")
        .replace("-->", "--\\u003e");
    format!("  {ANCHOR_PREFIX}{tag} {json} -->\n")
}

/// Decodes every anchor in a section, in document order.
pub fn collect_anchors<T: DeserializeOwned>(
    segment: &Segment,
    tag: &str,
) -> Result<Vec<T>, ParseError> {
    let section = segment.name().unwrap_or_default();
    let mut items = Vec::new();

    for line in segment.content().lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with(ANCHOR_PREFIX) {
            continue;
        }
        let captures = ANCHOR_RE
            .captures(trimmed)
            .ok_or_else(|| malformed(section, "anchor comment is not terminated"))?;
        if &captures[1] != tag {
            return Err(malformed(
                section,
                &format!("expected `{tag}` item, found `{}`", &captures[1]),
            ));
        }
        let item = serde_json::from_str(&captures[2])
            .map_err(|err| malformed(section, &err.to_string()))?;
        items.push(item);
    }

    Ok(items)
}

/// Fails when a foreign segment holds an anchor line.
///
/// Such items would be skipped on decode and dropped by the next write, so
/// the document is treated as unreadable until a person fixes it.
pub(crate) fn reject_stray_anchors(decoded: &DecodedDocument) -> Result<(), ParseError> {
    for segment in decoded.foreign() {
        let stray = segment
            .text
            .lines()
            .any(|line| line.trim_start().starts_with(ANCHOR_PREFIX));
        if stray {
            return Err(malformed(
                segment.name().unwrap_or("preamble"),
                "anchored item outside its owned section",
            ));
        }
    }
    Ok(())
}

/// Neutralizes text that would otherwise open a comment or a code fence.
pub(crate) fn escape_visible(line: &str) -> String {
    let escaped = line.replace("<!--", "&lt;!--");
    let trimmed = escaped.trim_start();
    if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
        let indent = escaped.len() - trimmed.len();
        format!("{}\\{}", &escaped[..indent], trimmed)
    } else {
        escaped
    }
}

fn malformed(section: &str, reason: &str) -> ParseError {
    ParseError::MalformedItem {
        section: section.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{collect_anchors, escape_visible, render_anchor};
    use crate::codec::section::split_body;
    use crate::codec::{ParseError, STAFF_LAYOUT};
    use crate::model::achievement::Achievement;
    use uuid::Uuid;

    fn notes_segment(body: &str) -> crate::codec::Segment {
        split_body(&format!("## Notes\n\n{body}"), &STAFF_LAYOUT).remove(0)
    }

    #[test]
    fn anchor_survives_comment_terminator_in_text() {
        let item = Achievement::new(Uuid::new_v4(), "Shipped --> faster");
        let line = render_anchor("achievement", &item);
        assert!(!line.trim_end().trim_end_matches(" -->").contains("-->"));

        let segment = notes_segment(&format!("- visible\n{line}"));
        let items: Vec<Achievement> = collect_anchors(&segment, "achievement").unwrap();
        assert_eq!(items, vec![item]);
    }

    #[test]
    fn unanchored_bullets_are_ignored() {
        let segment = notes_segment("- typed by hand\n");
        let items: Vec<Achievement> = collect_anchors(&segment, "achievement").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn wrong_tag_and_bad_json_are_malformed() {
        let segment = notes_segment("  <!-- staffbook:goal {\"id\":1} -->\n");
        let err = collect_anchors::<Achievement>(&segment, "achievement").unwrap_err();
        assert!(matches!(err, ParseError::MalformedItem { ref section, .. } if section == "Notes"));

        let segment = notes_segment("  <!-- staffbook:achievement {\"id\":1} -->\n");
        assert!(collect_anchors::<Achievement>(&segment, "achievement").is_err());
    }

    #[test]
    fn escape_visible_defuses_comments_and_fences() {
        assert_eq!(escape_visible("a <!-- b"), "a &lt;!-- b");
        assert_eq!(escape_visible("  ```rust"), "  \\```rust");
        assert_eq!(escape_visible("plain"), "plain");
    }
}
