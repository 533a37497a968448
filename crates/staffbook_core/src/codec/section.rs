//! Body segmentation into title, sections, footer and foreign spans.
//!
//! # Responsibility
//! - Split a document body at level-2 heading, title and footer boundaries.
//! - Classify each segment as owned (regenerated on write) or foreign
//!   (preserved verbatim).
//!
//! # Invariants
//! - Segment texts concatenate back to the exact input body.
//! - Lines inside fenced code blocks never start a segment.
//! - Only the first occurrence of an owned heading is owned.
//! - The footer is the last `---` line directly followed by a
//!   `*Last updated: ...*` line.

use super::header::{split_header, Header};
use super::{DocumentLayout, ParseError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub(crate) const FOOTER_RULE: &str = "---";
pub(crate) const FOOTER_PREFIX: &str = "*Last updated: ";

static FOOTER_STAMP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\*Last updated: [^*]+\*$").expect("valid footer regex"));

/// Structural role of a body segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text outside any heading: before the title, between title and first
    /// section, or after the footer.
    Preamble,
    /// First `# ` line plus the blank lines that follow it.
    Title,
    /// `## ` heading line and its content up to the next boundary.
    Section { heading: String },
    /// Horizontal rule plus the last-updated stamp.
    Footer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub owned: bool,
    /// Verbatim text, line terminators included.
    pub text: String,
}

impl Segment {
    /// Heading text for sections.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            SegmentKind::Section { heading } => Some(heading.as_str()),
            _ => None,
        }
    }

    /// Text after the heading line (the whole text for non-sections).
    pub fn content(&self) -> &str {
        match self.kind {
            SegmentKind::Section { .. } => self
                .text
                .split_once('\n')
                .map_or("", |(_, rest)| rest),
            _ => &self.text,
        }
    }
}

/// Header fields plus every body segment in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub header: Header,
    pub segments: Vec<Segment>,
}

impl DecodedDocument {
    /// Reassembled body; equal to the body the document was decoded from.
    pub fn body(&self) -> String {
        self.segments.iter().map(|segment| segment.text.as_str()).collect()
    }

    pub fn owned_section(&self, name: &str) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.owned && segment.name() == Some(name))
    }

    pub fn foreign(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| !segment.owned)
    }
}

/// Parses the header and segments the body against `layout`.
pub fn decode_document(text: &str, layout: &DocumentLayout) -> Result<DecodedDocument, ParseError> {
    let (header, body) = split_header(text)?;
    Ok(DecodedDocument {
        header,
        segments: split_body(body, layout),
    })
}

pub fn split_body(body: &str, layout: &DocumentLayout) -> Vec<Segment> {
    let lines: Vec<&str> = body.split_inclusive('\n').collect();
    let mut fence = FenceTracker::default();
    let structural: Vec<bool> = lines.iter().map(|line| fence.step(line)).collect();

    let footer_at = (0..lines.len().saturating_sub(1)).rev().find(|&index| {
        structural[index]
            && structural[index + 1]
            && lines[index].trim_end() == FOOTER_RULE
            && FOOTER_STAMP_RE.is_match(lines[index + 1].trim_end())
    });

    let mut builder = SegmentBuilder::new(layout);
    let mut seen_heading = false;
    let mut seen_title = false;
    let mut past_footer = false;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];

        if Some(index) == footer_at {
            builder.start(SegmentKind::Footer, line);
            builder.push(lines[index + 1]);
            builder.start(SegmentKind::Preamble, "");
            past_footer = true;
            index += 2;
            continue;
        }

        if structural[index] && line.starts_with("## ") {
            let heading = line[3..].trim().to_string();
            builder.start(SegmentKind::Section { heading }, line);
            seen_heading = true;
        } else if structural[index]
            && !seen_heading
            && !seen_title
            && !past_footer
            && line.starts_with("# ")
        {
            builder.start(SegmentKind::Title, line);
            seen_title = true;
        } else if builder.in_title() && !line.trim().is_empty() {
            builder.start(SegmentKind::Preamble, line);
        } else {
            builder.push(line);
        }
        index += 1;
    }

    builder.finish()
}

/// Tracks fenced code blocks; `step` reports whether a line may be structural.
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    fn step(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let marker = trimmed
            .chars()
            .next()
            .filter(|ch| *ch == '`' || *ch == '~')
            .map(|ch| (ch, trimmed.chars().take_while(|c| *c == ch).count()))
            .filter(|(_, run)| *run >= 3);

        match (self.open, marker) {
            (None, Some(opening)) => {
                self.open = Some(opening);
                false
            }
            (None, None) => true,
            (Some((ch, len)), Some((found, run))) if found == ch && run >= len => {
                if trimmed[run * ch.len_utf8()..].trim().is_empty() {
                    self.open = None;
                }
                false
            }
            (Some(_), _) => false,
        }
    }
}

struct SegmentBuilder<'a> {
    layout: &'a DocumentLayout,
    seen_owned: HashSet<String>,
    current: (SegmentKind, String),
    done: Vec<Segment>,
}

impl<'a> SegmentBuilder<'a> {
    fn new(layout: &'a DocumentLayout) -> Self {
        Self {
            layout,
            seen_owned: HashSet::new(),
            current: (SegmentKind::Preamble, String::new()),
            done: Vec::new(),
        }
    }

    fn in_title(&self) -> bool {
        self.current.0 == SegmentKind::Title
    }

    fn start(&mut self, kind: SegmentKind, first_line: &str) {
        let previous = std::mem::replace(&mut self.current, (kind, first_line.to_string()));
        self.flush(previous);
    }

    fn push(&mut self, line: &str) {
        self.current.1.push_str(line);
    }

    fn flush(&mut self, (kind, text): (SegmentKind, String)) {
        if text.is_empty() {
            return;
        }
        let owned = match &kind {
            SegmentKind::Preamble => false,
            SegmentKind::Title | SegmentKind::Footer => true,
            SegmentKind::Section { heading } => {
                self.layout.position(heading).is_some() && self.seen_owned.insert(heading.clone())
            }
        };
        self.done.push(Segment { kind, owned, text });
    }

    fn finish(mut self) -> Vec<Segment> {
        let last = std::mem::replace(&mut self.current, (SegmentKind::Preamble, String::new()));
        self.flush(last);
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_document, split_body, SegmentKind};
    use crate::codec::STAFF_LAYOUT;

    const BODY: &str = "\n# Jane Doe\n\n## Overview\n\n- **Role:** Engineer\n\n## Personal\nLikes climbing.\n\n\n## Notes\n\n_No notes yet._\n\n---\n*Last updated: 2026-10-16T09:00:00.000000Z*\n";

    #[test]
    fn segments_concatenate_to_the_original_body() {
        let segments = split_body(BODY, &STAFF_LAYOUT);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, BODY);
    }

    #[test]
    fn classifies_owned_and_foreign_segments() {
        let segments = split_body(BODY, &STAFF_LAYOUT);
        let summary: Vec<(Option<&str>, bool)> = segments
            .iter()
            .map(|segment| (segment.name(), segment.owned))
            .collect();
        assert_eq!(
            summary,
            vec![
                (None, false),
                (None, true),
                (Some("Overview"), true),
                (Some("Personal"), false),
                (Some("Notes"), true),
                (None, true),
            ]
        );
        assert_eq!(segments[3].text, "## Personal\nLikes climbing.\n\n\n");
        assert_eq!(segments[5].kind, SegmentKind::Footer);
    }

    #[test]
    fn headings_inside_code_fences_are_not_boundaries() {
        let body = "## Snippets\n```md\n## Notes\n```\n\n## Notes\n\nreal\n";
        let segments = split_body(body, &STAFF_LAYOUT);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].name(), Some("Snippets"));
        assert!(!segments[0].owned);
        assert_eq!(segments[1].name(), Some("Notes"));
        assert!(segments[1].owned);
    }

    #[test]
    fn duplicate_owned_heading_is_foreign_after_the_first() {
        let body = "## Notes\n\na\n\n## Notes\n\nb\n";
        let segments = split_body(body, &STAFF_LAYOUT);
        assert!(segments[0].owned);
        assert!(!segments[1].owned);
    }

    #[test]
    fn heading_match_is_case_sensitive() {
        let segments = split_body("## notes\n\nhand written\n", &STAFF_LAYOUT);
        assert!(!segments[0].owned);
    }

    #[test]
    fn text_after_footer_is_foreign_preamble() {
        let body = "## Notes\n\n---\n*Last updated: x*\nP.S. call mom\n";
        let segments = split_body(body, &STAFF_LAYOUT);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].kind, SegmentKind::Footer);
        assert_eq!(segments[2].kind, SegmentKind::Preamble);
        assert!(!segments[2].owned);
        assert_eq!(segments[2].text, "P.S. call mom\n");
    }

    #[test]
    fn decode_document_keeps_header_and_body_apart() {
        let text = format!("---\nkind: staff\n---\n{BODY}");
        let decoded = decode_document(&text, &STAFF_LAYOUT).unwrap();
        assert_eq!(decoded.header.get("kind"), Some("staff"));
        assert_eq!(decoded.body(), BODY);
        assert_eq!(decoded.foreign().count(), 2);
        assert!(decoded.owned_section("Goals").is_none());
    }
}
