//! Transcript document: call metadata header, fenced raw text and the
//! extracted item list.
//!
//! # Invariants
//! - The transcript text is wrapped in a backtick fence longer than any
//!   backtick run it contains, so it is read back byte for byte.
//! - A transcript document without its `Transcript` section is unreadable.

use super::anchor::escape_visible;
use super::render::{render_section, RenderedDocument};
use super::section::{decode_document, Segment};
use super::{expect_kind, Header, ParseError, TRANSCRIPT_LAYOUT};
use crate::model::transcript::Transcript;

pub fn encode_transcript(transcript: &Transcript) -> RenderedDocument {
    let mut header = Header::new(TRANSCRIPT_LAYOUT.kind);
    header.push("id", transcript.id.to_string());
    header.push("title", transcript.title.as_str());
    header.push_timestamp("date", &transcript.date);
    header.push_list("participants", &transcript.participants);
    header.push("processed", transcript.processed.to_string());
    header.push_timestamp("created_at", &transcript.created_at);
    header.push_timestamp("updated_at", &transcript.updated_at);

    let fence = "`".repeat(longest_backtick_run(&transcript.text).max(2) + 1);
    let text_body = format!("{fence}\n{}\n{fence}\n", transcript.text);

    let items_body: String = transcript
        .extracted_items
        .iter()
        .map(|item| {
            let visible = format!("- {}", item.replace('&', "&amp;"));
            format!("{}\n", escape_visible(&visible))
        })
        .collect();
    let placeholder = if transcript.processed {
        "_No items found._"
    } else {
        "_No items extracted yet._"
    };

    RenderedDocument::new(
        TRANSCRIPT_LAYOUT,
        header,
        &transcript.title,
        vec![
            render_section("Transcript", &text_body, ""),
            render_section("Extracted Items", &items_body, placeholder),
        ],
        &transcript.updated_at,
    )
}

pub fn decode_transcript(text: &str) -> Result<Transcript, ParseError> {
    let decoded = decode_document(text, &TRANSCRIPT_LAYOUT)?;
    let header = &decoded.header;
    expect_kind(header, &TRANSCRIPT_LAYOUT)?;

    let body = decoded
        .owned_section("Transcript")
        .ok_or(ParseError::MissingSection("Transcript"))?;
    let extracted_items = decoded
        .owned_section("Extracted Items")
        .map(extracted_items)
        .unwrap_or_default();

    let transcript = Transcript {
        id: header.uuid("id")?,
        title: header.required("title")?.to_string(),
        date: header.timestamp("date")?,
        participants: header.list("participants")?,
        text: fenced_text(body)?,
        extracted_items,
        processed: header.flag("processed")?,
        created_at: header.timestamp("created_at")?,
        updated_at: header.timestamp("updated_at")?,
    };
    transcript.validate()?;
    Ok(transcript)
}

fn longest_backtick_run(text: &str) -> usize {
    text.split(|ch| ch != '`')
        .map(str::len)
        .max()
        .unwrap_or(0)
}

fn fenced_text(segment: &Segment) -> Result<String, ParseError> {
    let malformed = |reason: &str| ParseError::MalformedItem {
        section: "Transcript".to_string(),
        reason: reason.to_string(),
    };

    let mut lines = segment.content().lines();
    let opening = lines
        .by_ref()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| malformed("transcript text is missing"))?;
    let fence_len = opening.chars().take_while(|ch| *ch == '`').count();
    if fence_len < 3 {
        return Err(malformed("transcript text is not fenced"));
    }

    let mut collected: Vec<&str> = Vec::new();
    for line in lines {
        let closing = line.trim();
        if closing.len() >= fence_len && closing.chars().all(|ch| ch == '`') {
            return Ok(collected.join("\n").trim_end().to_string());
        }
        collected.push(line.strip_suffix('\r').unwrap_or(line));
    }
    Err(malformed("transcript fence is not closed"))
}

fn extracted_items(segment: &Segment) -> Vec<String> {
    segment
        .content()
        .lines()
        .filter_map(|line| line.strip_prefix("- "))
        .map(|item| item.trim().replace("&lt;!--", "<!--").replace("&amp;", "&"))
        .filter(|item| !item.is_empty())
        .collect()
}
