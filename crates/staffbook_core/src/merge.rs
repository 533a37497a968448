//! Regeneration of owned content inside an existing document.
//!
//! # Responsibility
//! - Replace the header, title, owned sections and footer of a document
//!   with freshly rendered pieces.
//! - Keep every foreign segment byte for byte, in its original position.
//!
//! # Invariants
//! - Merging into the canonical rendering of the same state returns the
//!   canonical rendering unchanged.
//! - Missing owned pieces are inserted at their canonical neighbour,
//!   separated from preceding text by a blank line.
//!
//! # See also
//! - docs/document-format.md

use crate::codec::anchor::reject_stray_anchors;
use crate::codec::{decode_document, ParseError, RenderedDocument, SegmentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Preamble,
    ForeignSection,
    Title,
    Section(usize),
    Footer,
}

#[derive(Debug)]
struct Piece {
    slot: Slot,
    text: String,
    inserted: bool,
}

impl Piece {
    fn kept(slot: Slot, text: String) -> Self {
        Self {
            slot,
            text,
            inserted: false,
        }
    }

    fn inserted(slot: Slot, text: String) -> Self {
        Self {
            slot,
            text,
            inserted: true,
        }
    }
}

/// Rewrites `existing` so its owned content matches `fresh`.
///
/// Fails when `existing` has no readable header block, or when anchored
/// items sit in a foreign segment where the merge would silently drop them.
pub fn merge_document(existing: &str, fresh: &RenderedDocument) -> Result<String, ParseError> {
    let layout = fresh.layout;
    let decoded = decode_document(existing, &layout)?;
    reject_stray_anchors(&decoded)?;

    let mut pieces: Vec<Piece> = Vec::with_capacity(decoded.segments.len() + 2);
    for segment in decoded.segments {
        let piece = match (&segment.kind, segment.owned) {
            (SegmentKind::Title, _) => Piece::kept(Slot::Title, fresh.title.clone()),
            (SegmentKind::Footer, _) => Piece::kept(Slot::Footer, fresh.footer.clone()),
            (SegmentKind::Section { heading }, true) => match layout.position(heading) {
                Some(index) => Piece::kept(Slot::Section(index), fresh.sections[index].clone()),
                None => Piece::kept(Slot::ForeignSection, segment.text),
            },
            (SegmentKind::Section { .. }, false) => Piece::kept(Slot::ForeignSection, segment.text),
            (SegmentKind::Preamble, _) => Piece::kept(Slot::Preamble, segment.text),
        };
        pieces.push(piece);
    }

    if !pieces.iter().any(|piece| piece.slot == Slot::Title) {
        let at = pieces
            .iter()
            .position(|piece| !(piece.slot == Slot::Preamble && piece.text.trim().is_empty()))
            .unwrap_or(pieces.len());
        pieces.insert(at, Piece::inserted(Slot::Title, fresh.title.clone()));
    }

    for index in 0..layout.sections.len() {
        if pieces.iter().any(|piece| piece.slot == Slot::Section(index)) {
            continue;
        }
        let at = section_insertion_point(&pieces, index);
        pieces.insert(at, Piece::inserted(Slot::Section(index), fresh.sections[index].clone()));
    }

    if !pieces.iter().any(|piece| piece.slot == Slot::Footer) {
        pieces.push(Piece::inserted(Slot::Footer, fresh.footer.clone()));
    }

    let mut body = String::with_capacity(existing.len() + 256);
    for piece in pieces {
        if piece.inserted {
            ensure_blank_line(&mut body);
        }
        body.push_str(&piece.text);
    }

    let mut out = fresh.header.render();
    out.push_str(&body);
    Ok(out)
}

/// After the nearest present predecessor, else before the nearest present
/// successor, else after the title and the text directly under it.
fn section_insertion_point(pieces: &[Piece], index: usize) -> usize {
    let predecessor = pieces
        .iter()
        .enumerate()
        .filter_map(|(at, piece)| match piece.slot {
            Slot::Section(other) if other < index => Some((other, at)),
            _ => None,
        })
        .max_by_key(|(other, _)| *other);
    if let Some((_, at)) = predecessor {
        return at + 1;
    }

    let successor = pieces
        .iter()
        .enumerate()
        .filter_map(|(at, piece)| match piece.slot {
            Slot::Section(other) if other > index => Some((other, at)),
            _ => None,
        })
        .min_by_key(|(other, _)| *other);
    if let Some((_, at)) = successor {
        return at;
    }

    let mut at = pieces
        .iter()
        .position(|piece| piece.slot == Slot::Title)
        .map_or(0, |title| title + 1);
    while pieces.get(at).is_some_and(|piece| piece.slot == Slot::Preamble) {
        at += 1;
    }
    at
}

fn ensure_blank_line(body: &mut String) {
    if body.trim().is_empty() {
        if body.is_empty() {
            body.push('\n');
        }
        return;
    }
    if body.ends_with("\n\n") {
        return;
    }
    if body.ends_with('\n') {
        body.push('\n');
    } else {
        body.push_str("\n\n");
    }
}
