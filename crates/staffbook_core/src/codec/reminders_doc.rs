//! Reminders document: every reminder in one file, split into Pending and
//! Completed sections.
//!
//! # Invariants
//! - Pending items are ordered by due date (undated last), then creation.
//! - Completed items are ordered by completion time.
//! - Decoded books hold reminders in creation order.

use super::anchor::{collect_anchors, escape_visible, reject_stray_anchors, render_anchor};
use super::render::{render_section, RenderedDocument};
use super::section::decode_document;
use super::{expect_kind, Header, ParseError, REMINDERS_LAYOUT};
use crate::model::reminder::{Reminder, ReminderBook};
use crate::model::time::format_date;
use std::fmt::Write as _;

pub const REMINDER_TAG: &str = "reminder";

pub fn encode_reminders(book: &ReminderBook) -> RenderedDocument {
    let mut pending: Vec<&Reminder> = book.reminders.iter().filter(|r| !r.completed).collect();
    pending.sort_by(|a, b| {
        (a.due_date.is_none(), a.due_date, a.created_at, a.id)
            .cmp(&(b.due_date.is_none(), b.due_date, b.created_at, b.id))
    });
    let mut completed: Vec<&Reminder> = book.reminders.iter().filter(|r| r.completed).collect();
    completed.sort_by(|a, b| (a.completed_at, a.id).cmp(&(b.completed_at, b.id)));

    let mut header = Header::new(REMINDERS_LAYOUT.kind);
    header.push("pending", pending.len().to_string());
    header.push("completed", completed.len().to_string());
    header.push_timestamp("updated_at", &book.updated_at);

    let sections = vec![
        render_section("Pending", &items_body(&pending), "_No pending reminders._"),
        render_section(
            "Completed",
            &items_body(&completed),
            "_No completed reminders._",
        ),
    ];
    RenderedDocument::new(
        REMINDERS_LAYOUT,
        header,
        "Reminders",
        sections,
        &book.updated_at,
    )
}

pub fn decode_reminders(text: &str) -> Result<ReminderBook, ParseError> {
    let decoded = decode_document(text, &REMINDERS_LAYOUT)?;
    expect_kind(&decoded.header, &REMINDERS_LAYOUT)?;
    reject_stray_anchors(&decoded)?;

    let mut reminders: Vec<Reminder> = Vec::new();
    for name in REMINDERS_LAYOUT.sections {
        if let Some(segment) = decoded.owned_section(name) {
            reminders.extend(collect_anchors::<Reminder>(segment, REMINDER_TAG)?);
        }
    }
    reminders.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));

    let book = ReminderBook {
        reminders,
        updated_at: decoded.header.timestamp("updated_at")?,
    };
    book.validate()?;
    Ok(book)
}

fn items_body(reminders: &[&Reminder]) -> String {
    let mut body = String::new();
    for reminder in reminders {
        let mut line = if reminder.completed {
            format!("- [x] **{}**", reminder.description)
        } else {
            format!("- [ ] **{}** — {}", reminder.description, reminder.priority)
        };
        match (reminder.completed_at, reminder.due_date) {
            (Some(at), _) => {
                let _ = write!(line, " — completed {}", format_date(&at.date_naive()));
            }
            (None, Some(due)) => {
                let _ = write!(line, ", due {}", format_date(&due));
            }
            (None, None) => {}
        }
        if !reminder.tags.is_empty() {
            let _ = write!(line, " · {}", reminder.tags.join(", "));
        }
        body.push_str(&escape_visible(&line));
        body.push('\n');
        body.push_str(&render_anchor(REMINDER_TAG, *reminder));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::{decode_reminders, encode_reminders};
    use crate::model::reminder::{Priority, Reminder, ReminderBook};
    use crate::model::time::now;
    use chrono::{Duration, NaiveDate};

    fn book() -> ReminderBook {
        let mut later = Reminder::new("Book offsite");
        later.due_date = NaiveDate::from_ymd_opt(2026, 12, 1);
        let mut undated = Reminder::new("Read RFC");
        undated.priority = Priority::Low;
        let mut sooner = Reminder::new("Send review packet");
        sooner.due_date = NaiveDate::from_ymd_opt(2026, 11, 1);
        sooner.priority = Priority::High;
        let mut done = Reminder::new("Renew badge");
        done.complete(now() + Duration::seconds(1));

        ReminderBook {
            reminders: vec![later, undated, sooner, done],
            updated_at: now() + Duration::seconds(2),
        }
    }

    #[test]
    fn pending_is_ordered_by_due_date_with_undated_last() {
        let doc = encode_reminders(&book());
        let pending = doc.section("Pending").unwrap();
        let send = pending.find("Send review packet").unwrap();
        let offsite = pending.find("Book offsite").unwrap();
        let rfc = pending.find("Read RFC").unwrap();
        assert!(send < offsite && offsite < rfc);
        assert!(pending.contains("- [ ] **Send review packet** — high, due 2026-11-01\n"));
        assert!(doc.section("Completed").unwrap().contains("- [x] **Renew badge** — completed "));
    }

    #[test]
    fn decode_restores_creation_order() {
        let original = book();
        let decoded = decode_reminders(&encode_reminders(&original).to_text()).unwrap();
        let mut expected = original.reminders.clone();
        expected.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        assert_eq!(decoded.reminders, expected);
        assert_eq!(decoded.updated_at, original.updated_at);
    }

    #[test]
    fn empty_book_renders_placeholders() {
        let mut empty = ReminderBook::empty();
        empty.updated_at = now();
        let text = encode_reminders(&empty).to_text();
        assert!(text.contains("## Pending\n\n_No pending reminders._\n\n"));
        assert!(decode_reminders(&text).unwrap().reminders.is_empty());
    }
}
