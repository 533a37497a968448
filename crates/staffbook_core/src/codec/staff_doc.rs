//! Staff document: profile header plus Overview, Goals, Notes and
//! Achievements sections.
//!
//! # Responsibility
//! - Render a `StaffRecord` into document pieces.
//! - Rebuild a `StaffRecord` from any staff document, hand-edited or not.
//!
//! # Invariants
//! - Scalar profile fields live in the header; Overview is derived from them.
//! - Children are read only from anchors inside their owned section.

use super::anchor::{collect_anchors, escape_visible, reject_stray_anchors, render_anchor};
use super::render::{render_section, RenderedDocument};
use super::section::decode_document;
use super::{expect_kind, Header, ParseError, STAFF_LAYOUT};
use crate::model::achievement::Achievement;
use crate::model::goal::Goal;
use crate::model::note::Note;
use crate::model::staff::{Staff, StaffRecord};
use crate::model::time::format_date;
use std::fmt::Write as _;

pub const NOTE_TAG: &str = "note";
pub const GOAL_TAG: &str = "goal";
pub const ACHIEVEMENT_TAG: &str = "achievement";

const NOT_SPECIFIED: &str = "Not specified";

pub fn encode_staff(record: &StaffRecord) -> RenderedDocument {
    let staff = &record.staff;
    let sections = vec![
        render_section("Overview", &overview_body(staff), ""),
        render_section("Goals", &goals_body(&record.goals), "_No goals yet._"),
        render_section("Notes", &notes_body(&record.notes), "_No notes yet._"),
        render_section(
            "Achievements",
            &achievements_body(&record.achievements),
            "_No achievements recorded yet._",
        ),
    ];
    RenderedDocument::new(
        STAFF_LAYOUT,
        staff_header(staff),
        &staff.name,
        sections,
        &staff.updated_at,
    )
}

pub fn decode_staff(text: &str) -> Result<StaffRecord, ParseError> {
    let decoded = decode_document(text, &STAFF_LAYOUT)?;
    expect_kind(&decoded.header, &STAFF_LAYOUT)?;
    reject_stray_anchors(&decoded)?;

    let mut record = StaffRecord::new(staff_from_header(&decoded.header)?);
    if let Some(segment) = decoded.owned_section("Goals") {
        record.goals = collect_anchors(segment, GOAL_TAG)?;
    }
    if let Some(segment) = decoded.owned_section("Notes") {
        record.notes = collect_anchors(segment, NOTE_TAG)?;
    }
    if let Some(segment) = decoded.owned_section("Achievements") {
        record.achievements = collect_anchors(segment, ACHIEVEMENT_TAG)?;
    }
    record.sort_children();
    record.validate()?;
    Ok(record)
}

fn staff_header(staff: &Staff) -> Header {
    let mut header = Header::new(STAFF_LAYOUT.kind);
    header.push("id", staff.id.to_string());
    header.push("name", staff.name.as_str());
    header.push_opt("email", staff.email.as_deref());
    header.push_opt("role", staff.role.as_deref());
    header.push_opt("department", staff.department.as_deref());
    header.push_opt("team", staff.team.as_deref());
    header.push_opt("manager", staff.manager.as_deref());
    header.push_date("hire_date", staff.hire_date.as_ref());
    header.push_date("last_one_on_one", staff.last_one_on_one.as_ref());
    header.push_date("next_review", staff.next_review.as_ref());
    header.push_list("skills", &staff.skills);
    header.push_list("concerns", &staff.concerns);
    header.push_timestamp("created_at", &staff.created_at);
    header.push_timestamp("updated_at", &staff.updated_at);
    header
}

fn staff_from_header(header: &Header) -> Result<Staff, ParseError> {
    Ok(Staff {
        id: header.uuid("id")?,
        name: header.required("name")?.to_string(),
        email: header.optional("email"),
        role: header.optional("role"),
        department: header.optional("department"),
        team: header.optional("team"),
        manager: header.optional("manager"),
        hire_date: header.optional_date("hire_date")?,
        last_one_on_one: header.optional_date("last_one_on_one")?,
        next_review: header.optional_date("next_review")?,
        skills: header.list("skills")?,
        concerns: header.list("concerns")?,
        created_at: header.timestamp("created_at")?,
        updated_at: header.timestamp("updated_at")?,
    })
}

fn overview_body(staff: &Staff) -> String {
    let mut body = String::new();
    let mut line = |label: &str, value: &str| {
        body.push_str(&escape_visible(&format!("- **{label}:** {value}")));
        body.push('\n');
    };

    line("Role", staff.role.as_deref().unwrap_or(NOT_SPECIFIED));
    line("Department", staff.department.as_deref().unwrap_or(NOT_SPECIFIED));
    line("Email", staff.email.as_deref().unwrap_or(NOT_SPECIFIED));
    line("Manager", staff.manager.as_deref().unwrap_or(NOT_SPECIFIED));
    if let Some(team) = &staff.team {
        line("Team", team);
    }
    if let Some(date) = &staff.hire_date {
        line("Hire date", &format_date(date));
    }
    if let Some(date) = &staff.last_one_on_one {
        line("Last one-on-one", &format_date(date));
    }
    if let Some(date) = &staff.next_review {
        line("Next review", &format_date(date));
    }
    if !staff.skills.is_empty() {
        line("Skills", &staff.skills.join(", "));
    }
    if !staff.concerns.is_empty() {
        line("Concerns", &staff.concerns.join(", "));
    }
    body
}

fn goals_body(goals: &[Goal]) -> String {
    let mut body = String::new();
    for goal in goals {
        let mut headline = format!("- {} — {}", goal.description, goal.status);
        if let Some(target) = &goal.target_date {
            let _ = write!(headline, " (target: {})", format_date(target));
        }
        push_line(&mut body, &headline);
        if let Some(entry) = goal.latest_progress() {
            push_line(
                &mut body,
                &format!(
                    "  - Latest progress ({}): {}",
                    format_date(&entry.at.date_naive()),
                    entry.note
                ),
            );
        }
        body.push_str(&render_anchor(GOAL_TAG, goal));
    }
    body
}

fn notes_body(notes: &[Note]) -> String {
    let mut body = String::new();
    for note in notes {
        let mut headline = format!("- **{}**", format_date(&note.created_at.date_naive()));
        if let Some(category) = &note.category {
            let _ = write!(headline, " · {category}");
        }
        if let Some(source) = &note.source {
            let _ = write!(headline, " · via {source}");
        }

        let mut lines = note.body.lines();
        let _ = write!(headline, " — {}", lines.next().unwrap_or_default());
        push_line(&mut body, &headline);
        for line in lines {
            if line.trim().is_empty() {
                body.push('\n');
            } else {
                push_line(&mut body, &format!("  {line}"));
            }
        }
        if !note.tags.is_empty() {
            push_line(&mut body, &format!("  Tags: {}", note.tags.join(", ")));
        }
        body.push_str(&render_anchor(NOTE_TAG, note));
    }
    body
}

fn achievements_body(achievements: &[Achievement]) -> String {
    let mut body = String::new();
    for achievement in achievements {
        push_line(
            &mut body,
            &format!(
                "- {} — {}",
                format_date(&achievement.achieved_on),
                achievement.description
            ),
        );
        body.push_str(&render_anchor(ACHIEVEMENT_TAG, achievement));
    }
    body
}

fn push_line(body: &mut String, line: &str) {
    body.push_str(&escape_visible(line));
    body.push('\n');
}
