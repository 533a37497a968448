//! Canonical rendered form of a document, split into replaceable pieces.

use super::header::Header;
use super::section::{FOOTER_PREFIX, FOOTER_RULE};
use super::DocumentLayout;
use crate::model::time::{format_timestamp, Timestamp};

/// Generated document pieces, ready to write fresh or to merge into an
/// existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub layout: DocumentLayout,
    pub header: Header,
    /// `# Title` line plus one blank line.
    pub title: String,
    /// One entry per owned section, in layout order.
    pub sections: Vec<String>,
    /// Horizontal rule plus last-updated stamp.
    pub footer: String,
}

impl RenderedDocument {
    pub fn new(
        layout: DocumentLayout,
        header: Header,
        title: &str,
        sections: Vec<String>,
        updated_at: &Timestamp,
    ) -> Self {
        debug_assert_eq!(sections.len(), layout.sections.len());
        Self {
            layout,
            header,
            title: format!("# {title}\n\n"),
            sections,
            footer: format!(
                "{FOOTER_RULE}\n{FOOTER_PREFIX}{}*\n",
                format_timestamp(updated_at)
            ),
        }
    }

    /// Rendered text of an owned section by name.
    pub fn section(&self, name: &str) -> Option<&str> {
        self.layout
            .position(name)
            .and_then(|index| self.sections.get(index))
            .map(String::as_str)
    }

    /// Full document text as written for a file that does not exist yet.
    pub fn to_text(&self) -> String {
        let mut out = self.header.render();
        out.push('\n');
        out.push_str(&self.title);
        for section in &self.sections {
            out.push_str(section);
        }
        out.push_str(&self.footer);
        out
    }
}

/// Builds one owned section: heading, blank line, body lines, blank line.
///
/// An empty `body` renders the placeholder line instead.
pub(crate) fn render_section(name: &str, body: &str, placeholder: &str) -> String {
    if body.is_empty() {
        format!("## {name}\n\n{placeholder}\n\n")
    } else {
        format!("## {name}\n\n{body}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::{render_section, RenderedDocument};
    use crate::codec::{Header, REMINDERS_LAYOUT};
    use crate::model::time::now;

    #[test]
    fn empty_sections_render_placeholder() {
        assert_eq!(
            render_section("Pending", "", "_Nothing pending._"),
            "## Pending\n\n_Nothing pending._\n\n"
        );
        assert_eq!(
            render_section("Pending", "- a\n", "_Nothing pending._"),
            "## Pending\n\n- a\n\n"
        );
    }

    #[test]
    fn to_text_orders_header_title_sections_footer() {
        let stamp = now();
        let doc = RenderedDocument::new(
            REMINDERS_LAYOUT,
            Header::new("reminders"),
            "Reminders",
            vec!["## Pending\n\n".to_string(), "## Completed\n\n".to_string()],
            &stamp,
        );
        let text = doc.to_text();
        assert!(text.starts_with("---\nkind: reminders\n---\n\n# Reminders\n\n## Pending"));
        assert!(text.ends_with("*\n"));
        assert_eq!(doc.section("Completed"), Some("## Completed\n\n"));
    }
}
