// panel.rs — The card shown for a selection: a message or a loop table

use serde::Serialize;

use crate::flatten::Row;

/// Shown when the selection matches nothing displayable.
pub const NO_INFORMATION: &str = "No information found for this node";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub body: PanelBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum PanelBody {
    Message(String),
    Table(Vec<Row>),
}

impl Panel {
    /// A table panel for `selected`, or the informational message when there
    /// are no rows (unmatched selection, or a fictitious subtree root).
    pub fn for_selection(selected: &str, rows: Vec<Row>) -> Self {
        let body = if rows.is_empty() {
            PanelBody::Message(NO_INFORMATION.to_string())
        } else {
            PanelBody::Table(rows)
        };
        Panel {
            title: format!("Loop analysis: {}", selected),
            body,
        }
    }

    /// Table rows; empty for message panels.
    pub fn rows(&self) -> &[Row] {
        match &self.body {
            PanelBody::Table(rows) => rows,
            PanelBody::Message(_) => &[],
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.body {
            PanelBody::Message(m) => Some(m),
            PanelBody::Table(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rows_become_message() {
        let panel = Panel::for_selection("kernel: k", Vec::new());
        assert_eq!(panel.title, "Loop analysis: kernel: k");
        assert_eq!(panel.message(), Some(NO_INFORMATION));
        assert!(panel.rows().is_empty());
    }

    #[test]
    fn message_serializes_tagged() {
        let panel = Panel::for_selection("x", Vec::new());
        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(value["body"]["kind"], "message");
        assert_eq!(value["body"]["content"], NO_INFORMATION);
    }
}
