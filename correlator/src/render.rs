// render.rs — Panel rendering through a table-widget contract
//
// `TableSink` mirrors the operations of the viewer's tree-table widget
// (show-name toggle, column list, attribute map, rows, draw). `render_panel`
// drives any sink; `TextTable` and `HtmlTable` are the two built-in sinks.
//
// Preconditions: rows are in pre-order with parents before children.
// Postconditions: returns the complete rendered card.
// Failure modes: none (pure string formatting).
// Side effects: none.

use std::collections::HashMap;
use std::fmt::Write;

use crate::document::Detail;
use crate::flatten::{Column, Row};
use crate::index::ROOT_PARENT_ID;
use crate::panel::{Panel, PanelBody};

const NAME_HEADING: &str = "Name";

/// Rendering switches shared by all sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show the node-name column.
    pub show_name: bool,
    /// Emit each row's details after the table.
    pub include_details: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_name: true,
            include_details: false,
        }
    }
}

/// The table-widget contract.
pub trait TableSink {
    fn set_show_name(&mut self, show: bool);
    /// Column headings in display order.
    fn set_column_list(&mut self, headings: &[&str]);
    /// Binds headings to row metrics. Unbound headings render empty cells.
    fn set_attribute_map(&mut self, attributes: &[(&str, Column)]);
    fn add_row(&mut self, row: &Row);
    /// Render the accumulated table and reset the row buffer.
    fn draw(&mut self) -> String;
    /// Render an informational message in place of a table.
    fn message(&mut self, text: &str) -> String;
    /// Wrap a drawn body in a titled card.
    fn card(&mut self, title: &str, body: &str) -> String;
}

/// Render `panel` through `sink`.
pub fn render_panel<S: TableSink + ?Sized>(
    panel: &Panel,
    sink: &mut S,
    options: &RenderOptions,
) -> String {
    let body = match &panel.body {
        PanelBody::Message(text) => sink.message(text),
        PanelBody::Table(rows) => {
            let headings: Vec<&str> = Column::ALL.iter().map(|c| c.heading()).collect();
            let attributes: Vec<(&str, Column)> =
                Column::ALL.iter().map(|c| (c.heading(), *c)).collect();
            sink.set_show_name(options.show_name);
            sink.set_column_list(&headings);
            sink.set_attribute_map(&attributes);
            for row in rows {
                sink.add_row(row);
            }
            sink.draw()
        }
    };
    sink.card(&panel.title, &body)
}

// ── Shared table state ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct TableState {
    show_name: bool,
    headings: Vec<String>,
    attributes: HashMap<String, Column>,
    rows: Vec<Row>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            show_name: true,
            headings: Vec::new(),
            attributes: HashMap::new(),
            rows: Vec::new(),
        }
    }
}

impl TableState {
    fn set_attribute_map(&mut self, attributes: &[(&str, Column)]) {
        self.attributes = attributes
            .iter()
            .map(|(heading, column)| (heading.to_string(), *column))
            .collect();
    }

    fn column(&self, heading: &str) -> Option<Column> {
        self.attributes.get(heading).copied()
    }
}

/// Nesting depth of each row, derived from parent IDs. Rows whose parent is
/// not an earlier row sit at depth 0.
fn row_depths(rows: &[Row]) -> Vec<usize> {
    let mut by_id: HashMap<i64, usize> = HashMap::new();
    rows.iter()
        .map(|row| {
            let depth = if row.parent_id == ROOT_PARENT_ID {
                0
            } else {
                by_id.get(&row.parent_id).map_or(0, |d| d + 1)
            };
            by_id.insert(row.id, depth);
            depth
        })
        .collect()
}

// ── Plain text ──────────────────────────────────────────────────────────────

/// Aligned plain-text tree-table; labels are indented two spaces per level.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    state: TableState,
    include_details: bool,
}

impl TextTable {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            state: TableState::default(),
            include_details: options.include_details,
        }
    }
}

impl TableSink for TextTable {
    fn set_show_name(&mut self, show: bool) {
        self.state.show_name = show;
    }

    fn set_column_list(&mut self, headings: &[&str]) {
        self.state.headings = headings.iter().map(|h| h.to_string()).collect();
    }

    fn set_attribute_map(&mut self, attributes: &[(&str, Column)]) {
        self.state.set_attribute_map(attributes);
    }

    fn add_row(&mut self, row: &Row) {
        self.state.rows.push(row.clone());
    }

    fn draw(&mut self) -> String {
        let rows = std::mem::take(&mut self.state.rows);
        let depths = row_depths(&rows);

        let mut header: Vec<String> = Vec::new();
        if self.state.show_name {
            header.push(NAME_HEADING.to_string());
        }
        header.extend(self.state.headings.iter().cloned());

        let mut lines: Vec<Vec<String>> = Vec::with_capacity(rows.len());
        for (row, depth) in rows.iter().zip(&depths) {
            let mut line = Vec::with_capacity(header.len());
            if self.state.show_name {
                line.push(format!("{}{}", "  ".repeat(*depth), row.label));
            }
            for heading in &self.state.headings {
                let cell = self
                    .state
                    .column(heading)
                    .map(|c| row.columns.get(c).to_string())
                    .unwrap_or_default();
                line.push(cell);
            }
            lines.push(line);
        }

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for line in &lines {
            for (w, cell) in widths.iter_mut().zip(line) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut buf = String::new();
        write_text_line(&mut buf, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_text_line(&mut buf, &rule, &widths);
        for line in &lines {
            write_text_line(&mut buf, line, &widths);
        }

        if self.include_details {
            for row in rows.iter().filter(|r| !r.details.is_empty()) {
                writeln!(buf).unwrap();
                writeln!(buf, "[{}] {}", row.id, row.label).unwrap();
                for detail in &row.details {
                    writeln!(buf, "  {}: {}", detail.kind, detail.text).unwrap();
                }
            }
        }
        buf
    }

    fn message(&mut self, text: &str) -> String {
        format!("{}\n", text)
    }

    fn card(&mut self, title: &str, body: &str) -> String {
        format!("== {} ==\n{}", title, body)
    }
}

fn write_text_line(buf: &mut String, cells: &[String], widths: &[usize]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        write!(line, "{:<width$}", cell, width = *width).unwrap();
    }
    writeln!(buf, "{}", line.trim_end()).unwrap();
}

// ── HTML ────────────────────────────────────────────────────────────────────

/// HTML tree-table. Rows carry `data-id` / `data-parent-id` so a client-side
/// tree-table can collapse them; rows with a source line get a link.
#[derive(Debug, Clone, Default)]
pub struct HtmlTable {
    state: TableState,
    include_details: bool,
}

impl HtmlTable {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            state: TableState::default(),
            include_details: options.include_details,
        }
    }
}

impl TableSink for HtmlTable {
    fn set_show_name(&mut self, show: bool) {
        self.state.show_name = show;
    }

    fn set_column_list(&mut self, headings: &[&str]) {
        self.state.headings = headings.iter().map(|h| h.to_string()).collect();
    }

    fn set_attribute_map(&mut self, attributes: &[(&str, Column)]) {
        self.state.set_attribute_map(attributes);
    }

    fn add_row(&mut self, row: &Row) {
        self.state.rows.push(row.clone());
    }

    fn draw(&mut self) -> String {
        let rows = std::mem::take(&mut self.state.rows);
        let depths = row_depths(&rows);
        let mut buf = String::new();

        writeln!(buf, "<table class=\"loop-table\">").unwrap();
        writeln!(buf, "<thead>").unwrap();
        buf.push_str("<tr>");
        if self.state.show_name {
            write!(buf, "<th>{}</th>", NAME_HEADING).unwrap();
        }
        for heading in &self.state.headings {
            write!(buf, "<th>{}</th>", escape_html(heading)).unwrap();
        }
        writeln!(buf, "</tr>").unwrap();
        writeln!(buf, "</thead>").unwrap();
        writeln!(buf, "<tbody>").unwrap();

        for (row, depth) in rows.iter().zip(&depths) {
            write!(
                buf,
                "<tr data-id=\"{}\" data-parent-id=\"{}\" data-depth=\"{}\">",
                row.id, row.parent_id, depth
            )
            .unwrap();
            if self.state.show_name {
                buf.push_str("<td class=\"name\">");
                match row.source_link() {
                    Some(loc) => write!(
                        buf,
                        "<a class=\"source-link\" data-file=\"{}\" data-line=\"{}\">{}</a>",
                        escape_html(&loc.filename),
                        loc.line.unwrap_or_default(),
                        escape_html(&row.label)
                    )
                    .unwrap(),
                    None => buf.push_str(&escape_html(&row.label)),
                }
                buf.push_str("</td>");
            }
            for heading in &self.state.headings {
                match self.state.column(heading) {
                    Some(column) => write!(
                        buf,
                        "<td data-attr=\"{}\">{}</td>",
                        column.key(),
                        escape_html(&row.columns.get(column).to_string())
                    )
                    .unwrap(),
                    None => buf.push_str("<td></td>"),
                }
            }
            writeln!(buf, "</tr>").unwrap();
        }

        writeln!(buf, "</tbody>").unwrap();
        writeln!(buf, "</table>").unwrap();

        if self.include_details {
            for row in rows.iter().filter(|r| !r.details.is_empty()) {
                writeln!(
                    buf,
                    "<div class=\"details-pane\" data-row-id=\"{}\" hidden>",
                    row.id
                )
                .unwrap();
                buf.push_str(&row.details_html());
                writeln!(buf, "</div>").unwrap();
            }
        }
        buf
    }

    fn message(&mut self, text: &str) -> String {
        format!("<p class=\"info\">{}</p>\n", escape_html(text))
    }

    fn card(&mut self, title: &str, body: &str) -> String {
        format!(
            "<div class=\"card\">\n<div class=\"card-header\">{}</div>\n<div class=\"card-body\">\n{}</div>\n</div>\n",
            escape_html(title),
            body
        )
    }
}

/// Details-pane content for one node: brief entries emphasised, other
/// entries as plain paragraphs, newlines kept as line breaks.
pub fn render_details_html(details: &[Detail]) -> String {
    let mut buf = String::new();
    writeln!(buf, "<div class=\"details\">").unwrap();
    for detail in details {
        let text = escape_html(&detail.text).replace('\n', "<br>");
        if detail.kind == "brief" {
            writeln!(buf, "<p class=\"brief\"><b>{}</b></p>", text).unwrap();
        } else {
            writeln!(buf, "<p>{}</p>", text).unwrap();
        }
    }
    writeln!(buf, "</div>").unwrap();
    buf
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Cell, DebugLoc};
    use crate::flatten::RowMetrics;

    fn row(id: i64, parent_id: i64, label: &str) -> Row {
        Row {
            id,
            parent_id,
            label: label.to_string(),
            name: label.to_string(),
            debug_loc: None,
            columns: RowMetrics {
                pipelined: Cell::text("Yes"),
                ii: Cell::Int(2),
                ..RowMetrics::default()
            },
            details: Vec::new(),
        }
    }

    fn draw_two_columns<S: TableSink>(sink: &mut S, rows: &[Row]) -> String {
        sink.set_show_name(true);
        sink.set_column_list(&["Pipelined", "II"]);
        sink.set_attribute_map(&[("Pipelined", Column::Pipelined), ("II", Column::Ii)]);
        for r in rows {
            sink.add_row(r);
        }
        sink.draw()
    }

    #[test]
    fn text_table_aligns_and_indents() {
        let mut sink = TextTable::default();
        let out = draw_two_columns(&mut sink, &[row(1, 0, "kernel: L1"), row(2, 1, "L1.B1")]);
        let expected = "\
Name        Pipelined  II
----------  ---------  --
kernel: L1  Yes        2
  L1.B1     Yes        2
";
        assert_eq!(out, expected);
    }

    #[test]
    fn draw_resets_rows() {
        let mut sink = TextTable::default();
        draw_two_columns(&mut sink, &[row(1, 0, "a")]);
        let second = sink.draw();
        assert_eq!(second.lines().count(), 2, "header and rule only: {second}");
    }

    #[test]
    fn unbound_heading_is_empty() {
        let mut sink = TextTable::default();
        sink.set_show_name(false);
        sink.set_column_list(&["Pipelined", "Mystery"]);
        sink.set_attribute_map(&[("Pipelined", Column::Pipelined)]);
        sink.add_row(&row(1, 0, "a"));
        let out = sink.draw();
        assert_eq!(out.lines().nth(2), Some("Yes"));
    }

    #[test]
    fn depths_follow_parent_ids() {
        let rows = vec![row(5, 0, "a"), row(6, 5, "b"), row(7, 6, "c"), row(8, 5, "d"), row(9, 42, "e")];
        assert_eq!(row_depths(&rows), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn html_row_with_source_link() {
        let mut r = row(2, 1, "L1.B1");
        r.debug_loc = Some(vec![vec![DebugLoc {
            filename: "a.c".to_string(),
            line: Some(5),
        }]]);
        let mut sink = HtmlTable::default();
        let out = draw_two_columns(&mut sink, &[r]);
        assert!(out.contains(
            "<tr data-id=\"2\" data-parent-id=\"1\" data-depth=\"0\"><td class=\"name\"><a class=\"source-link\" data-file=\"a.c\" data-line=\"5\">L1.B1</a></td><td data-attr=\"pipelined\">Yes</td><td data-attr=\"ii\">2</td></tr>"
        ), "{out}");
    }

    #[test]
    fn html_escapes_labels() {
        let mut sink = HtmlTable::default();
        let out = draw_two_columns(&mut sink, &[row(1, 0, "tmpl<int>.B1")]);
        assert!(out.contains("tmpl&lt;int&gt;.B1"));
        assert!(!out.contains("tmpl<int>"));
    }

    #[test]
    fn message_panel_renders_card() {
        let panel = Panel::for_selection("nothing", Vec::new());
        let out = render_panel(&panel, &mut HtmlTable::default(), &RenderOptions::default());
        assert_eq!(
            out,
            "<div class=\"card\">\n<div class=\"card-header\">Loop analysis: nothing</div>\n<div class=\"card-body\">\n<p class=\"info\">No information found for this node</p>\n</div>\n</div>\n"
        );
    }

    #[test]
    fn details_html_brief_and_text() {
        let html = render_details_html(&[
            Detail {
                kind: "brief".to_string(),
                text: "II of 1".to_string(),
            },
            Detail {
                kind: "text".to_string(),
                text: "line one\nx < y".to_string(),
            },
        ]);
        assert_eq!(
            html,
            "<div class=\"details\">\n<p class=\"brief\"><b>II of 1</b></p>\n<p>line one<br>x &lt; y</p>\n</div>\n"
        );
    }

    #[test]
    fn escape_all_specials() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
