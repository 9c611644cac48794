// flatten.rs — Selected subtree → display rows
//
// Finds the selected node in the loop hierarchy, walks its subtree in
// pre-order and turns every indexed node into a `Row`, enriching basic blocks
// with timing and latency data.
//
// Preconditions: `index` was built from the same hierarchy.
// Postconditions: rows are in pre-order; no row descends from a fictitious
//   node; the first row has parent ID 0.
// Failure modes: none (unmatched selection yields `found == false`).
// Side effects: none.

use serde::Serialize;

use crate::diag::{codes, Diagnostic};
use crate::document::{Cell, DebugLoc, Detail, LoopHierarchy, NamedNode, ScheduleDoc, TimingDoc};
use crate::index::{IdIndex, ROOT_PARENT_ID};
use crate::latency::{find_latency, UNKNOWN_LATENCY};
use crate::names::{canonicalize, is_basic_block};

/// Forced into `ii`, `speculatedIterations` and `maxInterleaving` of loops
/// that are not pipelined.
pub const NOT_APPLICABLE: &str = "n/a";

const NOT_PIPELINED: &str = "No";

// ── Columns ─────────────────────────────────────────────────────────────────

/// A metric column of the loop table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Pipelined,
    Ii,
    SpeculatedIterations,
    AchievedFmax,
    Latency,
    MaxInterleaving,
    Brief,
}

impl Column {
    /// Display order.
    pub const ALL: [Column; 7] = [
        Column::Pipelined,
        Column::Ii,
        Column::SpeculatedIterations,
        Column::AchievedFmax,
        Column::Latency,
        Column::MaxInterleaving,
        Column::Brief,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Column::Pipelined => "Pipelined",
            Column::Ii => "II",
            Column::SpeculatedIterations => "Speculated iterations",
            Column::AchievedFmax => "Scheduled fMAX",
            Column::Latency => "Latency",
            Column::MaxInterleaving => "Max interleaving iterations",
            Column::Brief => "Details",
        }
    }

    /// Attribute key of the column in serialized rows.
    pub fn key(self) -> &'static str {
        match self {
            Column::Pipelined => "pipelined",
            Column::Ii => "ii",
            Column::SpeculatedIterations => "speculatedIterations",
            Column::AchievedFmax => "achievedFmax",
            Column::Latency => "latency",
            Column::MaxInterleaving => "maxInterleaving",
            Column::Brief => "brief",
        }
    }
}

// ── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowMetrics {
    pub pipelined: Cell,
    pub ii: Cell,
    pub speculated_iterations: Cell,
    pub achieved_fmax: Cell,
    pub latency: Cell,
    pub max_interleaving: Cell,
    pub brief: Cell,
}

impl RowMetrics {
    pub fn get(&self, column: Column) -> &Cell {
        match column {
            Column::Pipelined => &self.pipelined,
            Column::Ii => &self.ii,
            Column::SpeculatedIterations => &self.speculated_iterations,
            Column::AchievedFmax => &self.achieved_fmax,
            Column::Latency => &self.latency,
            Column::MaxInterleaving => &self.max_interleaving,
            Column::Brief => &self.brief,
        }
    }
}

/// One display-ready table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: i64,
    pub parent_id: i64,
    /// Raw node name, with `" (<file>)"` appended when only the file is known.
    pub label: String,
    /// Canonical name used for correlation.
    pub name: String,
    /// Full debug array, kept only when `debug[0][0]` carries a line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_loc: Option<Vec<Vec<DebugLoc>>>,
    pub columns: RowMetrics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Detail>,
}

impl Row {
    /// Details-pane HTML for this row.
    pub fn details_html(&self) -> String {
        crate::render::render_details_html(&self.details)
    }

    /// `debug[0][0]` when the row links to a source line.
    pub fn source_link(&self) -> Option<&DebugLoc> {
        self.debug_loc.as_ref()?.first()?.first()
    }
}

// ── Flattening ──────────────────────────────────────────────────────────────

pub struct FlattenResult {
    /// Whether a node named exactly like the selection exists.
    pub found: bool,
    pub rows: Vec<Row>,
    pub diagnostics: Vec<Diagnostic>,
}

/// First node, depth-first over the `children` arrays, whose raw name equals
/// `name`.
pub fn find_subtree<'a>(nodes: &'a [NamedNode], name: &str) -> Option<&'a NamedNode> {
    nodes.iter().find_map(|node| {
        if node.name == name {
            Some(node)
        } else {
            find_subtree(&node.children, name)
        }
    })
}

/// Flatten the subtree rooted at the node named `selected`.
pub fn flatten(
    selected: &str,
    hierarchy: &LoopHierarchy,
    index: &IdIndex,
    timing: &TimingDoc,
    schedule: &ScheduleDoc,
) -> FlattenResult {
    let Some(root) = find_subtree(&hierarchy.children, selected) else {
        tracing::debug!(selected, "selection not found in loop hierarchy");
        return FlattenResult {
            found: false,
            rows: Vec::new(),
            diagnostics: Vec::new(),
        };
    };

    let mut walker = Flattener {
        index,
        timing,
        schedule,
        rows: Vec::new(),
        diagnostics: Vec::new(),
    };
    walker.visit(root, true);

    tracing::debug!(selected, rows = walker.rows.len(), "subtree flattened");

    FlattenResult {
        found: true,
        rows: walker.rows,
        diagnostics: walker.diagnostics,
    }
}

struct Flattener<'a> {
    index: &'a IdIndex,
    timing: &'a TimingDoc,
    schedule: &'a ScheduleDoc,
    rows: Vec<Row>,
    diagnostics: Vec<Diagnostic>,
}

impl Flattener<'_> {
    fn visit(&mut self, node: &NamedNode, is_first_row: bool) {
        let name = canonicalize(&node.name);
        let Some(entry) = self.index.get(&name) else {
            tracing::trace!(node = %node.name, "suppressing fictitious node");
            self.diagnostics.push(Diagnostic::note(
                codes::FICTITIOUS_NODE,
                &node.name,
                "not in the block index; row and subtree omitted",
            ));
            return;
        };

        let mut columns = RowMetrics {
            pipelined: node.data_cell(0),
            ii: node.data_cell(1),
            speculated_iterations: node.data_cell(2),
            brief: node.brief().map(Cell::text).unwrap_or_default(),
            ..RowMetrics::default()
        };

        if is_basic_block(&node.name) {
            if let Some(timing) = self.timing.basicblocks.get(&name) {
                columns.achieved_fmax = timing.achieved_fmax.clone();
                columns.max_interleaving = timing.max_interleaving.clone();
                columns.latency = match find_latency(self.schedule, &name) {
                    Some(cycles) => cycles,
                    None => {
                        self.diagnostics.push(Diagnostic::note(
                            codes::UNKNOWN_LATENCY,
                            &name,
                            "timed block missing from the schedule or without numeric times",
                        ));
                        Cell::text(UNKNOWN_LATENCY)
                    }
                };
            }
        }

        if columns.pipelined.is_text(NOT_PIPELINED) {
            columns.ii = Cell::text(NOT_APPLICABLE);
            columns.speculated_iterations = Cell::text(NOT_APPLICABLE);
            columns.max_interleaving = Cell::text(NOT_APPLICABLE);
        }

        let (label, debug_loc) = match node.primary_location() {
            Some(loc) if loc.line.is_some() => (node.name.clone(), Some(node.debug.clone())),
            Some(loc) => (format!("{} ({})", node.name, loc.filename), None),
            None => (node.name.clone(), None),
        };

        self.rows.push(Row {
            id: entry.id,
            parent_id: if is_first_row {
                ROOT_PARENT_ID
            } else {
                entry.parent_id
            },
            label,
            name,
            debug_loc,
            columns,
            details: node.details.clone(),
        });

        for child in &node.children {
            self.visit(child, false);
        }
    }
}
