// session.rs — One render cycle per selection
//
// Holds the parsed report read-only and, on every selection, rebuilds the
// block index from scratch, flattens the selected subtree and wraps the rows
// in a panel. Nothing carries over between selections.
//
// Preconditions: documents are fully loaded.
// Postconditions: `Selection::panel` is a table or the "no information" message.
// Failure modes: none.
// Side effects: tracing events per stage.

use std::time::{Duration, Instant};

use crate::diag::Diagnostic;
use crate::document::ReportDocuments;
use crate::flatten::flatten;
use crate::index::build_index;
use crate::panel::Panel;

/// A stage of the render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildIndex,
    Flatten,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::BuildIndex => "build_index",
            Stage::Flatten => "flatten",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
}

/// Result of one selection.
#[derive(Debug, Clone)]
pub struct Selection {
    pub panel: Panel,
    /// Index diagnostics first, then flatten diagnostics.
    pub diagnostics: Vec<Diagnostic>,
    pub timings: Vec<StageTiming>,
}

#[derive(Debug, Clone)]
pub struct Session {
    documents: ReportDocuments,
}

impl Session {
    pub fn new(documents: ReportDocuments) -> Self {
        Self { documents }
    }

    pub fn documents(&self) -> &ReportDocuments {
        &self.documents
    }

    /// Run a full render cycle for the node named `selected`.
    pub fn select(&self, selected: &str) -> Selection {
        let docs = &self.documents;
        let mut timings = Vec::with_capacity(2);

        let t = Instant::now();
        let indexed = build_index(&docs.ordered_blocks, &docs.hierarchy);
        record(&mut timings, Stage::BuildIndex, t.elapsed());

        let t = Instant::now();
        let flat = flatten(
            selected,
            &docs.hierarchy,
            &indexed.index,
            &docs.timing,
            &docs.schedule,
        );
        record(&mut timings, Stage::Flatten, t.elapsed());

        let mut diagnostics = indexed.diagnostics;
        diagnostics.extend(flat.diagnostics);

        Selection {
            panel: Panel::for_selection(selected, flat.rows),
            diagnostics,
            timings,
        }
    }
}

fn record(timings: &mut Vec<StageTiming>, stage: Stage, elapsed: Duration) {
    tracing::debug!(
        stage = stage.name(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "stage complete"
    );
    timings.push(StageTiming { stage, elapsed });
}
