// index.rs — ID / parent-ID index over canonical node names
//
// IDs come from the ordered-block document; parent IDs are projected onto
// them by walking the loop hierarchy.
//
// Preconditions: none.
// Postconditions: every ordered function and block has an entry; entries the
//   hierarchy walk never reaches keep `parent_id == 0`.
// Failure modes: none (duplicates and unplaced blocks become diagnostics).
// Side effects: none.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::diag::{codes, Diagnostic};
use crate::document::{LoopHierarchy, NamedNode, OrderedBlocks};
use crate::names::canonicalize;

/// Parent ID of top-level rows.
pub const ROOT_PARENT_ID: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdEntry {
    pub id: i64,
    pub parent_id: i64,
}

/// Canonical name → IDs. Names absent from the index are fictitious.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdIndex {
    entries: HashMap<String, IdEntry>,
}

impl IdIndex {
    pub fn get(&self, name: &str) -> Option<&IdEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, name: &str, id: i64) -> Option<IdEntry> {
        self.entries.insert(
            name.to_string(),
            IdEntry {
                id,
                parent_id: ROOT_PARENT_ID,
            },
        )
    }
}

impl FromIterator<(String, IdEntry)> for IdIndex {
    fn from_iter<I: IntoIterator<Item = (String, IdEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

pub struct IndexResult {
    pub index: IdIndex,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the index from `ordered` and propagate parent IDs from `hierarchy`.
pub fn build_index(ordered: &OrderedBlocks, hierarchy: &LoopHierarchy) -> IndexResult {
    let mut builder = IndexBuilder {
        index: IdIndex::default(),
        placed: HashSet::new(),
        diagnostics: Vec::new(),
    };

    for (func_name, func) in ordered.iter() {
        builder.seed(func_name, func.id);
        for block in &func.children {
            builder.seed(&block.name, block.id);
        }
    }

    builder.propagate(&hierarchy.children, ROOT_PARENT_ID);

    let mut reported = HashSet::new();
    for (func_name, func) in ordered.iter() {
        let names = std::iter::once(func_name).chain(func.children.iter().map(|b| b.name.as_str()));
        for name in names {
            if !builder.placed.contains(name) && reported.insert(name) {
                builder.diagnostics.push(
                    Diagnostic::note(
                        codes::UNPLACED_BLOCK,
                        name,
                        "not reached by the loop hierarchy; parent ID stays 0",
                    ),
                );
            }
        }
    }

    tracing::debug!(
        entries = builder.index.len(),
        placed = builder.placed.len(),
        "block index built"
    );

    IndexResult {
        index: builder.index,
        diagnostics: builder.diagnostics,
    }
}

struct IndexBuilder {
    index: IdIndex,
    placed: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl IndexBuilder {
    fn seed(&mut self, name: &str, id: i64) {
        if let Some(prev) = self.index.insert(name, id) {
            self.diagnostics.push(
                Diagnostic::warning(
                    codes::DUPLICATE_BLOCK_NAME,
                    name,
                    format!("listed more than once (ID {} replaced by {})", prev.id, id),
                )
                .with_hint("block names must be unique across functions"),
            );
        }
    }

    /// Set parent IDs below `pid`. Unknown nodes are skipped together with
    /// their subtree; their siblings are still visited.
    fn propagate(&mut self, nodes: &[NamedNode], pid: i64) {
        for node in nodes {
            let name = canonicalize(&node.name);
            let id = match self.index.entries.get_mut(&name) {
                Some(entry) => {
                    entry.parent_id = pid;
                    entry.id
                }
                None => {
                    tracing::trace!(node = %node.name, "hierarchy node not indexed");
                    self.diagnostics.push(Diagnostic::note(
                        codes::UNINDEXED_NODE,
                        &node.name,
                        "not in the block index; subtree left without parent IDs",
                    ));
                    continue;
                }
            };
            self.placed.insert(name);
            self.propagate(&node.children, id);
        }
    }
}
