// outline.rs — Selectable nodes of the loop hierarchy
//
// Stands in for the viewer's tree widget: lists every hierarchy node in
// pre-order with its depth, so a caller can pick a selection name.

use std::fmt::Write;

use serde::Serialize;

use crate::document::{LoopHierarchy, NamedNode};
use crate::names::{classify, is_basic_block, NameKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub depth: usize,
    /// Raw name, usable as a selection.
    pub name: String,
    pub kind: NameKind,
    pub basic_block: bool,
}

pub fn outline(hierarchy: &LoopHierarchy) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    collect(&hierarchy.children, 0, &mut entries);
    entries
}

fn collect(nodes: &[NamedNode], depth: usize, out: &mut Vec<OutlineEntry>) {
    for node in nodes {
        out.push(OutlineEntry {
            depth,
            name: node.name.clone(),
            kind: classify(&node.name),
            basic_block: is_basic_block(&node.name),
        });
        collect(&node.children, depth + 1, out);
    }
}

/// Indented listing, one node per line; basic blocks are tagged `[block]`.
pub fn emit_outline(entries: &[OutlineEntry]) -> String {
    let mut buf = String::new();
    for entry in entries {
        write!(buf, "{}{}", "  ".repeat(entry.depth), entry.name).unwrap();
        if entry.basic_block {
            buf.push_str(" [block]");
        }
        buf.push('\n');
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preorder_with_depths() {
        let h: LoopHierarchy = serde_json::from_value(json!({"children": [
            {"name": "kernel: k", "children": [
                {"name": "k.B1", "children": [{"name": "Fused loop k.B2"}]},
                {"name": "k.B3"}
            ]},
            {"name": "kernel: j"}
        ]}))
        .unwrap();
        let entries = outline(&h);
        let shape: Vec<(usize, &str)> = entries.iter().map(|e| (e.depth, e.name.as_str())).collect();
        assert_eq!(
            shape,
            vec![
                (0, "kernel: k"),
                (1, "k.B1"),
                (2, "Fused loop k.B2"),
                (1, "k.B3"),
                (0, "kernel: j"),
            ]
        );
        assert_eq!(entries[2].kind, NameKind::FusedLoop);
        assert!(!entries[0].basic_block);

        assert_eq!(
            emit_outline(&entries),
            "kernel: k\n  k.B1 [block]\n    Fused loop k.B2 [block]\n  k.B3 [block]\nkernel: j\n"
        );
    }
}
