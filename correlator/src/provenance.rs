// provenance.rs — Input fingerprints for a rendered report
//
// SHA-256 of each raw input document plus a combined digest, so a table can
// be tied to the exact inputs it was rendered from.

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::document::{DocumentKind, ReportDocuments};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Per-document digests in `DocumentKind::ALL` order.
    pub documents: Vec<(DocumentKind, [u8; 32])>,
    /// Digest over `"<label>:<hex>\n"` lines of all documents.
    pub combined: [u8; 32],
    pub tool_version: &'static str,
}

impl Provenance {
    pub fn combined_hex(&self) -> String {
        bytes_to_hex(&self.combined)
    }

    /// Serialize for `--emit build-info`.
    pub fn to_json(&self) -> String {
        let documents: serde_json::Map<String, serde_json::Value> = self
            .documents
            .iter()
            .map(|(kind, hash)| (kind.label().to_string(), json!(bytes_to_hex(hash))))
            .collect();
        let value = json!({
            "documents": documents,
            "combined": self.combined_hex(),
            "tool_version": self.tool_version,
        });
        format!("{:#}\n", value)
    }
}

pub fn compute_provenance(docs: &ReportDocuments) -> Provenance {
    let documents: Vec<(DocumentKind, [u8; 32])> = DocumentKind::ALL
        .iter()
        .map(|kind| {
            let text = docs
                .raw()
                .iter()
                .find(|raw| raw.kind == *kind)
                .map_or("", |raw| raw.text.as_str());
            (*kind, sha256(text.as_bytes()))
        })
        .collect();

    let mut manifest = String::new();
    for (kind, hash) in &documents {
        manifest.push_str(kind.label());
        manifest.push(':');
        manifest.push_str(&bytes_to_hex(hash));
        manifest.push('\n');
    }

    Provenance {
        documents,
        combined: sha256(manifest.as_bytes()),
        tool_version: env!("CARGO_PKG_VERSION"),
    }
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

fn bytes_to_hex(bytes: &[u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in bytes {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
    }
    s
}
