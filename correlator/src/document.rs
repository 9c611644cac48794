// document.rs — The four JSON documents of an HLS report
//
// Deserializes the loop hierarchy, the ordered-block ID source, the per-block
// timing document and the schedule document. Every field defaults to an empty
// value, so partial documents load and degrade to partial output downstream.
// A field or list element of an unexpected shape falls back to its default
// or is dropped on its own; it never fails the enclosing document.
// Map-shaped documents are kept as ordered entry lists: document order is the
// tie-break for latency lookup.
//
// Preconditions: none.
// Postconditions: a loaded `ReportDocuments` is never mutated afterwards.
// Failure modes: unreadable files, malformed JSON, or a document root of the
//   wrong shape (`DocumentError`).
// Side effects: file reads in `ReportDocuments::load`.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::{DeserializeOwned, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Cells ───────────────────────────────────────────────────────────────────

/// A loosely typed scalar from a report document or a rendered table cell.
///
/// Deserializing never fails: arrays and objects read as `Empty`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// True if this is a text cell holding exactly `s`.
    pub fn is_text(&self, s: &str) -> bool {
        matches!(self, Cell::Text(t) if t == s)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(n) => Some(*n as f64),
            Cell::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or_default(),
            },
            Value::String(s) => Cell::Text(s),
            other => {
                tracing::trace!(value = %other, "non-scalar cell read as empty");
                Cell::Empty
            }
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Cell::from(Value::deserialize(deserializer)?))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

// ── Loop hierarchy (loopsJSON) ──────────────────────────────────────────────

/// Free-form annotation attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Detail {
    #[serde(rename = "type", deserialize_with = "lenient")]
    pub kind: String,
    #[serde(deserialize_with = "lenient")]
    pub text: String,
}

/// Source-location provenance. A missing `line` means only the file is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugLoc {
    #[serde(deserialize_with = "lenient")]
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient")]
    pub line: Option<i64>,
}

/// A function, loop or basic block in the display hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NamedNode {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    /// `[pipelined, ii, speculated iterations]`.
    #[serde(deserialize_with = "lenient_seq")]
    pub data: Vec<Cell>,
    #[serde(deserialize_with = "lenient_seq")]
    pub details: Vec<Detail>,
    #[serde(deserialize_with = "lenient_seq")]
    pub debug: Vec<Vec<DebugLoc>>,
    #[serde(deserialize_with = "lenient_seq")]
    pub children: Vec<NamedNode>,
}

impl NamedNode {
    /// The `i`-th data cell, empty when absent.
    pub fn data_cell(&self, i: usize) -> Cell {
        self.data.get(i).cloned().unwrap_or_default()
    }

    /// Text of the first detail entry if it is a `brief`.
    pub fn brief(&self) -> Option<&str> {
        self.details
            .first()
            .filter(|d| d.kind == "brief")
            .map(|d| d.text.as_str())
    }

    /// `debug[0][0]`, the location used for labels and links.
    pub fn primary_location(&self) -> Option<&DebugLoc> {
        self.debug.first()?.first()
    }
}

/// Root of the loop hierarchy document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopHierarchy {
    #[serde(deserialize_with = "lenient_seq")]
    pub children: Vec<NamedNode>,
}

// ── Ordered blocks (funcOrderedBlock) ───────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockRef {
    pub name: String,
    pub id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FunctionBlocks {
    pub id: i64,
    #[serde(deserialize_with = "lenient_seq")]
    pub children: Vec<BlockRef>,
}

/// Function name → function ID and its blocks, in document order.
pub type OrderedBlocks = OrderedMap<FunctionBlocks>;

// ── Timing (fmax_iiJSON) ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockTiming {
    pub achieved_fmax: Cell,
    pub max_interleaving: Cell,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingDoc {
    pub basicblocks: OrderedMap<BlockTiming>,
}

// ── Schedule (scheduleJSON) ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduledNode {
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    pub start: Cell,
    pub end: Cell,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduledFunction {
    #[serde(deserialize_with = "lenient_seq")]
    pub nodes: Vec<ScheduledNode>,
}

/// Function ID → scheduled nodes, in document order.
pub type ScheduleDoc = OrderedMap<ScheduledFunction>;

// ── Ordered map ─────────────────────────────────────────────────────────────

/// A JSON object kept as an entry list in document order.
///
/// Entries whose value does not fit `T` are skipped rather than failing the
/// whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> OrderedMap<T> {
    /// First entry with key `key`.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

struct OrderedMapVisitor<T>(PhantomData<T>);

impl<'de, T: DeserializeOwned> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = OrderedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(OrderedMap::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
            match serde_json::from_value::<T>(value) {
                Ok(v) => entries.push((key, v)),
                Err(e) => tracing::trace!(entry = %key, error = %e, "skipping malformed entry"),
            }
        }
        Ok(OrderedMap { entries })
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

/// A field of the wrong shape (including `null`) reads as its default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list that keeps only the elements that fit `T`. Anything other than an
/// array reads as empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::trace!(error = %e, "skipping malformed element");
                None
            }
        })
        .collect())
}

// ── Document set ────────────────────────────────────────────────────────────

/// Identifies one of the four input documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Loops,
    OrderedBlocks,
    Timing,
    Schedule,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Loops,
        DocumentKind::OrderedBlocks,
        DocumentKind::Timing,
        DocumentKind::Schedule,
    ];

    /// Stable name used in diagnostics and provenance output.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Loops => "loops",
            DocumentKind::OrderedBlocks => "ordered_blocks",
            DocumentKind::Timing => "fmax_ii",
            DocumentKind::Schedule => "schedule",
        }
    }

    /// File name looked up inside a report directory.
    pub fn default_file_name(self) -> &'static str {
        match self {
            DocumentKind::Loops => "loops.json",
            DocumentKind::OrderedBlocks => "func_ordered_block.json",
            DocumentKind::Timing => "fmax_ii.json",
            DocumentKind::Schedule => "schedule.json",
        }
    }

    /// Timing and schedule data are optional; a report without them still
    /// renders, just without enrichment.
    pub fn is_optional(self) -> bool {
        matches!(self, DocumentKind::Timing | DocumentKind::Schedule)
    }
}

/// Where to read each document from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub loops: PathBuf,
    pub ordered_blocks: PathBuf,
    pub timing: PathBuf,
    pub schedule: PathBuf,
}

impl ReportPaths {
    /// Default file names under `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            loops: dir.join(DocumentKind::Loops.default_file_name()),
            ordered_blocks: dir.join(DocumentKind::OrderedBlocks.default_file_name()),
            timing: dir.join(DocumentKind::Timing.default_file_name()),
            schedule: dir.join(DocumentKind::Schedule.default_file_name()),
        }
    }

    pub fn path(&self, kind: DocumentKind) -> &Path {
        match kind {
            DocumentKind::Loops => &self.loops,
            DocumentKind::OrderedBlocks => &self.ordered_blocks,
            DocumentKind::Timing => &self.timing,
            DocumentKind::Schedule => &self.schedule,
        }
    }
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self::in_dir(Path::new("."))
    }
}

/// Errors that can occur while loading report documents.
#[derive(Debug)]
pub enum DocumentError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        kind: DocumentKind,
        origin: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            DocumentError::Parse {
                kind,
                origin,
                source,
            } => {
                write!(f, "{}: invalid {} document: {}", origin, kind.label(), source)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io { source, .. } => Some(source),
            DocumentError::Parse { source, .. } => Some(source),
        }
    }
}

/// The raw text of one input, kept for provenance hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub kind: DocumentKind,
    pub text: String,
}

/// All inputs of one report, parsed once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReportDocuments {
    pub hierarchy: LoopHierarchy,
    pub ordered_blocks: OrderedBlocks,
    pub timing: TimingDoc,
    pub schedule: ScheduleDoc,
    raw: Vec<RawDocument>,
}

impl ReportDocuments {
    /// Parse the four documents from JSON text. Empty text stands for an
    /// absent document.
    pub fn from_strs(
        loops: &str,
        ordered_blocks: &str,
        timing: &str,
        schedule: &str,
    ) -> Result<Self, DocumentError> {
        let texts = [
            (DocumentKind::Loops, loops),
            (DocumentKind::OrderedBlocks, ordered_blocks),
            (DocumentKind::Timing, timing),
            (DocumentKind::Schedule, schedule),
        ];
        Self::parse_all(
            texts
                .into_iter()
                .map(|(kind, text)| (kind, text.to_string(), kind.label().to_string())),
        )
    }

    /// Read and parse the documents named by `paths`. Missing optional
    /// documents (timing, schedule) load as empty.
    pub fn load(paths: &ReportPaths) -> Result<Self, DocumentError> {
        let mut texts = Vec::with_capacity(DocumentKind::ALL.len());
        for kind in DocumentKind::ALL {
            let path = paths.path(kind);
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) if kind.is_optional() && e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(document = kind.label(), path = %path.display(), "optional document absent");
                    String::new()
                }
                Err(e) => {
                    return Err(DocumentError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            };
            texts.push((kind, text, path.display().to_string()));
        }
        Self::parse_all(texts.into_iter())
    }

    fn parse_all(
        texts: impl Iterator<Item = (DocumentKind, String, String)>,
    ) -> Result<Self, DocumentError> {
        let mut docs = ReportDocuments::default();
        for (kind, text, origin) in texts {
            match kind {
                DocumentKind::Loops => docs.hierarchy = parse_doc(kind, &text, &origin)?,
                DocumentKind::OrderedBlocks => {
                    docs.ordered_blocks = parse_doc(kind, &text, &origin)?
                }
                DocumentKind::Timing => docs.timing = parse_doc(kind, &text, &origin)?,
                DocumentKind::Schedule => docs.schedule = parse_doc(kind, &text, &origin)?,
            }
            docs.raw.push(RawDocument { kind, text });
        }
        tracing::debug!(
            top_level_nodes = docs.hierarchy.children.len(),
            functions = docs.ordered_blocks.len(),
            timed_blocks = docs.timing.basicblocks.len(),
            scheduled_functions = docs.schedule.len(),
            "report documents parsed"
        );
        Ok(docs)
    }

    /// Raw input texts in `DocumentKind::ALL` order.
    pub fn raw(&self) -> &[RawDocument] {
        &self.raw
    }
}

fn parse_doc<T: DeserializeOwned + Default>(
    kind: DocumentKind,
    text: &str,
    origin: &str,
) -> Result<T, DocumentError> {
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(|source| DocumentError::Parse {
        kind,
        origin: origin.to_string(),
        source,
    })
}
