use serde::{Deserialize, Serialize};

/// A single cross-reference row as supplied by the record store.
///
/// Every field is optional; a record with both `part_number` and
/// `reference_number` links the two identifiers in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    pub reference_number: Option<String>,
    pub make: Option<String>,
    pub part_number: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
}

impl PartRecord {
    /// Creates a record with only the two linking fields set.
    pub fn link(reference_number: &str, part_number: &str) -> Self {
        PartRecord {
            reference_number: Some(reference_number.to_string()),
            part_number: Some(part_number.to_string()),
            ..PartRecord::default()
        }
    }
}

/// Fuzzy-match tier. Lower tiers rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelevanceGroup {
    Exact = 1,
    Partial = 2,
    Fuzzy = 3,
}

impl RelevanceGroup {
    /// Returns the numeric tier (1 exact, 2 partial, 3 fuzzy).
    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// An identifier ranked by the fuzzy matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatch {
    pub identifier: String,
    pub group: RelevanceGroup,
    pub similarity: f32,
}

/// Search parameters as received from the HTTP layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub fuzzy: Option<String>,
}

impl SearchRequest {
    /// Only the literal `true` enables fuzzy mode.
    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy.as_deref() == Some("true")
    }
}

/// Body returned for a successful search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<PartRecord>,
}

impl SearchResponse {
    pub fn from_records(results: Vec<PartRecord>) -> Self {
        SearchResponse {
            count: results.len(),
            results,
        }
    }
}

/// Body returned when a request fails on the server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Counts describing a published snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub generation: u64,
    pub record_count: usize,
    pub identifier_count: usize,
    pub edge_count: usize,
    pub fingerprint: String,
    /// On-disk size of the backing database, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_size_bytes: Option<u64>,
}

/// Result of a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResult {
    /// Generation of the snapshot published by this refresh.
    pub generation: u64,
    pub record_count: usize,
    pub identifier_count: usize,
    pub edge_count: usize,
    /// Time taken in milliseconds.
    pub duration_ms: u64,
    /// Whether the record set differs from the previously published one.
    pub changed: bool,
}
