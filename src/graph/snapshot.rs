use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::fuzzy::{trigrams, Trigram};
use crate::normalize::normalize_field;
use crate::types::{PartRecord, SnapshotStats};

/// Computes a SHA-256 fingerprint of a record set.
///
/// Field order and presence both feed the hash, so an absent field and an
/// empty one fingerprint differently.
pub fn records_fingerprint(records: &[PartRecord]) -> String {
    let mut hasher = Sha256::new();
    for record in records {
        for field in [
            &record.reference_number,
            &record.make,
            &record.part_number,
            &record.company,
            &record.description,
        ] {
            match field {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update((value.len() as u64).to_le_bytes());
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
    }
    hex::encode(hasher.finalize())
}

/// Undirected adjacency map between normalized identifiers.
///
/// Edges are only ever inserted in pairs, so the map stays symmetric: if `b`
/// is a neighbor of `a` then `a` is a neighbor of `b`.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    adjacency: HashMap<String, HashSet<String>>,
    edge_count: usize,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the undirected edge `{a, b}`.
    ///
    /// Returns `true` if the edge was not already present. Self-links are
    /// ignored and return `false`.
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        let inserted = self
            .adjacency
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.adjacency
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
        if inserted {
            self.edge_count += 1;
        }
        inserted
    }

    /// Iterates over the neighbors of `id`. Unknown identifiers have none.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Returns `true` if `id` takes part in at least one edge.
    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Number of distinct undirected edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// An immutable view of the record set: the link graph plus an index from
/// identifier to the records carrying it.
///
/// Snapshots are built off to the side and then published whole; nothing
/// mutates a snapshot once it has been built.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    generation: u64,
    records: Vec<PartRecord>,
    /// Identifier -> positions in `records`, in first-seen order.
    index: IndexMap<String, Vec<usize>>,
    /// Trigram set of each identifier, aligned with `index`.
    shingles: Vec<HashSet<Trigram>>,
    graph: LinkGraph,
    fingerprint: String,
}

impl Snapshot {
    /// The unpublished placeholder held before the first refresh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot in a single pass over `records`.
    ///
    /// Each record's part number and reference number are normalized. When
    /// both are non-empty the pair becomes an edge; either way the record is
    /// indexed under every non-empty identifier it carries.
    pub fn build(records: Vec<PartRecord>) -> Self {
        let fingerprint = records_fingerprint(&records);
        let mut index: IndexMap<String, Vec<usize>> = IndexMap::new();
        let mut graph = LinkGraph::new();

        for (position, record) in records.iter().enumerate() {
            let part = normalize_field(record.part_number.as_deref());
            let reference = normalize_field(record.reference_number.as_deref());

            if let (Some(a), Some(b)) = (&part, &reference) {
                graph.add_edge(a, b);
            }

            for id in [part, reference].into_iter().flatten() {
                let positions = index.entry(id).or_default();
                // A record whose two fields normalize alike is indexed once.
                if positions.last() != Some(&position) {
                    positions.push(position);
                }
            }
        }

        let shingles = index.keys().map(|id| trigrams(id)).collect();

        Snapshot {
            generation: 0,
            records,
            index,
            shingles,
            graph,
            fingerprint,
        }
    }

    /// Stamps the snapshot with the generation it is published under.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Generation number; 0 means the snapshot was never published.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_published(&self) -> bool {
        self.generation > 0
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn record(&self, position: usize) -> Option<&PartRecord> {
        self.records.get(position)
    }

    /// Positions of the records indexed under `id`.
    pub fn positions_for(&self, id: &str) -> &[usize] {
        self.index.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_identifier(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every indexed identifier in first-seen order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Every indexed identifier with its trigram set, in first-seen order.
    pub fn identifier_trigrams(&self) -> impl Iterator<Item = (&str, &HashSet<Trigram>)> {
        self.identifiers().zip(&self.shingles)
    }

    pub fn identifier_count(&self) -> usize {
        self.index.len()
    }

    /// SHA-256 fingerprint of the record set this snapshot was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            generation: self.generation,
            record_count: self.records.len(),
            identifier_count: self.index.len(),
            edge_count: self.graph.edge_count(),
            fingerprint: self.fingerprint.clone(),
            db_size_bytes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        let records = vec![PartRecord::link("A1", "B2")];
        assert_eq!(records_fingerprint(&records), records_fingerprint(&records));
    }

    #[test]
    fn fingerprint_distinguishes_absent_from_empty() {
        let absent = vec![PartRecord::default()];
        let empty = vec![PartRecord {
            make: Some(String::new()),
            ..PartRecord::default()
        }];
        assert_ne!(records_fingerprint(&absent), records_fingerprint(&empty));
    }

    #[test]
    fn trigrams_follow_identifier_order() {
        let snapshot = Snapshot::build(vec![PartRecord::link("R1", "P1")]);
        let ids: Vec<&str> = snapshot.identifier_trigrams().map(|(id, _)| id).collect();
        assert_eq!(ids, ["P1", "R1"]);
        for (id, set) in snapshot.identifier_trigrams() {
            assert_eq!(set, &trigrams(id));
        }
    }
}
