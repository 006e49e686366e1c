use std::collections::HashSet;

use super::snapshot::Snapshot;
use super::traversal::Family;
use crate::types::PartRecord;

/// Maps identifiers back to the records indexed under them.
///
/// A record indexed under both of its identifiers is returned once. Records
/// are deduplicated by their position in the snapshot, never by content, so
/// two distinct rows with identical text both survive.
#[derive(Debug, Clone, Copy)]
pub struct ResultAssembler {
    cap: usize,
}

impl ResultAssembler {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    /// Collects records for `identifiers` in the order given, stopping at the
    /// cap. Used for ranked input, where earlier identifiers matter more.
    pub fn assemble<'a, I>(&self, snapshot: &Snapshot, identifiers: I) -> Vec<PartRecord>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: HashSet<usize> = HashSet::new();
        let mut records = Vec::new();

        'outer: for id in identifiers {
            for &position in snapshot.positions_for(id) {
                if records.len() >= self.cap {
                    break 'outer;
                }
                if !seen.insert(position) {
                    continue;
                }
                if let Some(record) = snapshot.record(position) {
                    records.push(record.clone());
                }
            }
        }
        records
    }

    /// Collects the records of a whole family.
    ///
    /// Families carry no ranking, so records come back in store order, which
    /// keeps truncation deterministic regardless of traversal order.
    pub fn assemble_family(&self, snapshot: &Snapshot, family: &Family) -> Vec<PartRecord> {
        let mut positions: Vec<usize> = family
            .iter()
            .flat_map(|id| snapshot.positions_for(id).iter().copied())
            .collect::<HashSet<usize>>()
            .into_iter()
            .collect();
        positions.sort_unstable();
        positions.truncate(self.cap);

        positions
            .into_iter()
            .filter_map(|position| snapshot.record(position).cloned())
            .collect()
    }
}
