/// Link graph, record index, and immutable snapshots.
pub mod snapshot;

/// Family (connected component) discovery.
pub mod traversal;

/// Tiered fuzzy ranking over identifiers.
pub mod fuzzy;

/// Mapping identifiers back to records.
pub mod assemble;

pub use assemble::ResultAssembler;
pub use fuzzy::FuzzyMatcher;
pub use snapshot::{records_fingerprint, LinkGraph, Snapshot};
pub use traversal::{ComponentResolver, Family};
