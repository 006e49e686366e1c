use std::sync::{Arc, Mutex};
use std::time::Instant;

use arc_swap::ArcSwap;
use tracing::{debug, info, warn};

use crate::config::XrefConfig;
use crate::errors::{Result, XrefError};
use crate::graph::{ComponentResolver, Family, FuzzyMatcher, ResultAssembler, Snapshot};
use crate::normalize::normalize;
use crate::store::RecordStore;
use crate::types::{FuzzyMatch, PartRecord, RefreshResult, SearchResponse, SnapshotStats};

/// Central orchestrator: owns the published snapshot and answers searches.
///
/// Readers load the current snapshot without locking and keep using it for
/// the whole request. Refreshes build a new snapshot off to the side and
/// swap it in; at most one refresh runs at a time.
pub struct XrefEngine {
    store: Arc<dyn RecordStore>,
    config: XrefConfig,
    current: ArcSwap<Snapshot>,
    refresh_lock: Mutex<()>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl XrefEngine {
    /// Creates an engine with nothing published. Call [`refresh`](Self::refresh)
    /// before searching.
    pub fn new(store: Arc<dyn RecordStore>, config: XrefConfig) -> Self {
        Self {
            store,
            config,
            current: ArcSwap::from_pointee(Snapshot::empty()),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn from_store<S: RecordStore + 'static>(store: S, config: XrefConfig) -> Self {
        Self::new(Arc::new(store), config)
    }

    pub fn config(&self) -> &XrefConfig {
        &self.config
    }

    /// Returns the snapshot published at the moment of the call.
    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn stats(&self) -> SnapshotStats {
        self.current.load().stats()
    }

    /// Loads every record from the store and publishes a snapshot of them.
    ///
    /// On store failure the previously published snapshot stays in place and
    /// the error is returned as `StoreUnavailable`.
    pub fn refresh(&self) -> Result<RefreshResult> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let start = Instant::now();

        let records = self.store.all_records().map_err(|e| {
            warn!(error = %e, "refresh failed to load records");
            match e {
                XrefError::StoreUnavailable { .. } => e,
                other => XrefError::StoreUnavailable {
                    message: other.to_string(),
                },
            }
        })?;

        Ok(self.publish_locked(records, start))
    }

    /// Builds and publishes a snapshot from an explicit record set.
    pub fn publish(&self, records: Vec<PartRecord>) -> RefreshResult {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.publish_locked(records, Instant::now())
    }

    fn publish_locked(&self, records: Vec<PartRecord>, start: Instant) -> RefreshResult {
        let previous = self.current.load_full();
        let built = Snapshot::build(records);

        if previous.is_published() && previous.fingerprint() == built.fingerprint() {
            let stats = previous.stats();
            return RefreshResult {
                generation: stats.generation,
                record_count: stats.record_count,
                identifier_count: stats.identifier_count,
                edge_count: stats.edge_count,
                duration_ms: start.elapsed().as_millis() as u64,
                changed: false,
            };
        }

        let snapshot = built.with_generation(previous.generation() + 1);
        let stats = snapshot.stats();
        self.current.store(Arc::new(snapshot));

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            generation = stats.generation,
            records = stats.record_count,
            identifiers = stats.identifier_count,
            edges = stats.edge_count,
            duration_ms,
            "published snapshot"
        );

        RefreshResult {
            generation: stats.generation,
            record_count: stats.record_count,
            identifier_count: stats.identifier_count,
            edge_count: stats.edge_count,
            duration_ms,
            changed: true,
        }
    }

    fn published_snapshot(&self) -> Result<Arc<Snapshot>> {
        let snapshot = self.current_snapshot();
        if !snapshot.is_published() {
            return Err(XrefError::StoreUnavailable {
                message: "no snapshot has been published yet".to_string(),
            });
        }
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl XrefEngine {
    /// Searches for the records related to `text`.
    ///
    /// Exact mode returns the records of the family containing the normalized
    /// identifier; when the identifier is unknown and `fuzzy_fallback` is on,
    /// it falls through to fuzzy ranking. Fuzzy mode returns records in
    /// ranking order. Blank input yields an empty response.
    pub fn search(&self, text: &str, fuzzy: bool) -> Result<SearchResponse> {
        let id = normalize(text.trim());
        if id.is_empty() {
            return Ok(SearchResponse::default());
        }

        let snapshot = self.published_snapshot()?;
        let assembler = ResultAssembler::new(self.config.result_cap);

        if !fuzzy {
            let family = self.resolver(&snapshot).resolve(&id);
            if !family.is_empty() {
                let results = assembler.assemble_family(&snapshot, &family);
                debug!(
                    query = %id,
                    family = family.len(),
                    results = results.len(),
                    "exact search"
                );
                return Ok(SearchResponse::from_records(results));
            }
            if !self.config.fuzzy_fallback {
                debug!(query = %id, "exact search found no family");
                return Ok(SearchResponse::default());
            }
        }

        let matches = self.matcher().rank(&snapshot, &id);
        let results = assembler.assemble(&snapshot, matches.iter().map(|m| m.identifier.as_str()));
        debug!(
            query = %id,
            fuzzy,
            matches = matches.len(),
            results = results.len(),
            "fuzzy search"
        );
        Ok(SearchResponse::from_records(results))
    }

    /// Resolves the family of `text` in the current snapshot.
    ///
    /// Unknown or blank identifiers yield an empty family.
    pub fn family(&self, text: &str) -> Result<Family> {
        let id = normalize(text.trim());
        if id.is_empty() {
            return Ok(Family::empty());
        }
        let snapshot = self.published_snapshot()?;
        Ok(self.resolver(&snapshot).resolve(&id))
    }

    /// Ranks identifiers in the current snapshot against `text`.
    pub fn rank(&self, text: &str) -> Result<Vec<FuzzyMatch>> {
        let id = normalize(text.trim());
        if id.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = self.published_snapshot()?;
        Ok(self.matcher().rank(&snapshot, &id))
    }

    /// Looks `text` up directly in the record store, bypassing the snapshot.
    pub fn lookup(&self, text: &str) -> Result<Vec<PartRecord>> {
        self.store.by_identifier(text.trim(), self.config.result_cap)
    }

    fn resolver<'a>(&self, snapshot: &'a Snapshot) -> ComponentResolver<'a> {
        ComponentResolver::with_limit(snapshot, self.config.max_family_size)
    }

    fn matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(self.config.fuzzy_threshold, self.config.result_cap)
    }
}
