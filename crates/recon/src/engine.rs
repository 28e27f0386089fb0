use std::sync::{Mutex, MutexGuard};

use crate::classify::{check_candidates, classify};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::model::{ReconMeta, ReconResult, Snapshot, VendorRecord};
use crate::register::{PlaceholderRegistrar, Registrar};

const DEFAULT_RUN_NAME: &str = "vendors";

struct EngineState {
    snapshot: Snapshot,
    registrar: Box<dyn Registrar + Send>,
}

/// Reconciles vendor batches against the previous run's snapshot.
///
/// Each call to [`reconcile`](Self::reconcile) holds the snapshot lock for
/// the whole read-classify-replace cycle, so concurrent callers are
/// serialized and never observe a half-written generation.
pub struct ReconEngine {
    name: String,
    state: Mutex<EngineState>,
}

impl ReconEngine {
    /// Engine with an empty snapshot and the placeholder registrar.
    pub fn new() -> Self {
        Self::with_registrar(PlaceholderRegistrar::default())
    }

    /// Engine that registers Added records through `registrar`.
    ///
    /// The registrar runs inside [`reconcile`](Self::reconcile) with the
    /// snapshot lock held; calling any method of this engine from it deadlocks.
    pub fn with_registrar(registrar: impl Registrar + Send + 'static) -> Self {
        Self {
            name: DEFAULT_RUN_NAME.to_string(),
            state: Mutex::new(EngineState {
                snapshot: Snapshot::new(),
                registrar: Box::new(registrar),
            }),
        }
    }

    pub fn from_config(config: &ReconConfig) -> Self {
        Self::with_registrar(PlaceholderRegistrar::new(config.registration.prefix.clone()))
            .named(config.name.clone())
    }

    /// Name reported in result metadata.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classify `candidates` against the current snapshot, then replace the
    /// snapshot with every non-Missing output record.
    ///
    /// A batch containing an empty or repeated stable id is rejected before
    /// anything is classified; the snapshot is left untouched.
    pub fn reconcile(&self, candidates: &[VendorRecord]) -> Result<ReconResult, ReconError> {
        let mut state = self.lock()?;
        let EngineState {
            snapshot,
            registrar,
        } = &mut *state;
        self.run(snapshot, candidates, &mut **registrar)
    }

    /// Like [`reconcile`](Self::reconcile), but registers Added records
    /// through `registrar` instead of the engine's own.
    pub fn reconcile_with(
        &self,
        candidates: &[VendorRecord],
        registrar: &mut dyn Registrar,
    ) -> Result<ReconResult, ReconError> {
        let mut state = self.lock()?;
        self.run(&mut state.snapshot, candidates, registrar)
    }

    /// Copy of the current snapshot, for hosts that persist it between runs.
    pub fn snapshot(&self) -> Result<Snapshot, ReconError> {
        Ok(self.lock()?.snapshot.clone())
    }

    /// Replace the snapshot wholesale, e.g. with a previously persisted one.
    ///
    /// Rejects snapshots that fail [`Snapshot::validate`], leaving the current
    /// one in place.
    pub fn restore(&self, snapshot: Snapshot) -> Result<(), ReconError> {
        snapshot.validate()?;
        let mut state = self.lock()?;
        log::debug!("restoring snapshot with {} vendor(s)", snapshot.len());
        state.snapshot = snapshot;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, ReconError> {
        Ok(self.lock()?.snapshot.len())
    }

    pub fn is_empty(&self) -> Result<bool, ReconError> {
        Ok(self.lock()?.snapshot.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, EngineState>, ReconError> {
        self.state.lock().map_err(|_| ReconError::SnapshotPoisoned)
    }

    fn run(
        &self,
        snapshot: &mut Snapshot,
        candidates: &[VendorRecord],
        registrar: &mut dyn Registrar,
    ) -> Result<ReconResult, ReconError> {
        if let Err(e) = check_candidates(candidates) {
            log::warn!("rejecting vendor batch: {e}");
            return Err(e);
        }
        log::debug!(
            "reconciling {} candidate(s) against {} known vendor(s)",
            candidates.len(),
            snapshot.len()
        );

        let classified = classify(snapshot, candidates, registrar);
        *snapshot = Snapshot::from_results(&classified.records);

        let mut summary = compute_summary(&classified.records);
        summary.registration_failures = classified.failures.len();
        log::debug!(
            "reconciled {} vendor(s), snapshot now holds {}",
            summary.total,
            snapshot.len()
        );

        Ok(ReconResult {
            meta: ReconMeta {
                config_name: self.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            records: classified.records,
            failures: classified.failures,
        })
    }
}

impl Default for ReconEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Load vendor rows from a CSV export, applying the configured column mapping.
///
/// The first row must be a header. Rows whose cells are all blank are skipped;
/// other rows pass through as-is, including empty names.
pub fn load_csv_records(
    csv_data: &str,
    config: &ReconConfig,
) -> Result<Vec<VendorRecord>, ReconError> {
    let trim = if config.input.trim {
        csv::Trim::All
    } else {
        csv::Trim::None
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(trim)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = &config.columns;

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReconError::MissingColumn {
                column: name.into(),
            })
    };

    let stable_id_idx = idx(&col.stable_id)?;
    let name_idx = idx(&col.display_name)?;
    let fax_idx = idx(&col.fax)?;

    let mut records = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        records.push(VendorRecord::new(
            record.get(stable_id_idx).unwrap_or(""),
            record.get(name_idx).unwrap_or(""),
            record.get(fax_idx).unwrap_or(""),
        ));
    }

    Ok(records)
}
