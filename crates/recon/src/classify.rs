use std::collections::HashSet;

use crate::error::{ReconError, RegistrationError};
use crate::model::{RegistrationFailure, Snapshot, VendorRecord, VendorStatus};
use crate::register::Registrar;

/// Output of a single classification pass.
#[derive(Debug, Default)]
pub struct Classified {
    pub records: Vec<VendorRecord>,
    pub failures: Vec<RegistrationFailure>,
}

/// Reject batches the comparison cannot classify unambiguously.
pub fn check_candidates(candidates: &[VendorRecord]) -> Result<(), ReconError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
    for (position, c) in candidates.iter().enumerate() {
        if c.stable_id.is_empty() {
            return Err(ReconError::EmptyStableId { position });
        }
        if !seen.insert(c.stable_id.as_str()) {
            return Err(ReconError::DuplicateStableId {
                stable_id: c.stable_id.clone(),
            });
        }
    }
    Ok(())
}

/// Classify `candidates` against `snapshot`.
///
/// Missing records come first in snapshot order, followed by one record per
/// candidate in input order. `registrar` is invoked once per Added record; a
/// failed registration leaves `tracking_id` unset and is collected rather
/// than aborting the batch.
///
/// Callers must run [`check_candidates`] first.
pub fn classify(
    snapshot: &Snapshot,
    candidates: &[VendorRecord],
    registrar: &mut dyn Registrar,
) -> Classified {
    let candidate_ids: HashSet<&str> = candidates.iter().map(|c| c.stable_id.as_str()).collect();
    let mut out = Classified {
        records: Vec::with_capacity(snapshot.len() + candidates.len()),
        failures: Vec::new(),
    };

    for last in snapshot.iter() {
        if !candidate_ids.contains(last.stable_id.as_str()) {
            out.records
                .push(last.classified(VendorStatus::Missing, last.tracking_id.clone()));
        }
    }

    for candidate in candidates {
        let record = match snapshot.get(&candidate.stable_id) {
            Some(last) => {
                // Only the name participates in change detection.
                let status = if last.display_name == candidate.display_name {
                    VendorStatus::Unchanged
                } else {
                    VendorStatus::Different
                };
                candidate.classified(status, last.tracking_id.clone())
            }
            None => {
                let registered = match registrar.register(candidate) {
                    Ok(id) if id.is_empty() => Err(RegistrationError::new(
                        "registrar returned an empty tracking id",
                    )),
                    other => other,
                };
                let tracking_id = match registered {
                    Ok(id) => Some(id),
                    Err(e) => {
                        log::warn!("registration of vendor '{}' failed: {e}", candidate.stable_id);
                        out.failures.push(RegistrationFailure {
                            stable_id: candidate.stable_id.clone(),
                            message: e.to_string(),
                        });
                        None
                    }
                };
                candidate.classified(VendorStatus::Added, tracking_id)
            }
        };
        out.records.push(record);
    }

    out
}
