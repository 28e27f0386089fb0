use crate::model::{ReconSummary, VendorRecord, VendorStatus};

/// Compute summary statistics from classified records.
pub fn compute_summary(records: &[VendorRecord]) -> ReconSummary {
    let mut summary = ReconSummary {
        total: records.len(),
        ..ReconSummary::default()
    };

    for r in records {
        match r.status {
            Some(VendorStatus::Added) => summary.added += 1,
            Some(VendorStatus::Missing) => summary.missing += 1,
            Some(VendorStatus::Different) => summary.different += 1,
            Some(VendorStatus::Unchanged) => summary.unchanged += 1,
            None => {}
        }
    }

    summary
}
