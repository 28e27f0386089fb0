//! Audit trail for reconciliation runs.
//!
//! The engine returns a structured [`ReconResult`]; observers replay it
//! afterwards to produce whatever trail the host needs.

use crate::model::{ReconResult, VendorRecord};

pub trait ReconObserver {
    fn on_start(&mut self, _result: &ReconResult) {}
    fn on_record(&mut self, record: &VendorRecord);
    fn on_complete(&mut self, _result: &ReconResult) {}
}

/// Replay `result` through `observer` in output order.
pub fn emit(result: &ReconResult, observer: &mut dyn ReconObserver) {
    observer.on_start(result);
    for record in &result.records {
        observer.on_record(record);
    }
    observer.on_complete(result);
}

/// Audit line for a single classified record.
pub fn audit_line(record: &VendorRecord) -> String {
    match record.status {
        Some(status) => format!("Vendor {} is {}.", record.display_name, status),
        None => format!("Vendor {} is unclassified.", record.display_name),
    }
}

/// Writes the audit trail through the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReconObserver for LogObserver {
    fn on_start(&mut self, result: &ReconResult) {
        log::info!("Vendor comparator initialized ({})", result.meta.config_name);
    }

    fn on_record(&mut self, record: &VendorRecord) {
        log::info!("{}", audit_line(record));
    }

    fn on_complete(&mut self, result: &ReconResult) {
        for f in &result.failures {
            log::warn!("Vendor {} was not registered: {}", f.stable_id, f.message);
        }
        log::info!(
            "Vendor comparator completed: {} added, {} different, {} unchanged, {} missing",
            result.summary.added,
            result.summary.different,
            result.summary.unchanged,
            result.summary.missing,
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::model::{ReconMeta, ReconSummary, RegistrationFailure, VendorStatus};

    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
    }

    impl ReconObserver for Recorder {
        fn on_start(&mut self, _result: &ReconResult) {
            self.lines.push("start".into());
        }
        fn on_record(&mut self, record: &VendorRecord) {
            self.lines.push(audit_line(record));
        }
        fn on_complete(&mut self, _result: &ReconResult) {
            self.lines.push("done".into());
        }
    }

    fn result(records: Vec<VendorRecord>) -> ReconResult {
        ReconResult {
            meta: ReconMeta {
                config_name: "test".into(),
                engine_version: "0".into(),
                run_at: String::new(),
            },
            summary: ReconSummary::default(),
            records,
            failures: Vec::new(),
        }
    }

    #[test]
    fn emit_replays_in_order() {
        let records = vec![
            VendorRecord::new("2", "Beta", "").classified(VendorStatus::Missing, None),
            VendorRecord::new("1", "Alpha", "").classified(VendorStatus::Added, None),
        ];
        let mut rec = Recorder::default();
        emit(&result(records), &mut rec);
        assert_eq!(
            rec.lines,
            vec!["start", "Vendor Beta is Missing.", "Vendor Alpha is Added.", "done"]
        );
    }

    #[test]
    fn unclassified_line() {
        assert_eq!(
            audit_line(&VendorRecord::new("1", "Acme", "")),
            "Vendor Acme is unclassified."
        );
    }

    /// Collects every formatted log message; tests filter by their own names
    /// since the logger is process-wide.
    struct CaptureLogger {
        lines: Mutex<Vec<String>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut lines) = self.lines.lock() {
                lines.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: CaptureLogger = CaptureLogger {
        lines: Mutex::new(Vec::new()),
    };

    fn captured() -> Vec<String> {
        // Another test may already have installed it; both paths use CAPTURE.
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Info);
        CAPTURE.lines.lock().unwrap().clone()
    }

    #[test]
    fn log_observer_writes_audit_trail() {
        captured();
        let mut r = result(vec![
            VendorRecord::new("a1", "Audit Zeta", "").classified(VendorStatus::Missing, None),
            VendorRecord::new("a2", "Audit Eta", "").classified(VendorStatus::Added, None),
        ]);
        r.meta.config_name = "audit-trail".into();
        r.summary = ReconSummary {
            total: 2,
            added: 1,
            missing: 1,
            ..ReconSummary::default()
        };
        r.failures.push(RegistrationFailure {
            stable_id: "a2".into(),
            message: "registration failed: offline".into(),
        });

        emit(&r, &mut LogObserver);

        let lines = captured();
        let pos = |needle: &str| {
            lines
                .iter()
                .position(|l| l == needle)
                .unwrap_or_else(|| panic!("missing log line {needle:?} in {lines:?}"))
        };
        let start = pos("Vendor comparator initialized (audit-trail)");
        let zeta = pos("Vendor Audit Zeta is Missing.");
        let eta = pos("Vendor Audit Eta is Added.");
        let failed = pos("Vendor a2 was not registered: registration failed: offline");
        let done = pos(
            "Vendor comparator completed: 1 added, 0 different, 0 unchanged, 1 missing",
        );
        assert!(start < zeta && zeta < eta && eta < failed && failed < done);
    }
}
