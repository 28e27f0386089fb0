//! `vendorsync-recon`: snapshot-based vendor reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded vendor records, returns classified
//! results and keeps the snapshot for the next run. No CLI or network IO.

pub mod audit;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod model;
pub mod register;

pub use audit::{LogObserver, ReconObserver};
pub use config::ReconConfig;
pub use engine::{load_csv_records, ReconEngine};
pub use error::{ReconError, RegistrationError};
pub use model::{ReconResult, Snapshot, VendorRecord, VendorStatus};
pub use register::{PlaceholderRegistrar, Registrar};
