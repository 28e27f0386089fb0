//! Downstream registration of newly added vendors.
//!
//! The engine calls a [`Registrar`] once for every record it classifies as
//! Added and stores the returned tracking id on the output record. Hosts that
//! talk to a real accounting system provide their own implementation; the
//! [`PlaceholderRegistrar`] stands in when no such system is wired up.

use crate::error::RegistrationError;
use crate::model::VendorRecord;

pub const DEFAULT_TRACKING_PREFIX: &str = "QB_";

/// Called while the engine holds its snapshot lock: an implementation must
/// not call back into the same [`crate::ReconEngine`], or it will deadlock.
pub trait Registrar {
    /// Register `record` downstream and return its tracking id. An empty id
    /// is treated as a failed registration.
    fn register(&mut self, record: &VendorRecord) -> Result<String, RegistrationError>;
}

impl<F> Registrar for F
where
    F: FnMut(&VendorRecord) -> Result<String, RegistrationError>,
{
    fn register(&mut self, record: &VendorRecord) -> Result<String, RegistrationError> {
        self(record)
    }
}

/// Synthesizes `<prefix><stable_id>` without contacting anything.
#[derive(Debug, Clone)]
pub struct PlaceholderRegistrar {
    prefix: String,
}

impl PlaceholderRegistrar {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for PlaceholderRegistrar {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKING_PREFIX)
    }
}

impl Registrar for PlaceholderRegistrar {
    fn register(&mut self, record: &VendorRecord) -> Result<String, RegistrationError> {
        Ok(format!("{}{}", self.prefix, record.stable_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_uses_prefix() {
        let rec = VendorRecord::new("10000", "Acme", "");
        assert_eq!(PlaceholderRegistrar::default().register(&rec).unwrap(), "QB_10000");
        assert_eq!(PlaceholderRegistrar::new("V-").register(&rec).unwrap(), "V-10000");
    }

    #[test]
    fn closures_are_registrars() {
        let mut calls = 0;
        let mut reg = |r: &VendorRecord| {
            calls += 1;
            if r.display_name.is_empty() {
                Err(RegistrationError::new("name required"))
            } else {
                Ok(format!("LIST-{calls}"))
            }
        };
        assert_eq!(reg.register(&VendorRecord::new("1", "A", "")).unwrap(), "LIST-1");
        assert!(reg.register(&VendorRecord::new("2", "", "")).is_err());
    }
}
