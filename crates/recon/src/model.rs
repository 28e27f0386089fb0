use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A single vendor, either as supplied by an input adapter or as classified
/// by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRecord {
    /// External business key. Unique among live records.
    pub stable_id: String,
    pub display_name: String,
    /// Carried through unchanged, never compared.
    pub fax: String,
    /// Assigned by the downstream system once a record is first accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    /// Only meaningful on engine output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VendorStatus>,
}

impl VendorRecord {
    pub fn new(
        stable_id: impl Into<String>,
        display_name: impl Into<String>,
        fax: impl Into<String>,
    ) -> Self {
        Self {
            stable_id: stable_id.into(),
            display_name: display_name.into(),
            fax: fax.into(),
            tracking_id: None,
            status: None,
        }
    }

    /// Copy of this record's descriptive fields with the given classification.
    pub(crate) fn classified(&self, status: VendorStatus, tracking_id: Option<String>) -> Self {
        Self {
            stable_id: self.stable_id.clone(),
            display_name: self.display_name.clone(),
            fax: self.fax.clone(),
            tracking_id,
            status: Some(status),
        }
    }
}

impl fmt::Display for VendorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, Fax: {}, TrackingId: {}, StableId: {}, Status: {}",
            self.display_name,
            self.fax,
            self.tracking_id.as_deref().unwrap_or(""),
            self.stable_id,
            self.status.map(|s| s.to_string()).unwrap_or_default(),
        )
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Added,
    Missing,
    Different,
    Unchanged,
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "Added"),
            Self::Missing => write!(f, "Missing"),
            Self::Different => write!(f, "Different"),
            Self::Unchanged => write!(f, "Unchanged"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The engine's belief about currently-live vendors, keyed by stable id.
///
/// Iteration follows insertion order, which is the order the records were
/// emitted by the reconciliation that produced this generation.
///
/// Serialized as a map from stable id to record. Deserialization goes through
/// [`Snapshot::validate`], so a persisted generation whose keys disagree with
/// their records, or which still holds Missing entries, is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IndexMap<String, VendorRecord>")]
pub struct Snapshot {
    entries: IndexMap<String, VendorRecord>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the next generation from classified output, dropping Missing records.
    pub fn from_results(records: &[VendorRecord]) -> Self {
        let entries = records
            .iter()
            .filter(|r| r.status != Some(VendorStatus::Missing))
            .map(|r| (r.stable_id.clone(), r.clone()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, stable_id: &str) -> Option<&VendorRecord> {
        self.entries.get(stable_id)
    }

    pub fn contains(&self, stable_id: &str) -> bool {
        self.entries.contains_key(stable_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VendorRecord> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every key is non-empty and equal to its record's stable id, and no
    /// record is marked Missing.
    pub fn validate(&self) -> Result<(), ReconError> {
        for (key, record) in &self.entries {
            if key.is_empty() {
                return Err(ReconError::InvalidSnapshot("entry with empty stable id".into()));
            }
            if *key != record.stable_id {
                return Err(ReconError::InvalidSnapshot(format!(
                    "key '{key}' holds record with stable id '{}'",
                    record.stable_id
                )));
            }
            if record.status == Some(VendorStatus::Missing) {
                return Err(ReconError::InvalidSnapshot(format!(
                    "entry '{key}' is marked missing"
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<IndexMap<String, VendorRecord>> for Snapshot {
    type Error = ReconError;

    fn try_from(entries: IndexMap<String, VendorRecord>) -> Result<Self, Self::Error> {
        let snapshot = Self { entries };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl FromIterator<VendorRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = VendorRecord>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|r| (r.stable_id.clone(), r))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub added: usize,
    pub missing: usize,
    pub different: usize,
    pub unchanged: usize,
    pub registration_failures: usize,
}

/// A downstream registration that did not produce a tracking id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationFailure {
    pub stable_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub records: Vec<VendorRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RegistrationFailure>,
}

impl ReconResult {
    pub fn by_status(&self, status: VendorStatus) -> impl Iterator<Item = &VendorRecord> {
        self.records.iter().filter(move |r| r.status == Some(status))
    }

    pub fn find(&self, stable_id: &str) -> Option<&VendorRecord> {
        self.records.iter().find(|r| r.stable_id == stable_id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}
