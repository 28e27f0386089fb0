use std::path::Path;

use serde::Deserialize;

use crate::error::ReconError;
use crate::register::DEFAULT_TRACKING_PREFIX;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub input: InputConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Header names of the vendor export.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub stable_id: String,
    pub display_name: String,
    pub fax: String,
}

// ---------------------------------------------------------------------------
// Registration + Input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// Prefix for placeholder tracking ids.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_TRACKING_PREFIX.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Strip surrounding whitespace from every cell.
    #[serde(default = "default_trim")]
    pub trim: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { trim: true }
    }
}

fn default_trim() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReconError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        let cols = [
            ("stable_id", &self.columns.stable_id),
            ("display_name", &self.columns.display_name),
            ("fax", &self.columns.fax),
        ];
        for (field, header) in &cols {
            if header.is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }
        for (i, (a_field, a)) in cols.iter().enumerate() {
            for (b_field, b) in &cols[i + 1..] {
                if a == b {
                    return Err(ReconError::ConfigValidation(format!(
                        "columns.{a_field} and columns.{b_field} both map to '{a}'"
                    )));
                }
            }
        }

        if self.registration.prefix.is_empty() {
            return Err(ReconError::ConfigValidation(
                "registration.prefix must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Vendors"

[columns]
stable_id    = "CompanyID"
display_name = "Name"
fax          = "Fax"
"#;

    #[test]
    fn parse_valid_with_defaults() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Vendors");
        assert_eq!(config.columns.stable_id, "CompanyID");
        assert_eq!(config.registration.prefix, "QB_");
        assert!(config.input.trim);
    }

    #[test]
    fn parse_registration_and_input() {
        let input = format!(
            r#"{VALID}

[registration]
prefix = "V-"

[input]
trim = false
"#
        );
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.registration.prefix, "V-");
        assert!(!config.input.trim);
    }

    #[test]
    fn reject_missing_columns_table() {
        let err = ReconConfig::from_toml("name = \"Vendors\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_empty_name() {
        let input = VALID.replace("\"Vendors\"", "\"  \"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("name must not be empty"));
    }

    #[test]
    fn reject_clashing_columns() {
        let input = VALID.replace("\"Fax\"", "\"Name\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("both map to 'Name'"));
    }

    #[test]
    fn reject_empty_prefix() {
        let input = format!("{VALID}\n[registration]\nprefix = \"\"\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("registration.prefix"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vendors.recon.toml");
        std::fs::write(&path, VALID).unwrap();
        let config = ReconConfig::from_file(&path).unwrap();
        assert_eq!(config.columns.fax, "Fax");

        let err = ReconConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ReconError::Io(_)));
    }
}
