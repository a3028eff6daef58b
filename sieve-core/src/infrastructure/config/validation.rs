// sieve-core/src/infrastructure/config/validation.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value as Yaml;
use tracing::{info, instrument};

use crate::domain::expectation::naming::canonical_name;
use crate::domain::expectation::{ExpectationDecl, ExpectationKind};
use crate::domain::file_check::FileCheck;
use crate::infrastructure::config::settings::QuarantineSettings;
use crate::infrastructure::error::InfrastructureError;

/// Everything one validation run is configured with.
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    pub file_checks: Vec<FileCheck>,
    pub expectations: Vec<ExpectationDecl>,
    pub quarantine: QuarantineSettings,
}

impl ValidationConfig {
    pub fn expectation_kinds(&self) -> Vec<ExpectationKind> {
        self.expectations.iter().map(|d| d.kind.clone()).collect()
    }
}

#[derive(Deserialize)]
struct RawValidationConfig {
    #[serde(default)]
    file_validation: Vec<FileCheck>,
    // Kept untyped: `action` is popped and `name` normalised before typing.
    #[serde(default)]
    expectations: Vec<Yaml>,
    #[serde(default)]
    quarantine: QuarantineSettings,
}

#[instrument]
pub fn load_validation_config(path: &Path) -> Result<ValidationConfig, InfrastructureError> {
    if !path.exists() {
        return Err(InfrastructureError::ConfigNotFound(
            path.display().to_string(),
        ));
    }
    info!(path = ?path, "Loading validation config");
    let content = fs::read_to_string(path)?;
    let mut config = parse_validation_config(&content)?;

    config.quarantine.apply_env_overrides();
    config.quarantine.check()?;

    info!(
        file_checks = config.file_checks.len(),
        expectations = config.expectations.len(),
        "Validation config loaded"
    );
    Ok(config)
}

/// Parses the YAML document without touching the environment.
pub fn parse_validation_config(content: &str) -> Result<ValidationConfig, InfrastructureError> {
    let raw: RawValidationConfig = serde_yaml::from_str(content)?;
    let expectations = raw
        .expectations
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_expectation(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidationConfig {
        file_checks: raw.file_validation,
        expectations,
        quarantine: raw.quarantine,
    })
}

fn parse_expectation(index: usize, entry: Yaml) -> Result<ExpectationDecl, InfrastructureError> {
    let Yaml::Mapping(mut map) = entry else {
        return Err(InfrastructureError::ConfigError(format!(
            "expectations[{index}] must be a mapping"
        )));
    };

    let action = match map.remove("action") {
        None | Some(Yaml::Null) => None,
        Some(Yaml::String(s)) => Some(s),
        // Non-string actions are kept verbatim; they never match a known action.
        Some(other) => Some(serde_yaml::to_string(&other)?.trim().to_string()),
    };

    let canonical = match map.get("name") {
        Some(Yaml::String(raw)) => canonical_name(raw),
        _ => {
            return Err(InfrastructureError::ConfigError(format!(
                "expectations[{index}] has no 'name'"
            )));
        }
    };
    map.insert(Yaml::from("name"), Yaml::from(canonical.as_str()));

    let kind: ExpectationKind = serde_yaml::from_value(Yaml::Mapping(map)).map_err(|e| {
        InfrastructureError::ConfigError(format!("expectations[{index}] ({canonical}): {e}"))
    })?;
    kind.validate().map_err(|e| {
        InfrastructureError::ConfigError(format!("expectations[{index}]: {e}"))
    })?;

    Ok(ExpectationDecl { kind, action })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::TargetColumn;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
file_validation:
  - name: ValidateFileFormat
    allowed_extensions: [".csv"]
  - name: ValidateFileSize
    max_size_mb: 5
expectations:
  - name: ExpectColumnValuesToNotBeNull
    column: MMSI
    action: skip
  - name: expect_column_values_to_be_unique
    column: MMSI
    action: failure
  - name: ExpectColumnValuesToBeBetween
    column: Latitude
    min: -90
    max: 90
"#;

    #[test]
    fn test_parse_full_config() -> Result<()> {
        let config = parse_validation_config(CONFIG)?;
        assert_eq!(config.file_checks.len(), 2);
        assert_eq!(config.expectations.len(), 3);

        let unique = &config.expectations[1];
        assert_eq!(unique.kind.name(), "ExpectColumnValuesToBeUnique");
        assert_eq!(unique.kind.target(), TargetColumn::column("MMSI"));
        assert_eq!(unique.action.as_deref(), Some("failure"));
        assert!(config.expectations[2].action.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_expectation_names_the_entry() {
        let yaml = "expectations:\n  - name: ExpectColumnValuesToNotBeNull\n    column: a\n  - name: ExpectMagic\n    column: b\n";
        let err = parse_validation_config(yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("expectations[1]"), "{msg}");
        assert!(msg.contains("ExpectMagic"), "{msg}");
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = parse_validation_config("expectations:\n  - column: a\n").unwrap_err();
        assert!(err.to_string().contains("has no 'name'"));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let yaml = "expectations:\n  - name: ExpectColumnMeanToBeBetween\n    column: a\n    min: 5\n    max: 1\n";
        assert!(parse_validation_config(yaml).is_err());
    }

    #[test]
    fn test_unrecognised_action_is_kept_raw() -> Result<()> {
        let yaml = "expectations:\n  - name: ExpectColumnToExist\n    column: a\n    action: quarantine\n  - name: ExpectColumnToExist\n    column: b\n    action: 3\n";
        let config = parse_validation_config(yaml)?;
        assert_eq!(config.expectations[0].action.as_deref(), Some("quarantine"));
        assert_eq!(config.expectations[1].action.as_deref(), Some("3"));
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(CONFIG.as_bytes())?;
        let config = load_validation_config(file.path())?;
        assert_eq!(config.expectation_kinds().len(), 3);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_config_not_found() {
        let err = load_validation_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }
}
