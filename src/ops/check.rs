//! Validate a unit declared in a Unit.toml.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::manifest::UnitManifest;
use crate::core::unit::ValidationReport;
use crate::util::config::Config;

/// Load the unit at `manifest_path` and run one validation pass over it.
///
/// Property values are finalized before the pass, as they would be before
/// the unit executes.
pub fn check_unit(manifest_path: &Path, config: &Config) -> Result<ValidationReport> {
    let manifest = UnitManifest::load(manifest_path)?;
    let base_dir = manifest_path
        .parent()
        .with_context(|| format!("manifest has no parent directory: {}", manifest_path.display()))?;

    let unit = manifest.to_unit(base_dir, config.max_nesting_depth())?;
    tracing::debug!(
        "Checking unit '{}' from {}",
        unit.name(),
        manifest_path.display()
    );

    unit.prepare();
    let report = unit.validate(&config.validation_settings());
    unit.cleanup();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::problem::ValidationProblemId;
    use crate::test_support::{full_unit_manifest, UnitFixture};

    #[test]
    fn test_check_valid_unit() {
        let fixture = UnitFixture::new(full_unit_manifest())
            .with_file("src/main.c", "int main(void) { return 0; }\n")
            .with_file("include/api.h", "");

        let report = check_unit(&fixture.manifest_path(), &Config::default()).unwrap();
        assert_eq!(report.unit, "compile");
        assert!(report.is_success(true));
    }

    #[test]
    fn test_check_parallel_from_config() {
        let fixture = UnitFixture::new(
            "[unit]\nname = \"u\"\n[properties.a]\n[properties.b]\nvalue = 1\n",
        );
        let mut config = Config::default();
        config.validation.parallel = Some(true);

        let report = check_unit(&fixture.manifest_path(), &config).unwrap();
        assert_eq!(report.problems.len(), 1);
        assert_eq!(report.problems[0].property, "a");
        assert_eq!(report.problems[0].id, ValidationProblemId::ValueNotSet);
    }

    #[test]
    fn test_check_invalid_manifest() {
        let fixture = UnitFixture::new("[unit]\n");
        let err = check_unit(&fixture.manifest_path(), &Config::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse manifest"));
    }
}
