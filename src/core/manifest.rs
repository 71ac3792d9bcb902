//! Unit.toml manifest parsing.
//!
//! A unit manifest declares a build unit and its properties:
//!
//! ```toml
//! [unit]
//! name = "jar"
//!
//! [properties.outputFile]
//! kind = "file"
//! value = "build/app.jar"
//!
//! [properties.token]
//! kind = "string"
//! env = "DEPLOY_TOKEN"
//! optional = true
//! ```
//!
//! Literal values become assignable properties. `env` values are read from
//! the environment and count as calculated.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::core::action::{
    InputDirectory, InputFile, MatchesPattern, NoValidation, NonEmptyList, NonEmptyString,
    ReportUnresolvable, ValidationAction,
};
use crate::core::deferred::DeferredValue;
use crate::core::problem::Severity;
use crate::core::property::ValidatingProperty;
use crate::core::property_value::StaticValue;
use crate::core::provider::{EnvVar, Property};
use crate::core::unit::BuildUnit;
use crate::core::value::Value;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Unit.toml";

/// The `[unit]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitSection {
    pub name: String,
}

/// What rule a property's value must satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Presence only
    #[default]
    Any,
    String,
    List,
    Pattern,
    File,
    Directory,
}

/// One `[properties.<name>]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    #[serde(default)]
    pub kind: PropertyKind,

    #[serde(default)]
    pub optional: bool,

    /// Literal value
    pub value: Option<Value>,

    /// Environment variable supplying the value
    pub env: Option<String>,

    /// Value used when no literal value is assigned
    pub default: Option<Value>,

    /// Regular expression for `kind = "pattern"`
    pub pattern: Option<String>,

    /// Severity of rule violations (default: error)
    pub severity: Option<Severity>,
}

/// A parsed Unit.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitManifest {
    pub unit: UnitSection,

    /// Declared properties, validated in name order
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
}

impl UnitManifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest content.
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: UnitManifest = toml::from_str(contents)?;
        if manifest.unit.name.trim().is_empty() {
            bail!("unit name must not be empty");
        }
        Ok(manifest)
    }

    /// Build the unit. Relative paths resolve against `base_dir`.
    pub fn to_unit(&self, base_dir: &Path, max_nesting_depth: usize) -> Result<BuildUnit> {
        let mut unit = BuildUnit::new(&self.unit.name);
        for (name, spec) in &self.properties {
            let property = spec
                .to_property(name, base_dir)
                .with_context(|| format!("invalid property `{}`", name))?;
            unit.add_property(property.with_max_nesting_depth(max_nesting_depth));
        }
        Ok(unit)
    }
}

impl PropertySpec {
    fn to_property(&self, name: &str, base_dir: &Path) -> Result<ValidatingProperty> {
        if name.trim().is_empty() {
            bail!("property name must not be empty");
        }

        let value = self.deferred_value()?;
        let action = self.action(base_dir)?;
        Ok(ValidatingProperty::new(
            name,
            StaticValue::new(value),
            self.optional,
            action,
        ))
    }

    fn deferred_value(&self) -> Result<DeferredValue> {
        match (&self.value, &self.env) {
            (Some(_), Some(_)) => bail!("`value` and `env` cannot both be set"),
            (None, Some(var)) => {
                if self.default.is_some() {
                    bail!("`default` cannot be combined with `env`");
                }
                Ok(DeferredValue::provider(EnvVar::new(var)))
            }
            (value, None) => {
                let property = Property::new();
                if let Some(v) = value {
                    property.set(v.clone())?;
                }
                if let Some(d) = &self.default {
                    property.convention(d.clone())?;
                }
                Ok(DeferredValue::provider(property))
            }
        }
    }

    fn action(&self, base_dir: &Path) -> Result<Arc<dyn ValidationAction>> {
        let severity = self.severity.unwrap_or(Severity::Error);
        if self.pattern.is_some() && self.kind != PropertyKind::Pattern {
            bail!("`pattern` is only allowed for kind = \"pattern\"");
        }

        let action: Arc<dyn ValidationAction> = match self.kind {
            PropertyKind::Any => Arc::new(NoValidation),
            PropertyKind::String => {
                Arc::new(ReportUnresolvable::new(NonEmptyString::new(severity)))
            }
            PropertyKind::List => Arc::new(ReportUnresolvable::new(NonEmptyList::new(severity))),
            PropertyKind::Pattern => {
                let Some(pattern) = &self.pattern else {
                    bail!("kind = \"pattern\" requires a `pattern`");
                };
                let regex = Regex::new(pattern)
                    .with_context(|| format!("invalid pattern `{}`", pattern))?;
                Arc::new(ReportUnresolvable::new(MatchesPattern::new(regex, severity)))
            }
            PropertyKind::File => {
                Arc::new(ReportUnresolvable::new(InputFile::relative_to(base_dir)))
            }
            PropertyKind::Directory => {
                Arc::new(ReportUnresolvable::new(InputDirectory::relative_to(base_dir)))
            }
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deferred::DEFAULT_MAX_NESTING_DEPTH;
    use crate::core::problem::ValidationProblemId;
    use crate::core::unit::ValidationSettings;
    use crate::test_support::{full_unit_manifest, UnitFixture};

    fn validate(manifest: &str, base: &Path) -> crate::core::unit::ValidationReport {
        UnitManifest::parse(manifest)
            .unwrap()
            .to_unit(base, DEFAULT_MAX_NESTING_DEPTH)
            .unwrap()
            .validate(&ValidationSettings::default())
    }

    #[test]
    fn test_parse_full_manifest() {
        let manifest = UnitManifest::parse(full_unit_manifest()).unwrap();
        assert_eq!(manifest.unit.name, "compile");
        assert_eq!(manifest.properties.len(), 5);
        assert_eq!(manifest.properties["label"].kind, PropertyKind::Pattern);
        assert!(manifest.properties["description"].optional);
    }

    #[test]
    fn test_full_manifest_valid_when_inputs_exist() {
        let fixture = UnitFixture::new(full_unit_manifest())
            .with_file("src/main.c", "int main(void) { return 0; }\n")
            .with_file("include/.keep", "");

        let report = validate(full_unit_manifest(), fixture.root());
        assert!(report.problems.is_empty(), "{:?}", report.problems);
        assert!(report.is_success(true));
    }

    #[test]
    fn test_full_manifest_reports_missing_inputs() {
        let fixture = UnitFixture::new(full_unit_manifest());

        let report = validate(full_unit_manifest(), fixture.root());
        let ids: Vec<_> = report.problems.iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![
                ValidationProblemId::InputFileDoesNotExist,
                ValidationProblemId::InputFileDoesNotExist,
            ]
        );
    }

    #[test]
    fn test_missing_literal_suggests_assigning() {
        let report = validate(
            "[unit]\nname = \"u\"\n[properties.outputFile]\nkind = \"string\"\n",
            Path::new("."),
        );
        assert_eq!(
            report.problems[0].solutions()[0],
            "Assign a value to 'outputFile'"
        );
    }

    #[test]
    fn test_missing_env_suggests_calculation() {
        let report = validate(
            r#"[unit]
name = "u"
[properties.outputFile]
env = "PROPCHECK_TEST_SURELY_UNSET_VARIABLE"
"#,
            Path::new("."),
        );
        assert_eq!(report.problems[0].id, ValidationProblemId::ValueNotSet);
        assert_eq!(
            report.problems[0].solutions()[0],
            "The value of 'outputFile' is calculated, make sure a valid value can be calculated"
        );
    }

    #[test]
    fn test_default_value_counts_as_present() {
        let report = validate(
            "[unit]\nname = \"u\"\n[properties.mode]\nkind = \"string\"\ndefault = \"fast\"\n",
            Path::new("."),
        );
        assert!(report.problems.is_empty());
    }

    #[test]
    fn test_invalid_property_specs() {
        let base = Path::new(".");
        let cases = [
            "[unit]\nname = \"u\"\n[properties.p]\nvalue = \"a\"\nenv = \"A\"\n",
            "[unit]\nname = \"u\"\n[properties.p]\nenv = \"A\"\ndefault = \"a\"\n",
            "[unit]\nname = \"u\"\n[properties.p]\nkind = \"pattern\"\n",
            "[unit]\nname = \"u\"\n[properties.p]\nkind = \"pattern\"\npattern = \"(\"\n",
            "[unit]\nname = \"u\"\n[properties.p]\nkind = \"string\"\npattern = \"a\"\n",
        ];
        for case in cases {
            let manifest = UnitManifest::parse(case).unwrap();
            assert!(
                manifest.to_unit(base, DEFAULT_MAX_NESTING_DEPTH).is_err(),
                "accepted: {}",
                case
            );
        }
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let manifest = "[unit]\nname = \"u\"\n[properties.p]\nkinds = \"file\"\n";
        assert!(UnitManifest::parse(manifest).is_err());
        assert!(UnitManifest::parse("[unit]\nname = \" \"\n").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let err = UnitManifest::load(Path::new("/definitely/missing/Unit.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read manifest"));
    }
}
