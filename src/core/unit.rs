//! Build units: the owners of validating properties.
//!
//! A unit validates all of its properties in one pass and collects every
//! problem instead of stopping at the first. A property whose value cannot
//! be read or forced is recorded as a failure and the pass carries on.

use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::core::context::{ProblemCollector, PropertyValidationError};
use crate::core::problem::{Severity, ValidationProblem};
use crate::core::property::ValidatingProperty;

/// How a validation pass runs and what counts as success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSettings {
    /// Validate properties on the rayon thread pool.
    pub parallel: bool,
    /// Treat warnings as failures.
    pub fail_on_warnings: bool,
}

/// A property whose validation aborted.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyFailure {
    pub property: String,
    pub message: String,
    #[serde(skip)]
    pub error: PropertyValidationError,
}

/// Everything one validation pass found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub unit: String,
    pub problems: Vec<ValidationProblem>,
    pub failures: Vec<PropertyFailure>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationProblem> {
        self.problems.iter().filter(|p| p.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationProblem> {
        self.problems.iter().filter(|p| p.severity == Severity::Warning)
    }

    /// Problems reported for one property.
    pub fn for_property<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a ValidationProblem> {
        self.problems.iter().filter(move |p| p.property == name)
    }

    /// Whether the unit may execute.
    pub fn is_success(&self, fail_on_warnings: bool) -> bool {
        self.failures.is_empty()
            && self.errors().next().is_none()
            && !(fail_on_warnings && self.warnings().next().is_some())
    }
}

/// Returned by [`BuildUnit::execute`] when validation fails.
#[derive(Debug, Error)]
#[error(
    "unit '{}' has {} validation problem(s) and {} property failure(s)",
    .report.unit,
    .report.problems.len(),
    .report.failures.len()
)]
pub struct InvalidUnitError {
    pub report: ValidationReport,
}

/// A configurable build unit and its declared properties.
#[derive(Debug)]
pub struct BuildUnit {
    name: String,
    properties: Vec<ValidatingProperty>,
}

impl BuildUnit {
    pub fn new(name: impl Into<String>) -> Self {
        BuildUnit {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Declare a property. Properties are validated in declaration order.
    pub fn with_property(mut self, property: ValidatingProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn add_property(&mut self, property: ValidatingProperty) {
        self.properties.push(property);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[ValidatingProperty] {
        &self.properties
    }

    /// Finalize every property's value ahead of execution.
    pub fn prepare(&self) {
        for property in &self.properties {
            property.prepare_value();
        }
    }

    /// Release resources held by properties after execution.
    pub fn cleanup(&self) {
        for property in &self.properties {
            property.cleanup_value();
        }
    }

    /// Validate every property.
    ///
    /// In parallel mode each property reports into its own collector; the
    /// results are merged in declaration order either way.
    pub fn validate(&self, settings: &ValidationSettings) -> ValidationReport {
        tracing::debug!(
            "Validating {} properties of '{}'",
            self.properties.len(),
            self.name
        );

        let outcomes: Vec<_> = if settings.parallel {
            self.properties.par_iter().map(validate_one).collect()
        } else {
            self.properties.iter().map(validate_one).collect()
        };

        let mut report = ValidationReport {
            unit: self.name.clone(),
            ..Default::default()
        };
        for (property, (collector, result)) in self.properties.iter().zip(outcomes) {
            report.problems.extend(collector.into_problems());
            if let Err(error) = result {
                tracing::debug!("validation of '{}' aborted: {}", property.name(), error);
                report.failures.push(PropertyFailure {
                    property: property.name().to_string(),
                    message: error.to_string(),
                    error,
                });
            }
        }

        tracing::info!(
            "'{}': {} error(s), {} warning(s)",
            self.name,
            report.errors().count(),
            report.warnings().count()
        );
        report
    }

    /// Prepare, validate, run `work`, and clean up.
    ///
    /// `work` only runs if validation succeeds. Cleanup runs whenever
    /// preparation did.
    pub fn execute<T>(
        &self,
        settings: &ValidationSettings,
        work: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.prepare();
        let report = self.validate(settings);
        let result = if report.is_success(settings.fail_on_warnings) {
            work()
        } else {
            Err(InvalidUnitError { report }.into())
        };
        self.cleanup();
        result
    }
}

fn validate_one(
    property: &ValidatingProperty,
) -> (ProblemCollector, Result<(), PropertyValidationError>) {
    let mut collector = ProblemCollector::new();
    let result = property.validate(&mut collector);
    (collector, result)
}
