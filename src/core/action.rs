//! Validation actions: the rules applied to a present property value.
//!
//! [`ValidationAction`] is an open trait. The built-in actions below cover
//! the common value categories; other crates can add their own by
//! implementing the trait.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::core::context::{PropertyValidationContext, PropertyValidationError};
use crate::core::problem::{Severity, ValidationProblem, ValidationProblemId};
use crate::core::resolver::Resolver;
use crate::core::value::Value;

/// A rule applied to a property that has a value.
///
/// Actions only run for present properties. They decide whether to force
/// the value through `value`; the first `get()` may be expensive or fail.
/// A resolution failure may be returned with `?` (a hard failure of this
/// property) or turned into a problem. Actions report through `context`
/// and must not mutate anything else.
pub trait ValidationAction: Send + Sync {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError>;
}

/// Presence is the only requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl ValidationAction for NoValidation {
    fn validate(
        &self,
        _property_name: &str,
        _value: &Resolver<'_>,
        _context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        Ok(())
    }
}

fn report_unexpected_type(
    property_name: &str,
    expected: &str,
    found: &Value,
    context: &mut dyn PropertyValidationContext,
) -> Result<(), PropertyValidationError> {
    context.report(
        ValidationProblem::builder()
            .with_id(ValidationProblemId::UnexpectedValueType)
            .report_as(Severity::Error)
            .for_property(property_name)
            .with_description(format!(
                "has a value of type {} where a {} is required",
                found.type_name(),
                expected
            ))
            .happens_because(format!(
                "The validation rule for this property only accepts {} values",
                expected
            ))
            .add_possible_solution(format!("Assign a {} value to '{}'", expected, property_name)),
    )?;
    Ok(())
}

/// The value must be a non-empty string.
#[derive(Debug, Clone, Copy)]
pub struct NonEmptyString {
    pub severity: Severity,
}

impl NonEmptyString {
    pub fn new(severity: Severity) -> Self {
        NonEmptyString { severity }
    }
}

impl Default for NonEmptyString {
    fn default() -> Self {
        NonEmptyString::new(Severity::Error)
    }
}

impl ValidationAction for NonEmptyString {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        let value = value.get()?;
        let Some(s) = value.as_str() else {
            return report_unexpected_type(property_name, "string", value, context);
        };
        if s.is_empty() {
            context.report(
                ValidationProblem::builder()
                    .with_id(ValidationProblemId::EmptyValue)
                    .report_as(self.severity)
                    .for_property(property_name)
                    .with_description("has an empty value")
                    .happens_because("An empty string is not a valid value for this property")
                    .add_possible_solution(format!(
                        "Assign a non-empty value to '{}'",
                        property_name
                    )),
            )?;
        }
        Ok(())
    }
}

/// The value must be a list with at least one element.
#[derive(Debug, Clone, Copy)]
pub struct NonEmptyList {
    pub severity: Severity,
}

impl NonEmptyList {
    pub fn new(severity: Severity) -> Self {
        NonEmptyList { severity }
    }
}

impl Default for NonEmptyList {
    fn default() -> Self {
        NonEmptyList::new(Severity::Error)
    }
}

impl ValidationAction for NonEmptyList {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        let value = value.get()?;
        let Some(items) = value.as_list() else {
            return report_unexpected_type(property_name, "list", value, context);
        };
        if items.is_empty() {
            context.report(
                ValidationProblem::builder()
                    .with_id(ValidationProblemId::EmptyValue)
                    .report_as(self.severity)
                    .for_property(property_name)
                    .with_description("is an empty collection")
                    .happens_because("This property requires at least one element")
                    .add_possible_solution(format!(
                        "Add at least one element to '{}'",
                        property_name
                    )),
            )?;
        }
        Ok(())
    }
}

/// The value must be a string matching a regular expression.
#[derive(Debug, Clone)]
pub struct MatchesPattern {
    pub pattern: Regex,
    pub severity: Severity,
}

impl MatchesPattern {
    pub fn new(pattern: Regex, severity: Severity) -> Self {
        MatchesPattern { pattern, severity }
    }
}

impl ValidationAction for MatchesPattern {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        let value = value.get()?;
        let Some(s) = value.as_str() else {
            return report_unexpected_type(property_name, "string", value, context);
        };
        if !self.pattern.is_match(s) {
            context.report(
                ValidationProblem::builder()
                    .with_id(ValidationProblemId::ValueDoesNotMatchPattern)
                    .report_as(self.severity)
                    .for_property(property_name)
                    .with_description(format!(
                        "has value {:?} which doesn't match '{}'",
                        s,
                        self.pattern.as_str()
                    ))
                    .happens_because("Values of this property must match a fixed pattern")
                    .add_possible_solution(format!(
                        "Change the value of '{}' to match '{}'",
                        property_name,
                        self.pattern.as_str()
                    )),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathKind {
    File,
    Directory,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::File => write!(f, "file"),
            PathKind::Directory => write!(f, "directory"),
        }
    }
}

fn validate_input_path(
    kind: PathKind,
    base_dir: Option<&Path>,
    property_name: &str,
    value: &Resolver<'_>,
    context: &mut dyn PropertyValidationContext,
) -> Result<(), PropertyValidationError> {
    let value = value.get()?;
    let Some(path) = value.as_path() else {
        return report_unexpected_type(property_name, "path", value, context);
    };
    let path = match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };

    if !path.exists() {
        context.report(
            ValidationProblem::builder()
                .with_id(ValidationProblemId::InputFileDoesNotExist)
                .report_as(Severity::Error)
                .for_property(property_name)
                .with_description(format!(
                    "specifies {} '{}' which doesn't exist",
                    kind,
                    path.display()
                ))
                .happens_because(format!(
                    "An input {} was expected to be present but it doesn't exist",
                    kind
                ))
                .add_possible_solution(format!(
                    "Make sure the {} exists before the unit runs",
                    kind
                ))
                .add_possible_solution(format!(
                    "Make sure the unit which produces the {} is declared as a dependency",
                    kind
                )),
        )?;
        return Ok(());
    }

    let actual = if path.is_dir() {
        PathKind::Directory
    } else {
        PathKind::File
    };
    if actual != kind {
        context.report(
            ValidationProblem::builder()
                .with_id(ValidationProblemId::UnexpectedInputFileType)
                .report_as(Severity::Error)
                .for_property(property_name)
                .with_description(format!(
                    "{} '{}' is not a {}",
                    actual,
                    path.display(),
                    kind
                ))
                .happens_because(format!(
                    "Expected an input to be a {} but it was a {}",
                    kind, actual
                ))
                .add_possible_solution(format!(
                    "Use a {} as an input to '{}'",
                    kind, property_name
                )),
        )?;
    }
    Ok(())
}

/// The value must name an existing regular file.
#[derive(Debug, Clone, Default)]
pub struct InputFile {
    base_dir: Option<PathBuf>,
}

impl InputFile {
    pub fn new() -> Self {
        InputFile::default()
    }

    /// Resolve relative paths against `base_dir`.
    pub fn relative_to(base_dir: impl Into<PathBuf>) -> Self {
        InputFile {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl ValidationAction for InputFile {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        validate_input_path(
            PathKind::File,
            self.base_dir.as_deref(),
            property_name,
            value,
            context,
        )
    }
}

/// The value must name an existing directory.
#[derive(Debug, Clone, Default)]
pub struct InputDirectory {
    base_dir: Option<PathBuf>,
}

impl InputDirectory {
    pub fn new() -> Self {
        InputDirectory::default()
    }

    /// Resolve relative paths against `base_dir`.
    pub fn relative_to(base_dir: impl Into<PathBuf>) -> Self {
        InputDirectory {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl ValidationAction for InputDirectory {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        validate_input_path(
            PathKind::Directory,
            self.base_dir.as_deref(),
            property_name,
            value,
            context,
        )
    }
}

/// Turns resolution failures of the wrapped action into problems.
///
/// Without this wrapper a value that reports presence but cannot be
/// calculated aborts validation of its property.
#[derive(Debug, Clone, Default)]
pub struct ReportUnresolvable<A> {
    inner: A,
}

impl<A> ReportUnresolvable<A> {
    pub fn new(inner: A) -> Self {
        ReportUnresolvable { inner }
    }
}

impl<A: ValidationAction> ValidationAction for ReportUnresolvable<A> {
    fn validate(
        &self,
        property_name: &str,
        value: &Resolver<'_>,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        match self.inner.validate(property_name, value, context) {
            Err(PropertyValidationError::Resolve(err)) => {
                tracing::debug!("value of '{}' could not be resolved: {}", property_name, err);
                context.report(
                    ValidationProblem::builder()
                        .with_id(ValidationProblemId::UnresolvableValue)
                        .report_as(Severity::Error)
                        .for_property(property_name)
                        .with_description("has a value that could not be calculated")
                        .happens_because(err.to_string())
                        .add_possible_solution(format!(
                            "Make sure a valid value for '{}' can be calculated",
                            property_name
                        )),
                )?;
                Ok(())
            }
            other => other,
        }
    }
}
