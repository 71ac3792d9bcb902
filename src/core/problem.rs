//! Structured validation problems.
//!
//! A problem is data, not control flow: it names what is wrong with a
//! property, why, and what the user can do about it. Problems are built
//! with [`ProblemBuilder`] and only become visible once [`ProblemBuilder::build`]
//! has checked that they are complete.

use std::fmt;
use std::str::FromStr;

use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Documentation section all built-in problem ids are documented in.
pub const VALIDATION_PROBLEMS_SECTION: &str = "validation_problems";

/// Stable identifier of a kind of validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationProblemId {
    /// A required property has no value
    ValueNotSet,
    /// A value is present but empty
    EmptyValue,
    /// A value has the wrong type for its rule
    UnexpectedValueType,
    /// A string does not match the required pattern
    ValueDoesNotMatchPattern,
    /// An input file or directory does not exist
    InputFileDoesNotExist,
    /// An input path exists but is the wrong kind of file
    UnexpectedInputFileType,
    /// A present value could not be resolved
    UnresolvableValue,
}

impl ValidationProblemId {
    pub const ALL: [ValidationProblemId; 7] = [
        ValidationProblemId::ValueNotSet,
        ValidationProblemId::EmptyValue,
        ValidationProblemId::UnexpectedValueType,
        ValidationProblemId::ValueDoesNotMatchPattern,
        ValidationProblemId::InputFileDoesNotExist,
        ValidationProblemId::UnexpectedInputFileType,
        ValidationProblemId::UnresolvableValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationProblemId::ValueNotSet => "VALUE_NOT_SET",
            ValidationProblemId::EmptyValue => "EMPTY_VALUE",
            ValidationProblemId::UnexpectedValueType => "UNEXPECTED_VALUE_TYPE",
            ValidationProblemId::ValueDoesNotMatchPattern => "VALUE_DOES_NOT_MATCH_PATTERN",
            ValidationProblemId::InputFileDoesNotExist => "INPUT_FILE_DOES_NOT_EXIST",
            ValidationProblemId::UnexpectedInputFileType => "UNEXPECTED_INPUT_FILE_TYPE",
            ValidationProblemId::UnresolvableValue => "UNRESOLVABLE_VALUE",
        }
    }

    /// One-line summary of the problem kind.
    pub fn summary(&self) -> &'static str {
        match self {
            ValidationProblemId::ValueNotSet => {
                "A property that isn't optional has no configured value"
            }
            ValidationProblemId::EmptyValue => "A property value is present but empty",
            ValidationProblemId::UnexpectedValueType => {
                "A property value has a type its validation rule cannot check"
            }
            ValidationProblemId::ValueDoesNotMatchPattern => {
                "A string property does not match its required pattern"
            }
            ValidationProblemId::InputFileDoesNotExist => {
                "An input file or directory property points to a missing path"
            }
            ValidationProblemId::UnexpectedInputFileType => {
                "An input path exists but is not the expected kind of file"
            }
            ValidationProblemId::UnresolvableValue => {
                "A property reports a value but calculating it failed"
            }
        }
    }

    /// Default documentation anchor for this id.
    pub fn documentation(&self) -> DocumentationAnchor {
        DocumentationAnchor::new(
            VALIDATION_PROBLEMS_SECTION,
            self.as_str().to_ascii_lowercase(),
        )
    }
}

impl fmt::Display for ValidationProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown problem id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown problem id '{0}'")]
pub struct ProblemIdParseError(pub String);

impl FromStr for ValidationProblemId {
    type Err = ProblemIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        ValidationProblemId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ProblemIdParseError(s.to_string()))
    }
}

/// Severity of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Where a problem is documented: a section and a topic within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationAnchor {
    pub section: String,
    pub topic: String,
}

impl DocumentationAnchor {
    pub fn new(section: impl Into<String>, topic: impl Into<String>) -> Self {
        DocumentationAnchor {
            section: section.into(),
            topic: topic.into(),
        }
    }
}

impl fmt::Display for DocumentationAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.section, self.topic)
    }
}

/// A single structured diagnostic about one property.
///
/// Only [`ProblemBuilder::build`] creates problems, so the remedy list is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationProblem {
    pub id: ValidationProblemId,
    pub severity: Severity,
    pub property: String,
    /// What is wrong
    pub description: String,
    /// Why it is wrong
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    solutions: Vec<String>,
    pub documentation: DocumentationAnchor,
}

impl ValidationProblem {
    /// Start building a problem.
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder::default()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Ordered remedies, most specific first. Never empty.
    pub fn solutions(&self) -> &[String] {
        &self.solutions
    }
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "property '{}' {}", self.property, self.description)
    }
}

/// Reasons a problem cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ProblemError {
    #[error("problem has no id")]
    #[diagnostic(
        code(propcheck::problem::missing_id),
        help("Call `with_id` before building the problem")
    )]
    MissingId,

    #[error("problem {id} has no severity")]
    #[diagnostic(
        code(propcheck::problem::missing_severity),
        help("Call `report_as` before building the problem")
    )]
    MissingSeverity { id: ValidationProblemId },

    #[error("problem {id} is not attached to a property")]
    #[diagnostic(
        code(propcheck::problem::missing_property),
        help("Call `for_property` before building the problem")
    )]
    MissingProperty { id: ValidationProblemId },

    #[error("problem {id} has no description")]
    #[diagnostic(
        code(propcheck::problem::missing_description),
        help("Call `with_description` before building the problem")
    )]
    MissingDescription { id: ValidationProblemId },

    #[error("problem {id} for property '{property}' offers no possible solution")]
    #[diagnostic(
        code(propcheck::problem::no_solution),
        help("Add at least one remedy with `add_possible_solution`")
    )]
    NoSolution {
        id: ValidationProblemId,
        property: String,
    },
}

/// Staged construction of a [`ValidationProblem`].
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    id: Option<ValidationProblemId>,
    severity: Option<Severity>,
    property: Option<String>,
    description: Option<String>,
    reason: Option<String>,
    solutions: Vec<String>,
    documentation: Option<DocumentationAnchor>,
}

impl ProblemBuilder {
    pub fn with_id(mut self, id: ValidationProblemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn report_as(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn for_property(mut self, name: impl Into<String>) -> Self {
        self.property = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn happens_because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Override the documentation anchor. Defaults to the id's own topic.
    pub fn documented_at(mut self, section: impl Into<String>, topic: impl Into<String>) -> Self {
        self.documentation = Some(DocumentationAnchor::new(section, topic));
        self
    }

    /// Append a remedy. Remedies keep the order they were added in.
    pub fn add_possible_solution(mut self, solution: impl Into<String>) -> Self {
        self.solutions.push(solution.into());
        self
    }

    /// Finish the problem, checking that every required part is present.
    pub fn build(self) -> Result<ValidationProblem, ProblemError> {
        let id = self.id.ok_or(ProblemError::MissingId)?;
        let severity = self.severity.ok_or(ProblemError::MissingSeverity { id })?;
        let property = self.property.ok_or(ProblemError::MissingProperty { id })?;
        let description = self
            .description
            .ok_or(ProblemError::MissingDescription { id })?;
        if self.solutions.is_empty() {
            return Err(ProblemError::NoSolution { id, property });
        }

        Ok(ValidationProblem {
            id,
            severity,
            property,
            description,
            reason: self.reason,
            solutions: self.solutions,
            documentation: self.documentation.unwrap_or_else(|| id.documentation()),
        })
    }
}
