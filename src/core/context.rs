//! Sinks that validation problems are reported into.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::deferred::ResolveError;
use crate::core::problem::{ProblemBuilder, ProblemError, Severity, ValidationProblem};

/// Hard failure while validating one property.
///
/// Problems with the configured value are reported to the context instead;
/// this only covers values that could not be read or forced, and problems
/// that could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum PropertyValidationError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Problem(#[from] ProblemError),
}

/// Receives the problems found while validating properties.
pub trait PropertyValidationContext {
    /// Accept one complete problem.
    ///
    /// Implemented by sinks. Actions report through [`report`](Self::report),
    /// which only submits problems that passed [`ProblemBuilder::build`].
    fn visit_property_problem(&mut self, problem: ValidationProblem);

    /// Build `problem` and submit it. Nothing is submitted if the build fails.
    fn report(&mut self, problem: ProblemBuilder) -> Result<(), ProblemError> {
        let problem = problem.build()?;
        self.visit_property_problem(problem);
        Ok(())
    }
}

/// Collects problems in the order they are reported.
#[derive(Debug, Clone, Default)]
pub struct ProblemCollector {
    problems: Vec<ValidationProblem>,
}

impl ProblemCollector {
    pub fn new() -> Self {
        ProblemCollector::default()
    }

    pub fn problems(&self) -> &[ValidationProblem] {
        &self.problems
    }

    pub fn into_problems(self) -> Vec<ValidationProblem> {
        self.problems
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn has_errors(&self) -> bool {
        self.problems.iter().any(|p| p.severity == Severity::Error)
    }
}

impl PropertyValidationContext for ProblemCollector {
    fn visit_property_problem(&mut self, problem: ValidationProblem) {
        self.problems.push(problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::problem::ValidationProblemId;

    #[test]
    fn test_report_submits_only_complete_problems() {
        let mut collector = ProblemCollector::new();

        let incomplete = ValidationProblem::builder().with_id(ValidationProblemId::EmptyValue);
        assert!(collector.report(incomplete).is_err());
        assert!(collector.is_empty());

        let complete = ValidationProblem::builder()
            .with_id(ValidationProblemId::EmptyValue)
            .report_as(Severity::Error)
            .for_property("name")
            .with_description("is empty")
            .add_possible_solution("Set a name");
        collector.report(complete).unwrap();
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.problems()[0].solutions(), ["Set a name"]);
        assert!(collector.has_errors());
    }
}
