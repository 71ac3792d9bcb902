//! Terminal rendering of validation problems.
//!
//! Every rendered problem carries its id, what is wrong, why, the
//! suggested fixes in order, and where it is documented.

use std::fmt;

use miette::Diagnostic as _;

use crate::core::problem::{Severity, ValidationProblem};
use crate::core::unit::PropertyFailure;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str =
        "help: Create a Unit.toml declaring the unit and its properties, or pass --manifest";

    /// Suggestion printed after a failed check.
    pub const EXPLAIN: &str = "help: Run `propcheck explain <ID>` for details on a problem";

    /// Suggestion when a problem id is unknown.
    pub const UNKNOWN_ID: &str = "help: Run `propcheck explain --list` to see all problem ids";
}

/// A problem or failure prepared for display.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Problem id, if any
    pub code: Option<String>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Documentation reference
    pub documentation: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
            documentation: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m",
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m",
            (false, Severity::Error) => "error",
            (false, Severity::Warning) => "warning",
        };

        match &self.code {
            Some(code) => {
                output.push_str(&format!("{}[{}]: {}\n", severity_str, code, self.message))
            }
            None => output.push_str(&format!("{}: {}\n", severity_str, self.message)),
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref docs) = self.documentation {
            output.push_str(&format!("  docs: {}\n", docs));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

impl From<&ValidationProblem> for Diagnostic {
    fn from(problem: &ValidationProblem) -> Self {
        Diagnostic {
            message: problem.to_string(),
            severity: problem.severity,
            code: Some(problem.id.to_string()),
            context: problem.reason.iter().cloned().collect(),
            suggestions: problem.solutions().to_vec(),
            documentation: Some(problem.documentation.to_string()),
        }
    }
}

impl From<&PropertyFailure> for Diagnostic {
    fn from(failure: &PropertyFailure) -> Self {
        let mut diagnostic = Diagnostic::error(format!(
            "validation of property '{}' aborted",
            failure.property
        ))
        .with_context(failure.message.clone());
        diagnostic.code = failure.error.code().map(|code| code.to_string());
        if let Some(help) = failure.error.help() {
            diagnostic = diagnostic.with_suggestion(help.to_string());
        }
        diagnostic
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
