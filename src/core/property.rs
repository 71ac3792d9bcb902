//! Validation of a single declared property.

use std::fmt;
use std::sync::Arc;

use crate::core::action::ValidationAction;
use crate::core::context::{PropertyValidationContext, PropertyValidationError};
use crate::core::deferred::{unnest, DEFAULT_MAX_NESTING_DEPTH};
use crate::core::problem::{ProblemError, Severity, ValidationProblem, ValidationProblemId};
use crate::core::property_value::PropertyValue;
use crate::core::resolver::Resolver;

/// One declared property of a build unit, together with its rule.
pub struct ValidatingProperty {
    name: String,
    value: Box<dyn PropertyValue>,
    optional: bool,
    action: Arc<dyn ValidationAction>,
    max_nesting_depth: usize,
}

impl ValidatingProperty {
    /// Declare a property.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Names read from a manifest are checked
    /// before they get here.
    pub fn new(
        name: impl Into<String>,
        value: impl PropertyValue + 'static,
        optional: bool,
        action: Arc<dyn ValidationAction>,
    ) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "property name must not be empty");
        ValidatingProperty {
            name,
            value: Box::new(value),
            optional,
            action,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Limit how many nested closure layers the value may have.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Validate the property, reporting problems into `context`.
    ///
    /// A missing value is reported as `VALUE_NOT_SET` unless the property
    /// is optional. A present value is handed to the action through a
    /// resolver that forces it at most once. Only failures to read or force
    /// the value are returned as errors. Safe to call repeatedly.
    pub fn validate(
        &self,
        context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        let unnested = unnest(self.value.call()?, self.max_nesting_depth)?;

        if unnested.is_present() {
            let resolver = Resolver::new(&unnested);
            self.action.validate(&self.name, &resolver, context)?;
            tracing::trace!(
                "validated '{}' (resolved: {})",
                self.name,
                resolver.is_resolved()
            );
        } else if !self.optional {
            tracing::debug!("required property '{}' has no value", self.name);
            report_value_not_set(&self.name, context, unnested.has_configurable_value())?;
        } else {
            tracing::trace!("optional property '{}' has no value", self.name);
        }
        Ok(())
    }

    /// Lock the value's configuration ahead of execution. Idempotent.
    pub fn prepare_value(&self) {
        self.value.maybe_finalize_value();
    }

    /// Release anything retained after execution.
    pub fn cleanup_value(&self) {}
}

impl fmt::Debug for ValidatingProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatingProperty")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("max_nesting_depth", &self.max_nesting_depth)
            .finish_non_exhaustive()
    }
}

/// Report that a required property has no value.
///
/// The first suggestion depends on whether the user could assign the value
/// directly or whether it is calculated; marking the property optional is
/// always offered last.
pub fn report_value_not_set(
    property_name: &str,
    context: &mut dyn PropertyValidationContext,
    has_configurable_value: bool,
) -> Result<(), ProblemError> {
    let mut problem = ValidationProblem::builder()
        .with_id(ValidationProblemId::ValueNotSet)
        .report_as(Severity::Error)
        .for_property(property_name)
        .with_description("doesn't have a configured value")
        .happens_because(
            "This property isn't marked as optional and no value has been configured",
        )
        .documented_at("validation_problems", "value_not_set");
    problem = if has_configurable_value {
        problem.add_possible_solution(format!("Assign a value to '{}'", property_name))
    } else {
        problem.add_possible_solution(format!(
            "The value of '{}' is calculated, make sure a valid value can be calculated",
            property_name
        ))
    };
    problem =
        problem.add_possible_solution(format!("Mark property '{}' as optional", property_name));
    context.report(problem)
}
