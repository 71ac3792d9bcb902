//! propcheck - lazy property validation for build units
//!
//! This crate validates the declared properties of a build unit before it
//! runs. Values may be plain, deferred behind closures and factories, or
//! held in providers; presence is decided without forcing them, and a value
//! is only resolved (once) when a validation rule needs it. Every finding
//! is reported as a structured problem with an id, severity, reason,
//! ranked fixes and a documentation anchor.

pub mod core;
pub mod ops;
pub mod util;

/// Test instrumentation for propcheck unit tests.
///
/// Only available when compiling with `--cfg test`. Provides providers and
/// factories that count how often they are forced.
#[cfg(test)]
pub mod test_support;

pub use core::{
    action::ValidationAction, context::PropertyValidationContext, deferred::DeferredValue,
    problem::ValidationProblem, property::ValidatingProperty, unit::BuildUnit,
    unit::ValidationReport, value::Value,
};

pub use util::context::GlobalContext;
