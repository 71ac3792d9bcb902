//! Core data structures for propcheck.
//!
//! This module contains the validation engine:
//! - Deferred values, providers and their presence checks
//! - Validating properties and the actions applied to them
//! - Structured problems and the sinks that collect them
//! - Build units and their manifests

pub mod action;
pub mod context;
pub mod deferred;
pub mod manifest;
pub mod problem;
pub mod property;
pub mod property_value;
pub mod provider;
pub mod resolver;
pub mod unit;
pub mod value;

pub use action::ValidationAction;
pub use context::{ProblemCollector, PropertyValidationContext, PropertyValidationError};
pub use deferred::{unnest, unpack, DeferredValue, ResolveError, UnnestedValue};
pub use manifest::{UnitManifest, MANIFEST_NAME};
pub use problem::{ProblemBuilder, Severity, ValidationProblem, ValidationProblemId};
pub use property::ValidatingProperty;
pub use property_value::{CallableValue, PropertyValue, StaticValue};
pub use provider::{HasConfigurableValue, Property, Provider};
pub use resolver::Resolver;
pub use unit::{BuildUnit, ValidationReport, ValidationSettings};
pub use value::Value;
