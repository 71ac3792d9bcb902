//! Deferred values and their two-step resolution.
//!
//! A configured property may hold a plain value, nothing at all, or some
//! form of deferred computation. Resolution happens in two steps:
//!
//! 1. [`unnest`] strips cheap closure layers until it reaches the outermost
//!    non-deferred shape. It never forces a factory or a provider.
//! 2. [`unpack`] forces whatever is left and yields the real [`Value`].
//!
//! Presence can always be answered after step 1, so the cost of step 2 is
//! only paid when a validation rule actually looks at the value.

use std::fmt;
use std::sync::Arc;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::provider::Provider;
use crate::core::value::Value;

/// Default bound on the number of nested closure layers [`unnest`] strips.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Closure producing another layer of deferred value. Cheap by contract.
pub type NestedFn = Arc<dyn Fn() -> DeferredValue + Send + Sync>;

/// Closure computing a value. Potentially expensive and fallible.
pub type FactoryFn = Arc<dyn Fn() -> Result<Value, ResolveError> + Send + Sync>;

/// Failure to force a deferred value.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("no value has been configured")]
    #[diagnostic(
        code(propcheck::resolve::no_value),
        help("Configure a value before it is read")
    )]
    NoValue,

    #[error("{provider} has no value")]
    #[diagnostic(
        code(propcheck::resolve::empty_provider),
        help("Check `is_present()` before forcing the provider")
    )]
    EmptyProvider { provider: String },

    #[error("failed to calculate value: {message}")]
    #[diagnostic(
        code(propcheck::resolve::computation_failed),
        help("Fix the factory or provider that calculates this value")
    )]
    Computation { message: String },

    #[error("deferred value is nested more than {limit} levels deep")]
    #[diagnostic(
        code(propcheck::resolve::nesting_too_deep),
        help("Raise `validation.max_nesting_depth` or flatten the value")
    )]
    NestingTooDeep { limit: usize },
}

impl ResolveError {
    /// Create a computation failure.
    pub fn computation(message: impl Into<String>) -> Self {
        ResolveError::Computation {
            message: message.into(),
        }
    }
}

/// Whatever the user configured for a property.
#[derive(Clone, Default)]
pub enum DeferredValue {
    /// Nothing configured.
    #[default]
    Null,
    /// An ordinary value.
    Plain(Value),
    /// A closure yielding another deferred layer.
    Nested(NestedFn),
    /// A factory computing the value on demand.
    Factory(FactoryFn),
    /// A provider-like container that can report presence cheaply.
    Provider(Arc<dyn Provider>),
}

impl DeferredValue {
    /// Wrap a closure that yields another deferred layer.
    pub fn nested<F>(f: F) -> Self
    where
        F: Fn() -> DeferredValue + Send + Sync + 'static,
    {
        DeferredValue::Nested(Arc::new(f))
    }

    /// Wrap a factory that computes the value when forced.
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        DeferredValue::Factory(Arc::new(f))
    }

    /// Wrap a provider.
    pub fn provider(provider: impl Provider + 'static) -> Self {
        DeferredValue::Provider(Arc::new(provider))
    }

    /// Wrap a provider that is shared with other owners.
    pub fn shared(provider: Arc<dyn Provider>) -> Self {
        DeferredValue::Provider(provider)
    }
}

impl fmt::Debug for DeferredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredValue::Null => write!(f, "Null"),
            DeferredValue::Plain(v) => f.debug_tuple("Plain").field(v).finish(),
            DeferredValue::Nested(_) => write!(f, "Nested(..)"),
            DeferredValue::Factory(_) => write!(f, "Factory(..)"),
            DeferredValue::Provider(p) => f.debug_tuple("Provider").field(p).finish(),
        }
    }
}

impl From<Value> for DeferredValue {
    fn from(value: Value) -> Self {
        DeferredValue::Plain(value)
    }
}

impl From<Option<Value>> for DeferredValue {
    fn from(value: Option<Value>) -> Self {
        value.map(DeferredValue::Plain).unwrap_or_default()
    }
}

/// A deferred value with all closure layers stripped.
///
/// Factories and providers are kept as-is: they have not been forced.
#[derive(Clone)]
pub enum UnnestedValue {
    Null,
    Plain(Value),
    Factory(FactoryFn),
    Provider(Arc<dyn Provider>),
}

impl UnnestedValue {
    /// Whether an obtainable value exists, without forcing it.
    ///
    /// A provider may be configured but empty, so its own presence query
    /// decides. Everything else is present unless it is null.
    pub fn is_present(&self) -> bool {
        match self {
            UnnestedValue::Null => false,
            UnnestedValue::Provider(p) => p.is_present(),
            UnnestedValue::Plain(_) | UnnestedValue::Factory(_) => true,
        }
    }

    /// Whether the user can assign to this slot directly.
    ///
    /// An unset slot is assignable. A provider is assignable only if it
    /// exposes the configurable capability; derived providers are not.
    pub fn has_configurable_value(&self) -> bool {
        match self {
            UnnestedValue::Null => true,
            UnnestedValue::Provider(p) => p.as_configurable().is_some(),
            UnnestedValue::Plain(_) | UnnestedValue::Factory(_) => false,
        }
    }
}

impl fmt::Debug for UnnestedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnnestedValue::Null => write!(f, "Null"),
            UnnestedValue::Plain(v) => f.debug_tuple("Plain").field(v).finish(),
            UnnestedValue::Factory(_) => write!(f, "Factory(..)"),
            UnnestedValue::Provider(p) => f.debug_tuple("Provider").field(p).finish(),
        }
    }
}

/// Strip nested closure layers without forcing factories or providers.
///
/// At most `max_depth` layers are stripped; deeper nesting is an error.
pub fn unnest(raw: DeferredValue, max_depth: usize) -> Result<UnnestedValue, ResolveError> {
    let mut current = raw;
    let mut depth = 0;
    loop {
        current = match current {
            DeferredValue::Null => return Ok(UnnestedValue::Null),
            DeferredValue::Plain(v) => return Ok(UnnestedValue::Plain(v)),
            DeferredValue::Factory(f) => return Ok(UnnestedValue::Factory(f)),
            DeferredValue::Provider(p) => return Ok(UnnestedValue::Provider(p)),
            DeferredValue::Nested(next) => {
                if depth == max_depth {
                    return Err(ResolveError::NestingTooDeep { limit: max_depth });
                }
                depth += 1;
                next()
            }
        };
    }
}

/// Force an unnested value into a real [`Value`].
pub fn unpack(unnested: &UnnestedValue) -> Result<Value, ResolveError> {
    match unnested {
        UnnestedValue::Null => Err(ResolveError::NoValue),
        UnnestedValue::Plain(v) => Ok(v.clone()),
        UnnestedValue::Factory(f) => {
            tracing::trace!("calling factory");
            f()
        }
        UnnestedValue::Provider(p) => {
            tracing::trace!("resolving {:?}", p);
            p.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{Mapped, Property};
    use crate::test_support::CountingProvider;

    #[test]
    fn test_unnest_strips_nested_layers() {
        let raw = DeferredValue::nested(|| {
            DeferredValue::nested(|| DeferredValue::Plain(Value::from("out.jar")))
        });

        let unnested = unnest(raw, DEFAULT_MAX_NESTING_DEPTH).unwrap();
        assert!(matches!(unnested, UnnestedValue::Plain(Value::Str(ref s)) if s == "out.jar"));
    }

    #[test]
    fn test_unnest_does_not_force_provider() {
        let provider = CountingProvider::present(Value::from("x"));
        let counter = provider.counter();
        let raw = DeferredValue::nested(move || DeferredValue::provider(provider.clone()));

        let unnested = unnest(raw, DEFAULT_MAX_NESTING_DEPTH).unwrap();
        assert!(unnested.is_present());
        assert_eq!(counter.get(), 0);

        assert_eq!(unpack(&unnested).unwrap(), Value::from("x"));
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_unnest_does_not_call_factory() {
        let raw = DeferredValue::factory(|| Err(ResolveError::computation("boom")));
        let unnested = unnest(raw, DEFAULT_MAX_NESTING_DEPTH).unwrap();
        assert!(unnested.is_present());
        assert!(!unnested.has_configurable_value());
        assert_eq!(
            unpack(&unnested).unwrap_err(),
            ResolveError::computation("boom")
        );
    }

    #[test]
    fn test_unnest_depth_limit() {
        fn chain(n: usize) -> DeferredValue {
            if n == 0 {
                DeferredValue::Plain(Value::Int(1))
            } else {
                DeferredValue::nested(move || chain(n - 1))
            }
        }

        assert!(unnest(chain(3), 3).is_ok());
        assert_eq!(
            unnest(chain(4), 3).unwrap_err(),
            ResolveError::NestingTooDeep { limit: 3 }
        );
        assert!(unnest(DeferredValue::Plain(Value::Int(1)), 0).is_ok());
    }

    #[test]
    fn test_presence_of_null_and_empty_providers() {
        let null = unnest(DeferredValue::Null, 1).unwrap();
        assert!(!null.is_present());
        assert!(null.has_configurable_value());
        assert_eq!(unpack(&null).unwrap_err(), ResolveError::NoValue);

        let empty = unnest(DeferredValue::provider(Property::new()), 1).unwrap();
        assert!(!empty.is_present());
        assert!(empty.has_configurable_value());

        let derived = unnest(
            DeferredValue::provider(Mapped::new(Property::new(), Ok)),
            1,
        )
        .unwrap();
        assert!(!derived.is_present());
        assert!(!derived.has_configurable_value());
    }
}
