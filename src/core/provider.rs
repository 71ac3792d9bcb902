//! Provider-like containers.
//!
//! A provider can always answer "is a value obtainable?" cheaply, while
//! actually obtaining the value may be expensive or fail. Providers that
//! the user can assign to directly also expose [`HasConfigurableValue`];
//! derived providers do not.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use crate::core::deferred::ResolveError;
use crate::core::value::Value;

/// A container that may or may not hold an obtainable value.
pub trait Provider: fmt::Debug + Send + Sync {
    /// Whether a value can be obtained. Must not force the value.
    fn is_present(&self) -> bool;

    /// Obtain the value. Fails if the provider is empty.
    fn get(&self) -> Result<Value, ResolveError>;

    /// The configurable capability, if the user can assign to this provider.
    fn as_configurable(&self) -> Option<&dyn HasConfigurableValue> {
        None
    }
}

/// Capability of a value slot the user can assign to.
pub trait HasConfigurableValue: Send + Sync {
    /// Lock the slot against further mutation. Idempotent.
    fn finalize_value(&self);

    /// Whether the slot has been finalized.
    fn is_finalized(&self) -> bool;
}

/// Errors from mutating a [`Property`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("the value for this property is final and cannot be changed any further")]
    Finalized,
}

#[derive(Debug, Clone)]
enum Source {
    Fixed(Value),
    Provider(Arc<dyn Provider>),
}

#[derive(Debug, Default)]
struct PropertyState {
    source: Option<Source>,
    convention: Option<Value>,
    finalized: bool,
}

/// An assignable property slot.
///
/// The slot holds an explicit value, a value taken from another provider,
/// or nothing. When nothing is set the convention value, if any, is used.
#[derive(Debug, Default)]
pub struct Property {
    state: RwLock<PropertyState>,
}

impl Property {
    /// Create an empty property.
    pub fn new() -> Self {
        Property::default()
    }

    /// Create a property holding `value`.
    pub fn with_value(value: impl Into<Value>) -> Self {
        let property = Property::new();
        property.write().source = Some(Source::Fixed(value.into()));
        property
    }

    /// Assign an explicit value.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), PropertyError> {
        self.mutate(|state| state.source = Some(Source::Fixed(value.into())))
    }

    /// Take the value from another provider. The provider is not forced.
    pub fn set_from(&self, provider: Arc<dyn Provider>) -> Result<(), PropertyError> {
        self.mutate(|state| state.source = Some(Source::Provider(provider)))
    }

    /// Set the value used when nothing has been assigned.
    pub fn convention(&self, value: impl Into<Value>) -> Result<(), PropertyError> {
        self.mutate(|state| state.convention = Some(value.into()))
    }

    /// Clear any assigned value. The convention is kept.
    pub fn unset(&self) -> Result<(), PropertyError> {
        self.mutate(|state| state.source = None)
    }

    fn mutate(&self, f: impl FnOnce(&mut PropertyState)) -> Result<(), PropertyError> {
        let mut state = self.write();
        if state.finalized {
            return Err(PropertyError::Finalized);
        }
        f(&mut state);
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, PropertyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, PropertyState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Provider for Property {
    fn is_present(&self) -> bool {
        let state = self.read();
        match &state.source {
            Some(Source::Fixed(_)) => true,
            Some(Source::Provider(p)) => p.is_present(),
            None => state.convention.is_some(),
        }
    }

    fn get(&self) -> Result<Value, ResolveError> {
        // Clone out of the lock so an upstream provider is forced unlocked.
        let (source, convention) = {
            let state = self.read();
            (state.source.clone(), state.convention.clone())
        };
        match source {
            Some(Source::Fixed(v)) => Ok(v),
            Some(Source::Provider(p)) => p.get(),
            None => convention.ok_or_else(|| ResolveError::EmptyProvider {
                provider: "property".to_string(),
            }),
        }
    }

    fn as_configurable(&self) -> Option<&dyn HasConfigurableValue> {
        Some(self)
    }
}

impl HasConfigurableValue for Property {
    fn finalize_value(&self) {
        self.write().finalized = true;
    }

    fn is_finalized(&self) -> bool {
        self.read().finalized
    }
}

type Transform = Arc<dyn Fn(Value) -> Result<Value, ResolveError> + Send + Sync>;

/// A provider derived from another provider by a transform.
///
/// Its value is calculated, so it cannot be assigned to.
#[derive(Clone)]
pub struct Mapped {
    source: Arc<dyn Provider>,
    transform: Transform,
}

impl Mapped {
    /// Derive a provider from `source`.
    pub fn new<F>(source: impl Provider + 'static, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Mapped::from_shared(Arc::new(source), transform)
    }

    /// Derive a provider from a shared `source`.
    pub fn from_shared<F>(source: Arc<dyn Provider>, transform: F) -> Self
    where
        F: Fn(Value) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Mapped {
            source,
            transform: Arc::new(transform),
        }
    }
}

impl fmt::Debug for Mapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapped")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Provider for Mapped {
    fn is_present(&self) -> bool {
        self.source.is_present()
    }

    fn get(&self) -> Result<Value, ResolveError> {
        (self.transform)(self.source.get()?)
    }
}

/// A provider reading an environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    name: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>) -> Self {
        EnvVar { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Provider for EnvVar {
    fn is_present(&self) -> bool {
        std::env::var_os(&self.name).is_some()
    }

    fn get(&self) -> Result<Value, ResolveError> {
        match std::env::var(&self.name) {
            Ok(v) => Ok(Value::Str(v)),
            Err(std::env::VarError::NotPresent) => Err(ResolveError::EmptyProvider {
                provider: format!("environment variable `{}`", self.name),
            }),
            Err(e) => Err(ResolveError::computation(format!(
                "environment variable `{}`: {}",
                self.name, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_presence() {
        let prop = Property::new();
        assert!(!prop.is_present());
        assert!(prop.get().is_err());

        prop.convention("default.txt").unwrap();
        assert!(prop.is_present());
        assert_eq!(prop.get().unwrap(), Value::from("default.txt"));

        prop.set("explicit.txt").unwrap();
        assert_eq!(prop.get().unwrap(), Value::from("explicit.txt"));

        prop.unset().unwrap();
        assert_eq!(prop.get().unwrap(), Value::from("default.txt"));
    }

    #[test]
    fn test_property_set_from_empty_provider_ignores_convention() {
        let prop = Property::new();
        prop.convention("default.txt").unwrap();
        prop.set_from(Arc::new(Property::new())).unwrap();

        assert!(!prop.is_present());
        assert!(prop.get().is_err());
    }

    #[test]
    fn test_property_finalize() {
        let prop = Property::with_value("a");
        assert!(!prop.is_finalized());

        prop.finalize_value();
        prop.finalize_value();
        assert!(prop.is_finalized());
        assert_eq!(prop.set("b"), Err(PropertyError::Finalized));
        assert_eq!(prop.get().unwrap(), Value::from("a"));
    }

    #[test]
    fn test_mapped_is_not_configurable() {
        let mapped = Mapped::new(Property::with_value("lib"), |v| match v {
            Value::Str(s) => Ok(Value::Str(format!("{}.a", s))),
            other => Ok(other),
        });

        assert!(mapped.is_present());
        assert!(mapped.as_configurable().is_none());
        assert_eq!(mapped.get().unwrap(), Value::from("lib.a"));
    }

    #[test]
    fn test_env_var_missing() {
        let env = EnvVar::new("PROPCHECK_TEST_SURELY_UNSET_VARIABLE");
        assert!(!env.is_present());
        assert!(matches!(
            env.get(),
            Err(ResolveError::EmptyProvider { .. })
        ));
    }
}
