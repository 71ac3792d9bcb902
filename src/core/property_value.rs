//! Raw property value accessors.

use std::fmt;
use std::sync::Arc;

use crate::core::deferred::{DeferredValue, ResolveError};

/// Access to the value currently configured for a property.
pub trait PropertyValue: Send + Sync {
    /// Read the configured raw value. Cheap, but may call a getter.
    fn call(&self) -> Result<DeferredValue, ResolveError>;

    /// Ask the underlying value to lock its configuration, if it can.
    fn maybe_finalize_value(&self);
}

/// A property value fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticValue {
    value: DeferredValue,
}

impl StaticValue {
    pub fn new(value: impl Into<DeferredValue>) -> Self {
        StaticValue {
            value: value.into(),
        }
    }
}

impl PropertyValue for StaticValue {
    fn call(&self) -> Result<DeferredValue, ResolveError> {
        Ok(self.value.clone())
    }

    fn maybe_finalize_value(&self) {
        if let DeferredValue::Provider(p) = &self.value {
            if let Some(configurable) = p.as_configurable() {
                configurable.finalize_value();
            }
        }
    }
}

type Getter = Arc<dyn Fn() -> Result<DeferredValue, ResolveError> + Send + Sync>;

/// A property value read through a getter on every access.
#[derive(Clone)]
pub struct CallableValue {
    getter: Getter,
}

impl CallableValue {
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn() -> Result<DeferredValue, ResolveError> + Send + Sync + 'static,
    {
        CallableValue {
            getter: Arc::new(getter),
        }
    }
}

impl fmt::Debug for CallableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallableValue(..)")
    }
}

impl PropertyValue for CallableValue {
    fn call(&self) -> Result<DeferredValue, ResolveError> {
        (self.getter)()
    }

    // A getter may return a different value each time; nothing to lock.
    fn maybe_finalize_value(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{HasConfigurableValue, Property, Provider};
    use crate::core::value::Value;

    #[test]
    fn test_static_value_finalizes_configurable_provider() {
        let prop = Arc::new(Property::with_value("a"));
        let value = StaticValue::new(DeferredValue::shared(prop.clone()));

        value.maybe_finalize_value();
        value.maybe_finalize_value();
        assert!(prop.is_finalized());
        assert!(prop.set("b").is_err());
    }

    #[test]
    fn test_static_value_plain_is_noop() {
        let value = StaticValue::new(Value::from("a"));
        value.maybe_finalize_value();
        assert!(matches!(value.call().unwrap(), DeferredValue::Plain(_)));
    }

    #[test]
    fn test_callable_value_reads_each_time() {
        let prop = Arc::new(Property::new());
        let source = prop.clone();
        let value = CallableValue::new(move || {
            let v = source.get().ok();
            Ok(DeferredValue::from(v))
        });

        assert!(matches!(value.call().unwrap(), DeferredValue::Null));
        prop.set("x").unwrap();
        assert!(matches!(value.call().unwrap(), DeferredValue::Plain(_)));
    }
}
