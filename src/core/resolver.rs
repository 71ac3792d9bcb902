//! Compute-once access to a property's resolved value.

use std::cell::OnceCell;
use std::fmt;

use crate::core::deferred::{unpack, ResolveError, UnnestedValue};
use crate::core::value::Value;

/// Memoized resolver handed to a validation action.
///
/// The first call to [`Resolver::get`] forces the deferred value; every
/// later call returns the same outcome, failures included. A resolver lives
/// for a single validation call and is never shared across threads.
pub struct Resolver<'a> {
    unnested: &'a UnnestedValue,
    resolved: OnceCell<Result<Value, ResolveError>>,
}

impl<'a> Resolver<'a> {
    pub fn new(unnested: &'a UnnestedValue) -> Self {
        Resolver {
            unnested,
            resolved: OnceCell::new(),
        }
    }

    /// Get the resolved value, forcing it on first use.
    pub fn get(&self) -> Result<&Value, ResolveError> {
        self.resolved
            .get_or_init(|| unpack(self.unnested))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Whether the value has been forced yet.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("unnested", self.unnested)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingFactory, CountingProvider};
    use std::sync::Arc;

    #[test]
    fn test_resolver_forces_once() {
        let provider = CountingProvider::present(Value::from("a"));
        let counter = provider.counter();
        let unnested = UnnestedValue::Provider(Arc::new(provider));

        let resolver = Resolver::new(&unnested);
        assert!(!resolver.is_resolved());
        assert_eq!(resolver.get().unwrap(), &Value::from("a"));
        assert_eq!(resolver.get().unwrap(), &Value::from("a"));
        assert!(resolver.is_resolved());
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_resolver_memoizes_failure() {
        let factory = CountingFactory::failing("boom");
        let counter = factory.counter();
        let unnested = UnnestedValue::Factory(factory.into_fn());

        let resolver = Resolver::new(&unnested);
        assert!(resolver.get().is_err());
        assert!(resolver.get().is_err());
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_unused_resolver_never_forces() {
        let provider = CountingProvider::present(Value::from("a"));
        let counter = provider.counter();
        let unnested = UnnestedValue::Provider(Arc::new(provider));

        drop(Resolver::new(&unnested));
        assert_eq!(counter.get(), 0);
    }
}
