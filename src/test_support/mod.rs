//! Test instrumentation for propcheck unit tests.
//!
//! Providers and factories here count how often they are forced, so tests
//! can assert that presence checks stay lazy and resolution is memoized.
//!
//! # Example
//!
//! ```rust,ignore
//! use propcheck::test_support::CountingProvider;
//!
//! let provider = CountingProvider::absent();
//! let counter = provider.counter();
//! // ... validate a property wrapping `provider` ...
//! assert_eq!(counter.get(), 0);
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::action::ValidationAction;
use crate::core::context::{PropertyValidationContext, PropertyValidationError};
use crate::core::deferred::{FactoryFn, ResolveError};
use crate::core::provider::Provider;
use crate::core::resolver::Resolver;
use crate::core::value::Value;

pub use fixtures::*;

/// Shared count of forced resolutions.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCounter(Arc<AtomicUsize>);

impl ResolutionCounter {
    /// Number of resolutions so far.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A provider that counts calls to `get()`.
///
/// Clones share the same counter.
#[derive(Debug, Clone)]
pub struct CountingProvider {
    present: bool,
    value: Result<Value, ResolveError>,
    counter: ResolutionCounter,
}

impl CountingProvider {
    /// Present, resolving to `value`.
    pub fn present(value: Value) -> Self {
        CountingProvider {
            present: true,
            value: Ok(value),
            counter: ResolutionCounter::default(),
        }
    }

    /// Reports no value; forcing it fails.
    pub fn absent() -> Self {
        CountingProvider {
            present: false,
            value: Err(ResolveError::EmptyProvider {
                provider: "counting provider".to_string(),
            }),
            counter: ResolutionCounter::default(),
        }
    }

    /// Reports a value, but forcing it fails.
    pub fn failing() -> Self {
        CountingProvider {
            present: true,
            value: Err(ResolveError::computation("counting provider failed")),
            counter: ResolutionCounter::default(),
        }
    }

    pub fn counter(&self) -> ResolutionCounter {
        self.counter.clone()
    }
}

impl Provider for CountingProvider {
    fn is_present(&self) -> bool {
        self.present
    }

    fn get(&self) -> Result<Value, ResolveError> {
        self.counter.bump();
        self.value.clone()
    }
}

/// A factory that counts its calls.
#[derive(Debug, Clone)]
pub struct CountingFactory {
    value: Result<Value, ResolveError>,
    counter: ResolutionCounter,
}

impl CountingFactory {
    pub fn returning(value: Value) -> Self {
        CountingFactory {
            value: Ok(value),
            counter: ResolutionCounter::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        CountingFactory {
            value: Err(ResolveError::computation(message)),
            counter: ResolutionCounter::default(),
        }
    }

    pub fn counter(&self) -> ResolutionCounter {
        self.counter.clone()
    }

    /// Turn into a factory closure for `DeferredValue::Factory`.
    pub fn into_fn(self) -> FactoryFn {
        Arc::new(move || {
            self.counter.bump();
            self.value.clone()
        })
    }
}

/// An action that forces the value twice and reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveTwice;

impl ValidationAction for ResolveTwice {
    fn validate(
        &self,
        _property_name: &str,
        value: &Resolver<'_>,
        _context: &mut dyn PropertyValidationContext,
    ) -> Result<(), PropertyValidationError> {
        value.get()?;
        value.get()?;
        Ok(())
    }
}
