//! Custom validators and the named-validator registry.
//!
//! A custom validator is either a direct callable or a named reference to an
//! external function. Named references resolve through a
//! [`ValidatorRegistry`] injected via
//! [`ValidateOptions`](crate::validate::ValidateOptions); the engine never
//! performs reflection.
//!
//! Requirements:
//! - stable ordering for lookups and iteration
//! - clear errors for duplicate registration
//! - no global mutable state

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::value::Value;

/// A custom validation callable: `(key, value)` to a list of error strings.
///
/// An empty list means the value passed. Returned strings are treated
/// opaquely and appended to the key's error list as-is.
pub type ValidatorFn = Arc<dyn Fn(&str, &Value) -> Vec<String> + Send + Sync>;

/// A custom validator attached to a schema key.
#[derive(Clone)]
pub enum Validator {
    /// A direct callable.
    Fun(ValidatorFn),
    /// A named reference, resolved through a [`ValidatorRegistry`].
    Named {
        /// Module segment of the reference.
        module: String,
        /// Function segment of the reference.
        function: String,
    },
}

impl Validator {
    /// Wrap a callable.
    pub fn new(fun: impl Fn(&str, &Value) -> Vec<String> + Send + Sync + 'static) -> Self {
        Validator::Fun(Arc::new(fun))
    }

    /// Reference an externally registered function.
    pub fn named(module: impl Into<String>, function: impl Into<String>) -> Self {
        Validator::Named {
            module: module.into(),
            function: function.into(),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Fun(_) => write!(f, "Validator::Fun"),
            Validator::Named { module, function } => {
                write!(f, "Validator::Named({module}.{function})")
            }
        }
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Validator::Fun(a), Validator::Fun(b)) => Arc::ptr_eq(a, b),
            (
                Validator::Named { module, function },
                Validator::Named {
                    module: other_module,
                    function: other_function,
                },
            ) => module == other_module && function == other_function,
            _ => false,
        }
    }
}

/// A registry of named validator functions.
///
/// Keyed `"Module.function"`. Iteration order is deterministic because the
/// store is a `BTreeMap`; registration order does not matter.
#[derive(Default)]
pub struct ValidatorRegistry {
    entries: BTreeMap<String, ValidatorFn>,
}

impl ValidatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a validator under `module.function`.
    ///
    /// # Errors
    /// Fails when the id is already registered.
    pub fn register(
        &mut self,
        module: &str,
        function: &str,
        fun: impl Fn(&str, &Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Result<()> {
        let id = Self::id(module, function);
        if self.entries.contains_key(&id) {
            anyhow::bail!("validator already registered: {id}");
        }
        self.entries.insert(id, Arc::new(fun));
        Ok(())
    }

    /// Look up a validator by reference.
    pub fn get(&self, module: &str, function: &str) -> Option<ValidatorFn> {
        self.entries.get(&Self::id(module, function)).cloned()
    }

    /// List registered ids in deterministic order.
    pub fn list_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn id(module: &str, function: &str) -> String {
        format!("{module}.{function}")
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorRegistry({} validators)", self.entries.len())
    }
}
