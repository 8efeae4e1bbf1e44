//! The validation engine.
//!
//! [`validate`] checks a keyword list against a [`Schema`]: unknown keys
//! first (strict mode), then every schema key in declaration order. Each
//! key runs a small pipeline over `(key, spec, resolved value, errors so
//! far)`: required check, type check, custom validators. Stages append to
//! the key's error list and never short-circuit one another; only the type
//! check's internal recursion stops early. The outer loop never breaks on a
//! failing key, so the final report covers every offender.
//!
//! Validation is a pure function of its inputs. The only side effect is
//! invoking caller-supplied custom validators, which run unshielded: a
//! validator that panics propagates to the caller.

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::registry::{Validator, ValidatorRegistry};
use crate::schema::Schema;
use crate::value::{Keyword, Value};

/// Options controlling a validation run.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// When true, input keys absent from the schema are errors.
    pub strict: bool,
    /// Registry used to resolve named custom validators.
    pub registry: Option<Arc<ValidatorRegistry>>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            registry: None,
        }
    }
}

impl ValidateOptions {
    /// Non-strict options: unknown input keys are ignored.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            registry: None,
        }
    }

    /// Attach a validator registry.
    pub fn with_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }
}

/// An ordered accumulation of per-key error messages.
///
/// Keys appear in discovery order: unknown-key errors first (input order),
/// then failing schema keys in declaration order. Each key's messages
/// preserve the order they were appended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Errors {
    entries: Vec<(String, Vec<String>)>,
}

impl Errors {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no key has errors.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of keys with errors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append one message under a key.
    pub fn push(&mut self, key: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == key) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((key.to_string(), vec![message])),
        }
    }

    /// Append several messages under a key. No entry is created for an
    /// empty list.
    pub fn extend_key(&mut self, key: &str, messages: Vec<String>) {
        for message in messages {
            self.push(key, message);
        }
    }

    /// Messages recorded for a key.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(key, messages)` in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, messages)) in self.entries.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{key}: [{}]",
                messages.iter().map(|m| format!("{m:?}")).join(", ")
            )?;
        }
        Ok(())
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, messages) in &self.entries {
            map.serialize_entry(key, messages)?;
        }
        map.end()
    }
}

/// Validate a keyword list against a schema.
///
/// On success, returns the validated list: every applicable key with its
/// normalized value, in processing order. A key is applicable when the
/// input contains it, its spec is required, or its spec carries a non-nil
/// default; other keys are skipped entirely. On failure, returns the full
/// error report.
///
/// # Errors
/// The accumulated [`Errors`] report, covering every failing key.
pub fn validate(
    input: &[(String, Value)],
    schema: &Schema,
    opts: &ValidateOptions,
) -> Result<Keyword, Errors> {
    let mut errors = Errors::new();

    if opts.strict {
        for (key, _) in input {
            if schema.get(key).is_none() {
                errors.push(key, "is not a valid key");
            }
        }
    }

    let mut output = Keyword::new();
    for (key, spec) in schema.keys() {
        let present = input.iter().find(|(name, _)| name == key);
        // A nil default does not count as having one; a required key is
        // processed regardless.
        let applicable =
            present.is_some() || spec.required || !spec.default.is_nil();
        if !applicable {
            continue;
        }

        let resolved = match present {
            Some((_, value)) => value.clone(),
            None => spec.default.clone(),
        };

        let mut key_errors: Vec<String> = Vec::new();

        // The required violation keys on the nil sentinel itself, not on
        // whether a default was supplied.
        if spec.required && resolved.is_nil() {
            key_errors.push("is a required key".to_string());
        }

        let checked = match spec.is.check(&resolved, opts) {
            Ok(normalized) => normalized,
            Err(message) => {
                key_errors.push(message);
                resolved.clone()
            }
        };

        // Custom validators always run, even after a failed type check.
        for validator in &spec.custom {
            key_errors.extend(run_validator(validator, key, &checked, opts));
        }

        if key_errors.is_empty() {
            output.push((key.to_string(), checked));
        } else {
            errors.extend_key(key, key_errors);
        }
    }

    if errors.is_empty() {
        Ok(output)
    } else {
        Err(errors)
    }
}

/// Validate a keyword list, panicking with a formatted report on failure.
///
/// # Panics
/// With a message embedding the original input and every key's error list:
///
/// ```text
/// Invalid keyword given.
///
/// Keyword:
///
/// [foo: 0]
///
/// Invalid:
///
/// foo: ["must be an atom"]
/// ```
pub fn expect_valid(
    input: &[(String, Value)],
    schema: &Schema,
    opts: &ValidateOptions,
) -> Keyword {
    match validate(input, schema, opts) {
        Ok(validated) => validated,
        Err(errors) => panic!("{}", render_invalid(input, &errors)),
    }
}

fn render_invalid(input: &[(String, Value)], errors: &Errors) -> String {
    format!(
        "Invalid keyword given.\n\nKeyword:\n\n{}\n\nInvalid:\n\n{}",
        Value::Keyword(input.to_vec()),
        errors
    )
}

fn run_validator(
    validator: &Validator,
    key: &str,
    value: &Value,
    opts: &ValidateOptions,
) -> Vec<String> {
    match validator {
        Validator::Fun(fun) => fun(key, value),
        Validator::Named { module, function } => {
            let Some(fun) = opts
                .registry
                .as_ref()
                .and_then(|registry| registry.get(module, function))
            else {
                panic!("no validator registered for {module}.{function}");
            };
            fun(key, value)
        }
    }
}
