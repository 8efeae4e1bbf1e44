//! Schema model and construction.
//!
//! A [`Schema`] is an ordered mapping from key name to [`KeySpec`], built
//! once and immutable thereafter. Construction is self-validating: every
//! key's option record is itself a keyword list, validated against a fixed
//! meta-schema through the ordinary engine before acceptance. Malformed
//! schemas are rejected at definition time, so the engine never sees one.
//!
//! The meta-schema is hand-constructed from primitive descriptor
//! constructors and exempt from its own validation, which would otherwise
//! be circular. Its defaults are what populate a [`KeySpec`] when an option
//! is omitted.

use std::fmt;
use std::sync::{Arc, OnceLock};

use itertools::Itertools;

use crate::errors::{SchemaError, SchemaResult};
use crate::registry::{Validator, ValidatorFn};
use crate::types::{keyword_entries, Type};
use crate::validate::{validate, Errors, ValidateOptions};
use crate::value::{FunValue, Keyword, Value};

/// One schema entry: the constraints attached to a single key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySpec {
    /// Type constraint.
    pub is: Type,
    /// Default value. `Nil` means no default.
    pub default: Value,
    /// Whether the key must resolve to a non-nil value.
    pub required: bool,
    /// Custom validators, run in declared order.
    pub custom: Vec<Validator>,
    /// Documentation text, or `None` when disabled.
    pub doc: Option<String>,
}

impl KeySpec {
    fn from_record(record: &Keyword) -> Self {
        let mut spec = KeySpec {
            is: Type::Any,
            default: Value::Nil,
            required: false,
            custom: Vec::new(),
            doc: None,
        };
        for (name, value) in record {
            match (name.as_str(), value) {
                ("is", Value::Type(ty)) => spec.is = (**ty).clone(),
                ("default", v) => spec.default = v.clone(),
                ("required", Value::Bool(b)) => spec.required = *b,
                ("custom", Value::List(items)) => {
                    spec.custom = items.iter().map(validator_from_value).collect();
                }
                ("doc", Value::Binary(text)) => spec.doc = Some(text.clone()),
                // A doc of `false` and any other meta-validated shape keep
                // the defaults above.
                _ => {}
            }
        }
        spec
    }
}

/// An ordered, immutable schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    keys: Vec<(String, KeySpec)>,
}

impl Schema {
    /// Build a schema from its raw keyword form, validating every option
    /// record against the meta-schema.
    ///
    /// # Errors
    /// [`SchemaError::InvalidShape`] when the raw schema is not a keyword
    /// list; [`SchemaError::InvalidKey`] when a key's option record is not a
    /// keyword list or fails meta-validation.
    pub fn try_new(raw: &Value) -> SchemaResult<Self> {
        let entries = keyword_entries(raw).ok_or(SchemaError::InvalidShape)?;
        let mut keys = Vec::with_capacity(entries.len());
        for (key, options) in &entries {
            let record =
                keyword_entries(options).ok_or_else(|| SchemaError::InvalidKey(key.clone()))?;
            let validated = validate(&record, meta_schema(), &ValidateOptions::default())
                .map_err(|_| SchemaError::InvalidKey(key.clone()))?;
            keys.push((key.clone(), KeySpec::from_record(&validated)));
        }
        Ok(Schema { keys })
    }

    /// Build a schema, panicking on a malformed one.
    ///
    /// # Panics
    /// With `"Invalid schema. Must be a keyword list."` or
    /// `"Options given for schema key <key> are invalid."`.
    pub fn new(raw: &Value) -> Self {
        match Self::try_new(raw) {
            Ok(schema) => schema,
            Err(error) => panic!("{error}"),
        }
    }

    /// Start a fluent builder.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Look up a key's spec.
    pub fn get(&self, key: &str) -> Option<&KeySpec> {
        self.keys
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, spec)| spec)
    }

    /// Iterate keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &KeySpec)> {
        self.keys.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true for a schema with no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validate a keyword list against this schema.
    ///
    /// # Errors
    /// Returns the accumulated [`Errors`] report when any key fails.
    pub fn validate(
        &self,
        input: &[(String, Value)],
        opts: &ValidateOptions,
    ) -> Result<Keyword, Errors> {
        validate(input, self, opts)
    }

    /// Validate a keyword list, panicking with a formatted report on
    /// failure.
    ///
    /// # Panics
    /// With the full `"Invalid keyword given."` rendering when validation
    /// fails.
    pub fn expect_valid(&self, input: &[(String, Value)], opts: &ValidateOptions) -> Keyword {
        crate::validate::expect_valid(input, self, opts)
    }

    /// Render the schema's key documentation.
    pub fn docs(&self) -> String {
        crate::docs::docs(self)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.keys
                .iter()
                .map(|(name, spec)| format!("{name}: {}", spec.is))
                .join(", ")
        )
    }
}

/// The fixed schema that validates key option records.
///
/// Hand-constructed and exempt from self-validation. Its defaults define
/// the `KeySpec` defaults: `is` falls back to `Any`, `required` to `false`,
/// `custom` to an empty list, and `doc` to disabled.
pub(crate) fn meta_schema() -> &'static Schema {
    static META: OnceLock<Schema> = OnceLock::new();
    META.get_or_init(|| {
        let is_type_descriptor = Validator::new(|_key, value| match value {
            Value::Type(_) => Vec::new(),
            _ => vec!["must be a type descriptor".to_string()],
        });
        Schema {
            keys: vec![
                (
                    "is".to_string(),
                    KeySpec {
                        is: Type::Any,
                        default: Value::Type(Box::new(Type::Any)),
                        required: false,
                        custom: vec![is_type_descriptor],
                        doc: None,
                    },
                ),
                (
                    "default".to_string(),
                    KeySpec {
                        is: Type::Any,
                        default: Value::Nil,
                        required: false,
                        custom: Vec::new(),
                        doc: None,
                    },
                ),
                (
                    "required".to_string(),
                    KeySpec {
                        is: Type::Boolean,
                        default: Value::Bool(false),
                        required: false,
                        custom: Vec::new(),
                        doc: None,
                    },
                ),
                (
                    "custom".to_string(),
                    KeySpec {
                        is: Type::ListOf(Box::new(Type::OneOf(vec![
                            Type::FunctionArity(2),
                            Type::ModuleFunction,
                        ]))),
                        default: Value::List(Vec::new()),
                        required: false,
                        custom: Vec::new(),
                        doc: None,
                    },
                ),
                (
                    "doc".to_string(),
                    KeySpec {
                        is: Type::OneOf(vec![
                            Type::Binary,
                            Type::Equal(Box::new(Value::Bool(false))),
                        ]),
                        default: Value::Bool(false),
                        required: false,
                        custom: Vec::new(),
                        doc: None,
                    },
                ),
            ],
        }
    })
}

/// Turn a meta-validated custom entry into a [`Validator`].
///
/// Callable entries are invoked with `[key_atom, value]` and must return a
/// list of error strings.
fn validator_from_value(value: &Value) -> Validator {
    match value {
        Value::Fun(fun) => {
            let fun = fun.clone();
            Validator::new(move |key, value| {
                match fun.call(&[Value::Atom(key.to_string()), value.clone()]) {
                    Value::List(items) => items
                        .into_iter()
                        .map(|item| match item {
                            Value::Binary(message) => message,
                            other => {
                                panic!("custom validator returned a non-string error: {other}")
                            }
                        })
                        .collect(),
                    other => {
                        panic!("custom validator must return a list of error strings, got: {other}")
                    }
                }
            })
        }
        Value::Tuple(parts) if parts.len() == 2 => {
            let module = match &parts[0] {
                Value::Module(name) => name.clone(),
                other => panic!("custom validator reference has a non-module head: {other}"),
            };
            let function = match &parts[1] {
                Value::Atom(name) => name.clone(),
                other => panic!("custom validator reference has a non-atom function: {other}"),
            };
            Validator::named(module, function)
        }
        other => panic!("meta-validated custom entry has an unexpected shape: {other}"),
    }
}

/// Fluent schema construction.
///
/// Assembles the raw keyword form and funnels it through [`Schema::try_new`],
/// so meta-validation runs exactly as it does for hand-built raw schemas.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    entries: Keyword,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a key with its options.
    pub fn key(mut self, name: impl Into<String>, options: KeyOptions) -> Self {
        self.entries.push((name.into(), options.into_record()));
        self
    }

    /// Build the schema.
    ///
    /// # Errors
    /// Same failure modes as [`Schema::try_new`].
    pub fn try_build(self) -> SchemaResult<Schema> {
        Schema::try_new(&Value::Keyword(self.entries))
    }

    /// Build the schema, panicking on a malformed one.
    ///
    /// # Panics
    /// Same messages as [`Schema::new`].
    pub fn build(self) -> Schema {
        Schema::new(&Value::Keyword(self.entries))
    }
}

/// Options for a single key, in builder form.
#[derive(Debug)]
pub struct KeyOptions {
    is: Option<Type>,
    default: Option<Value>,
    required: Option<bool>,
    custom: Vec<Value>,
    doc: Option<Value>,
}

impl KeyOptions {
    /// Create an empty option record.
    pub fn new() -> Self {
        Self {
            is: None,
            default: None,
            required: None,
            custom: Vec::new(),
            doc: None,
        }
    }

    /// Set the type constraint.
    pub fn is(mut self, ty: Type) -> Self {
        self.is = Some(ty);
        self
    }

    /// Set the default value.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Mark the key required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Append a direct custom validator.
    pub fn custom(
        mut self,
        fun: impl Fn(&str, &Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        let fun: ValidatorFn = Arc::new(fun);
        self.custom.push(Value::Fun(FunValue::new(2, move |args| {
            let key = match args.first() {
                Some(Value::Atom(name)) | Some(Value::Binary(name)) => name.clone(),
                _ => String::new(),
            };
            let value = args.get(1).cloned().unwrap_or(Value::Nil);
            Value::List(fun(&key, &value).into_iter().map(Value::Binary).collect())
        })));
        self
    }

    /// Append a named custom validator reference.
    pub fn custom_named(
        mut self,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        self.custom.push(Value::Tuple(vec![
            Value::Module(module.into()),
            Value::Atom(function.into()),
        ]));
        self
    }

    /// Set the documentation text.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = Some(Value::Binary(text.into()));
        self
    }

    fn into_record(self) -> Value {
        let mut record = Keyword::new();
        if let Some(ty) = self.is {
            record.push(("is".to_string(), Value::Type(Box::new(ty))));
        }
        if let Some(value) = self.default {
            record.push(("default".to_string(), value));
        }
        if let Some(required) = self.required {
            record.push(("required".to_string(), Value::Bool(required)));
        }
        if !self.custom.is_empty() {
            record.push(("custom".to_string(), Value::List(self.custom)));
        }
        if let Some(doc) = self.doc {
            record.push(("doc".to_string(), doc));
        }
        Value::Keyword(record)
    }
}
