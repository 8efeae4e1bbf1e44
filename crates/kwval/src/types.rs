//! The type-constraint algebra.
//!
//! [`Type`] is a closed set of descriptors, recursively nestable, with one
//! variant per constraint the engine understands. Descriptors form a tree:
//! schema-valued descriptors reference an already-constructed
//! [`Schema`](crate::schema::Schema), never themselves, so construction
//! cannot cycle. Runtime recursion is bounded by the depth of the descriptor
//! tree.
//!
//! Matching is a pure recursive function with no shared state:
//! [`Type::matches`] either returns the (possibly normalized) value or a
//! fixed, human-readable message. Normalization matters for composites:
//! nested keyword validation fills defaults, and list/tuple checks rebuild
//! their elements from the normalized results.

use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::schema::Schema;
use crate::validate::{validate, ValidateOptions};
use crate::value::{Keyword, Value};

/// A type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Matches any value, including nil.
    Any,
    /// Matches exactly one value, by structural equality.
    Equal(Box<Value>),
    /// Matches atoms and booleans, never nil.
    Atom,
    /// Matches UTF-8 text.
    Binary,
    /// Matches text or raw bytes.
    Bitstring,
    /// Matches booleans.
    Boolean,
    /// Matches floats.
    Float,
    /// Matches integers.
    Integer,
    /// Matches integers and floats.
    Number,
    /// Matches any callable.
    Function,
    /// Matches a callable with the given declared arity.
    FunctionArity(usize),
    /// Matches any member of the given set, by structural equality,
    /// in order.
    In(Vec<Value>),
    /// Matches lists and keyword lists.
    List,
    /// Matches a list whose every element satisfies the inner descriptor.
    ListOf(Box<Type>),
    /// Matches maps.
    Map,
    /// Matches tuples of any size.
    Tuple,
    /// Matches tuples of exactly the given size.
    TupleSize(usize),
    /// Matches tuples positionally against the given descriptors.
    TupleShape(Vec<Type>),
    /// Matches keyword lists (unique names), normalizing a list of
    /// `{atom, value}` pairs into keyword form.
    Keyword,
    /// Matches a keyword list that validates against the given schema.
    /// Nested validation runs the full engine; only pass/fail bubbles up.
    KeywordOf(Schema),
    /// Matches any tagged record.
    Struct,
    /// Matches a tagged record with the given tag.
    StructOf(String),
    /// Matches module references.
    Module,
    /// Matches `{module, args}` tuples.
    ModuleArgs,
    /// Matches `{module, function}` tuples.
    ModuleFunction,
    /// Matches process identifiers.
    Pid,
    /// Matches port identifiers.
    Port,
    /// Matches integers and the `:infinity` atom.
    Timeout,
    /// Matches if any of the given descriptors match, tried in order.
    OneOf(Vec<Type>),
}

impl Type {
    /// Check a value against this descriptor.
    ///
    /// Returns the normalized value on success, or the fixed error message
    /// on failure. Named custom validators inside nested schemas resolve
    /// against no registry here; use the engine with
    /// [`ValidateOptions`](crate::validate::ValidateOptions) when one is
    /// needed.
    pub fn matches(&self, value: &Value) -> Result<Value, String> {
        self.check(value, &ValidateOptions::default())
    }

    pub(crate) fn check(&self, value: &Value, opts: &ValidateOptions) -> Result<Value, String> {
        match self {
            Type::Any => Ok(value.clone()),
            Type::Equal(expected) => {
                if value == expected.as_ref() {
                    Ok(value.clone())
                } else {
                    Err(format!("must be equal to: {expected}"))
                }
            }
            // Booleans count as atoms; nil never does.
            Type::Atom => match value {
                Value::Atom(_) | Value::Bool(_) => Ok(value.clone()),
                _ => Err("must be an atom".to_string()),
            },
            Type::Binary => match value {
                Value::Binary(_) => Ok(value.clone()),
                _ => Err("must be a binary".to_string()),
            },
            Type::Bitstring => match value {
                Value::Binary(_) | Value::Bits(_) => Ok(value.clone()),
                _ => Err("must be a bitstring".to_string()),
            },
            Type::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err("must be a boolean".to_string()),
            },
            Type::Float => match value {
                Value::Float(_) => Ok(value.clone()),
                _ => Err("must be a float".to_string()),
            },
            Type::Integer => match value {
                Value::Int(_) => Ok(value.clone()),
                _ => Err("must be an integer".to_string()),
            },
            Type::Number => match value {
                Value::Int(_) | Value::Float(_) => Ok(value.clone()),
                _ => Err("must be a number".to_string()),
            },
            Type::Function => match value {
                Value::Fun(_) => Ok(value.clone()),
                _ => Err("must be a function".to_string()),
            },
            Type::FunctionArity(arity) => match value {
                Value::Fun(fun) if fun.arity() == *arity => Ok(value.clone()),
                _ => Err(format!("must be a function of arity {arity}")),
            },
            Type::In(set) => {
                if set.iter().any(|member| member == value) {
                    Ok(value.clone())
                } else {
                    Err(format!(
                        "must be one of: [{}]",
                        set.iter().map(|v| v.to_string()).join(", ")
                    ))
                }
            }
            // A keyword list is a list.
            Type::List => match value {
                Value::List(_) | Value::Keyword(_) => Ok(value.clone()),
                _ => Err("must be a list".to_string()),
            },
            Type::ListOf(inner) => {
                let elements: Vec<Value> = match value {
                    Value::List(items) => items.clone(),
                    Value::Keyword(pairs) => pairs
                        .iter()
                        .map(|(name, v)| {
                            Value::Tuple(vec![Value::Atom(name.clone()), v.clone()])
                        })
                        .collect(),
                    _ => return Err(format!("must be a list of type {inner}")),
                };
                let mut normalized = Vec::with_capacity(elements.len());
                for element in &elements {
                    // First failing element short-circuits; which one failed
                    // is not reported.
                    match inner.check(element, opts) {
                        Ok(v) => normalized.push(v),
                        Err(_) => return Err(format!("must be a list of type {inner}")),
                    }
                }
                Ok(Value::List(normalized))
            }
            Type::Map => match value {
                Value::Map(_) => Ok(value.clone()),
                _ => Err("must be a map".to_string()),
            },
            Type::Tuple => match value {
                Value::Tuple(_) => Ok(value.clone()),
                _ => Err("must be a tuple".to_string()),
            },
            Type::TupleSize(size) => match value {
                Value::Tuple(items) if items.len() == *size => Ok(value.clone()),
                _ => Err(format!("must be a tuple of size {size}")),
            },
            Type::TupleShape(shape) => {
                let fail = || {
                    format!(
                        "must be a tuple with the structure: {{{}}}",
                        shape.iter().map(|t| t.to_string()).join(", ")
                    )
                };
                match value {
                    Value::Tuple(items) if items.len() == shape.len() => {
                        let mut normalized = Vec::with_capacity(items.len());
                        for (descriptor, item) in shape.iter().zip(items) {
                            match descriptor.check(item, opts) {
                                Ok(v) => normalized.push(v),
                                Err(_) => return Err(fail()),
                            }
                        }
                        Ok(Value::Tuple(normalized))
                    }
                    _ => Err(fail()),
                }
            }
            Type::Keyword => keyword_entries(value)
                .map(Value::Keyword)
                .ok_or_else(|| "must be a keyword list".to_string()),
            Type::KeywordOf(schema) => {
                let Some(entries) = keyword_entries(value) else {
                    return Err(format!("must be a keyword with structure: {schema}"));
                };
                let nested = ValidateOptions {
                    strict: true,
                    registry: opts.registry.clone(),
                };
                match validate(&entries, schema, &nested) {
                    Ok(validated) => Ok(Value::Keyword(validated)),
                    Err(_) => Err(format!("must be a keyword with structure: {schema}")),
                }
            }
            Type::Struct => match value {
                Value::Struct { .. } => Ok(value.clone()),
                _ => Err("must be a struct".to_string()),
            },
            Type::StructOf(tag) => match value {
                Value::Struct { tag: found, .. } if found == tag => Ok(value.clone()),
                _ => Err(format!("must be a struct of type {tag}")),
            },
            Type::Module => match value {
                Value::Module(_) => Ok(value.clone()),
                _ => Err("must be a module".to_string()),
            },
            Type::ModuleArgs => match value {
                Value::Tuple(items)
                    if items.len() == 2
                        && matches!(items[0], Value::Module(_))
                        && matches!(items[1], Value::List(_)) =>
                {
                    Ok(value.clone())
                }
                _ => Err("must be a module and args".to_string()),
            },
            Type::ModuleFunction => match value {
                Value::Tuple(items)
                    if items.len() == 2
                        && matches!(items[0], Value::Module(_))
                        && matches!(items[1], Value::Atom(_)) =>
                {
                    Ok(value.clone())
                }
                _ => Err("must be a module and function".to_string()),
            },
            Type::Pid => match value {
                Value::Pid(_) => Ok(value.clone()),
                _ => Err("must be a PID".to_string()),
            },
            Type::Port => match value {
                Value::Port(_) => Ok(value.clone()),
                _ => Err("must be a port".to_string()),
            },
            Type::Timeout => match value {
                Value::Int(_) => Ok(value.clone()),
                Value::Atom(name) if name == "infinity" => Ok(value.clone()),
                _ => Err("must be a timeout".to_string()),
            },
            Type::OneOf(options) => {
                for descriptor in options {
                    if let Ok(v) = descriptor.check(value, opts) {
                        return Ok(v);
                    }
                }
                Err(format!(
                    "must be one of the following: [{}]",
                    options.iter().map(|t| t.to_string()).join(", ")
                ))
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => write!(f, "Any"),
            Type::Equal(v) => write!(f, "Equal({v})"),
            Type::Atom => write!(f, "Atom"),
            Type::Binary => write!(f, "Binary"),
            Type::Bitstring => write!(f, "Bitstring"),
            Type::Boolean => write!(f, "Boolean"),
            Type::Float => write!(f, "Float"),
            Type::Integer => write!(f, "Integer"),
            Type::Number => write!(f, "Number"),
            Type::Function => write!(f, "Function"),
            Type::FunctionArity(n) => write!(f, "FunctionArity({n})"),
            Type::In(set) => write!(
                f,
                "In([{}])",
                set.iter().map(|v| v.to_string()).join(", ")
            ),
            Type::List => write!(f, "List"),
            Type::ListOf(inner) => write!(f, "ListOf({inner})"),
            Type::Map => write!(f, "Map"),
            Type::Tuple => write!(f, "Tuple"),
            Type::TupleSize(n) => write!(f, "TupleSize({n})"),
            Type::TupleShape(shape) => write!(
                f,
                "TupleShape([{}])",
                shape.iter().map(|t| t.to_string()).join(", ")
            ),
            Type::Keyword => write!(f, "Keyword"),
            Type::KeywordOf(schema) => write!(f, "KeywordOf({schema})"),
            Type::Struct => write!(f, "Struct"),
            Type::StructOf(tag) => write!(f, "StructOf({tag})"),
            Type::Module => write!(f, "Module"),
            Type::ModuleArgs => write!(f, "ModuleArgs"),
            Type::ModuleFunction => write!(f, "ModuleFunction"),
            Type::Pid => write!(f, "Pid"),
            Type::Port => write!(f, "Port"),
            Type::Timeout => write!(f, "Timeout"),
            Type::OneOf(options) => write!(
                f,
                "OneOf([{}])",
                options.iter().map(|t| t.to_string()).join(", ")
            ),
        }
    }
}

/// View a value as keyword entries with unique names.
///
/// Accepts a first-class keyword term or a list of `{atom, value}` 2-tuples.
/// Returns `None` for any other shape or when a name repeats.
pub(crate) fn keyword_entries(value: &Value) -> Option<Keyword> {
    let pairs: Keyword = match value {
        Value::Keyword(pairs) => pairs.clone(),
        Value::List(items) => {
            let mut pairs = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Tuple(parts) if parts.len() == 2 => match &parts[0] {
                        Value::Atom(name) => pairs.push((name.clone(), parts[1].clone())),
                        _ => return None,
                    },
                    _ => return None,
                }
            }
            pairs
        }
        _ => return None,
    };
    let mut seen = BTreeSet::new();
    for (name, _) in &pairs {
        if !seen.insert(name.as_str()) {
            return None;
        }
    }
    Some(pairs)
}
