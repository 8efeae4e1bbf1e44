//! Runtime term model.
//!
//! The engine validates dynamically-typed terms: a keyword list pairs string
//! names with [`Value`]s, and a schema constrains those values. `Value` is a
//! closed enum covering every term kind the type algebra can speak about,
//! including callables with a declared arity and type descriptors themselves
//! (the latter so option records can carry an `is` constraint and be
//! meta-validated like any other keyword list).
//!
//! Guarantees:
//! - no interior mutability; values are plain data plus shared callables
//! - structural equality (callables compare by identity)
//! - stable `Display` renderings, embedded verbatim in error messages

use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::types::Type;

/// An ordered list of `(name, value)` pairs.
///
/// Names are not required to be unique in raw input; schema keys are.
pub type Keyword = Vec<(String, Value)>;

/// A callable term with a declared arity.
///
/// The callable receives its arguments as a slice and returns a single
/// value. Arity is declared, not inferred; the [`Type::FunctionArity`]
/// check compares against it.
#[derive(Clone)]
pub struct FunValue {
    arity: usize,
    fun: Arc<dyn Fn(&[Value]) -> Value + Send + Sync>,
}

impl FunValue {
    /// Wrap a callable with its declared arity.
    pub fn new(arity: usize, fun: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self {
            arity,
            fun: Arc::new(fun),
        }
    }

    /// Declared arity.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the callable.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.fun)(args)
    }
}

impl fmt::Debug for FunValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#Fun/{}", self.arity)
    }
}

impl PartialEq for FunValue {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity && Arc::ptr_eq(&self.fun, &other.fun)
    }
}

/// A runtime term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent-value sentinel. Distinct from every data value,
    /// including `false`.
    Nil,
    /// A boolean. Booleans also satisfy the `Atom` type check.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A named constant, rendered `:name`.
    Atom(String),
    /// UTF-8 text.
    Binary(String),
    /// Raw bytes.
    Bits(Vec<u8>),
    /// An ordered, heterogeneous list.
    List(Vec<Value>),
    /// A fixed-size tuple.
    Tuple(Vec<Value>),
    /// An association of arbitrary keys to values, insertion-ordered.
    Map(Vec<(Value, Value)>),
    /// A keyword list held as a first-class term.
    Keyword(Keyword),
    /// A tagged record.
    Struct {
        /// The type tag.
        tag: String,
        /// Named fields, insertion-ordered.
        fields: Vec<(String, Value)>,
    },
    /// A module reference.
    Module(String),
    /// A callable with declared arity.
    Fun(FunValue),
    /// An opaque process identifier.
    Pid(u64),
    /// An opaque port identifier.
    Port(u64),
    /// A type descriptor as a first-class term. Used by schema option
    /// records (`is: ...`) so that schemas can be meta-validated by the
    /// same engine they configure.
    Type(Box<Type>),
}

impl Value {
    /// Build an atom value.
    pub fn atom(name: impl Into<String>) -> Self {
        Value::Atom(name.into())
    }

    /// Build a binary (text) value.
    pub fn binary(text: impl Into<String>) -> Self {
        Value::Binary(text.into())
    }

    /// True for the absent-value sentinel.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Translate a JSON value into a term.
    ///
    /// Null maps to `Nil`, numbers to `Int` where they fit and `Float`
    /// otherwise, strings to `Binary`, arrays to `List`, and objects to
    /// `Keyword` (JSON object keys are names).
    #[cfg(feature = "json")]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Nil),
            serde_json::Value::String(s) => Value::Binary(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => Value::Keyword(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Binary(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Binary(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::Atom(name) => write!(f, ":{name}"),
            Value::Binary(text) => write!(f, "{text:?}"),
            Value::Bits(bytes) => {
                write!(f, "<<{}>>", bytes.iter().map(|b| b.to_string()).join(", "))
            }
            Value::List(items) => {
                write!(f, "[{}]", items.iter().map(|v| v.to_string()).join(", "))
            }
            Value::Tuple(items) => {
                write!(f, "{{{}}}", items.iter().map(|v| v.to_string()).join(", "))
            }
            Value::Map(entries) => write!(
                f,
                "%{{{}}}",
                entries
                    .iter()
                    .map(|(k, v)| format!("{k} => {v}"))
                    .join(", ")
            ),
            Value::Keyword(pairs) => write!(
                f,
                "[{}]",
                pairs.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
            ),
            Value::Struct { tag, fields } => write!(
                f,
                "%{tag}{{{}}}",
                fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .join(", ")
            ),
            Value::Module(name) => write!(f, "{name}"),
            Value::Fun(fun) => write!(f, "#Fun/{}", fun.arity()),
            Value::Pid(id) => write!(f, "#PID<{id}>"),
            Value::Port(id) => write!(f, "#Port<{id}>"),
            Value::Type(ty) => write!(f, "{ty}"),
        }
    }
}

/// Build a keyword list from `name: value` pairs.
///
/// Values go through [`Value::from`], so literals work directly:
///
/// ```
/// use kwval::{kw, Value};
///
/// let pairs = kw![name: "demo", retries: 3, fast: true];
/// assert_eq!(pairs[1], ("retries".to_string(), Value::Int(3)));
/// ```
#[macro_export]
macro_rules! kw {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::value::Value)>::new()
    };
    ($($key:ident : $value:expr),+ $(,)?) => {
        ::std::vec![
            $((
                ::std::string::String::from(stringify!($key)),
                $crate::value::Value::from($value),
            )),+
        ]
    };
}
