//! kwval
//!
//! Validation of keyword lists (ordered `(name, value)` pairs) against
//! declarative schemas:
//! - a closed, recursively nestable type-constraint algebra ([`Type`])
//! - per-key defaults, required flags, and custom validators ([`Schema`])
//! - an engine that checks every key and aggregates precise error messages
//!   in a structured, ordered report ([`validate`], [`Errors`])
//! - schemas that validate their own option records with the same engine
//!   at construction time
//!
//! The crate is a pure computation: no I/O, no global state, no clocks. A
//! constructed [`Schema`] is immutable and safe for unsynchronized
//! concurrent reads.
//!
//! ```
//! use kwval::{kw, validate, KeyOptions, Schema, Type, ValidateOptions, Value};
//!
//! let schema = Schema::builder()
//!     .key("name", KeyOptions::new().is(Type::Binary).required(true))
//!     .key("retries", KeyOptions::new().is(Type::Integer).default(3))
//!     .try_build()
//!     .unwrap();
//!
//! let validated = validate(&kw![name: "demo"], &schema, &ValidateOptions::default()).unwrap();
//! assert_eq!(validated[1], ("retries".to_string(), Value::Int(3)));
//! ```

pub mod docs;
pub mod errors;
pub mod registry;
pub mod schema;
pub mod types;
pub mod validate;
pub mod value;

pub use crate::docs::docs;
pub use crate::errors::{SchemaError, SchemaResult};
pub use crate::registry::{Validator, ValidatorFn, ValidatorRegistry};
pub use crate::schema::{KeyOptions, KeySpec, Schema, SchemaBuilder};
pub use crate::types::Type;
pub use crate::validate::{expect_valid, validate, Errors, ValidateOptions};
pub use crate::value::{FunValue, Keyword, Value};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::docs::docs;
    pub use crate::errors::{SchemaError, SchemaResult};
    pub use crate::registry::{Validator, ValidatorFn, ValidatorRegistry};
    pub use crate::schema::{KeyOptions, KeySpec, Schema, SchemaBuilder};
    pub use crate::types::Type;
    pub use crate::validate::{expect_valid, validate, Errors, ValidateOptions};
    pub use crate::value::{FunValue, Keyword, Value};
}
