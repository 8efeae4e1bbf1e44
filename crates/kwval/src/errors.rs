//! Error types for kwval.
//!
//! Only schema construction can fail with a hard error: a raw schema that is
//! not a keyword list, or a key whose option record does not pass
//! meta-validation. Validation itself never produces a `SchemaError`; invalid
//! input aggregates into an [`Errors`](crate::validate::Errors) report
//! instead.

use thiserror::Error;

/// Construction-time schema failures.
///
/// The `Display` strings are part of the public contract; the panicking
/// constructors ([`Schema::new`](crate::schema::Schema::new) and
/// [`SchemaBuilder::build`](crate::schema::SchemaBuilder::build)) surface
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A key's option record is not a keyword list or failed meta-validation.
    #[error("Options given for schema key {0} are invalid.")]
    InvalidKey(String),
    /// The raw schema is not a keyword list.
    #[error("Invalid schema. Must be a keyword list.")]
    InvalidShape,
}

/// Result alias for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;
