//! Markdown rendering of schema key documentation.
//!
//! Reads the stored doc/required/default fields only; no validation logic.

use std::fmt::Write;

use crate::schema::Schema;

/// Render one bullet per documented key, in schema order.
///
/// A key with a disabled doc is skipped. The default clause is added only
/// when the key carries a non-nil default.
pub fn docs(schema: &Schema) -> String {
    let mut out = String::new();
    for (key, spec) in schema.keys() {
        let Some(text) = spec.doc.as_deref() else {
            continue;
        };
        let _ = write!(out, "* `{key}` - ");
        if spec.required {
            out.push_str("Required. ");
        }
        out.push_str(text);
        if !spec.default.is_nil() {
            let _ = write!(out, " Defaults to `{}`.", spec.default);
        }
        out.push('\n');
    }
    out
}
