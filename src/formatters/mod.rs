//! Bundled formatters
//!
//! - [`TextFormatter`]: `key=value` lines when piped, aligned and colored
//!   lines on a terminal
//! - [`JsonFormatter`]: one JSON object per line

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::{extract_prefix, FieldOrdering, TextFormatter, TextFormatterConfig};

use crate::core::Caller;
use std::sync::Arc;

/// Rewrites the reported function and file of a caller.
///
/// An empty string in either position drops that key from the output.
pub type CallerPrettyfier = Arc<dyn Fn(&Caller) -> (String, String) + Send + Sync>;

/// `(function, file:line)` for rendering, after the optional prettyfier
pub(crate) fn caller_parts(caller: &Caller, prettyfier: Option<&CallerPrettyfier>) -> (String, String) {
    match prettyfier {
        Some(pretty) => pretty(caller),
        None => (caller.function.clone(), caller.location()),
    }
}
