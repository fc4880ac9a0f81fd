#![doc = include_str!("../README.md")]

pub mod classify;
pub mod context;
pub mod denylist;
pub mod diagnostics;
pub mod encode;
pub mod error;
pub mod node;
pub mod options;
pub mod prune;
pub mod ser;
pub mod snapshot;
pub mod typename;
pub mod url;

pub use crate::classify::{Class, LogArg, Opaque};
pub use crate::context::ContextBag;
pub use crate::denylist::DeniedTypes;
pub use crate::diagnostics::{DiagnosticSink, TracingSink};
pub use crate::error::{Error, Result};
pub use crate::node::{Node, Number};
pub use crate::options::Options;
pub use crate::snapshot::Snapshotter;
pub use crate::url::clean_partial_url;

use std::sync::LazyLock;

/// Field holding a wrapped scalar or array.
pub const LOG_ARG: &str = "logArg";
/// Field holding the type name of a compound value or of array elements.
pub const OBJECT_TYPE: &str = "objectType";
/// Field holding the merged context bag.
pub const CONTEXT: &str = "context";
/// Fields of the fallback emitted for snapshots over the field ceiling.
pub const INVALID: &str = "invalid";
pub const MESSAGE: &str = "message";

static DEFAULT: LazyLock<Snapshotter> = LazyLock::new(Snapshotter::default);

/// Snapshot with default options, the process-wide denylist and `tracing`
/// diagnostics. See [`Snapshotter::serialize_debug_data`].
pub fn serialize_debug_data(
    value: Option<&dyn LogArg>,
    serialize_simple_types: bool,
    context: Option<&ContextBag<'_>>,
) -> Option<String> {
    DEFAULT.serialize_debug_data(value, serialize_simple_types, context)
}
