//! The snapshot pipeline: classify, convert, merge context, prune, encode.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use crate::classify::{self, Class, LogArg};
use crate::context::ContextBag;
use crate::denylist::DeniedTypes;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::options::Options;
use crate::ser::{Converted, Shape};
use crate::{CONTEXT, OBJECT_TYPE, encode, prune, typename};

/// Turns logged values into bounded JSON snapshots.
///
/// None of the methods fail or panic: every problem is reported to the
/// [`DiagnosticSink`] and degrades the output instead.
///
/// Panics raised by `Serialize` impls are caught and reported only through
/// the sink. To keep them off stderr, the first conversion wraps the
/// process panic hook once; the wrapper stays silent while a conversion is
/// running on the current thread and defers to the previous hook otherwise.
/// A hook installed later with [`std::panic::set_hook`] replaces it.
#[derive(Clone)]
pub struct Snapshotter {
    options: Options,
    denied: Arc<DeniedTypes>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for Snapshotter {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl core::fmt::Debug for Snapshotter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Snapshotter")
            .field("options", &self.options)
            .field("denied", &self.denied.len())
            .finish_non_exhaustive()
    }
}

impl Snapshotter {
    /// Uses the process-wide denylist and reports through `tracing`.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            denied: DeniedTypes::global(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_denied_types(mut self, denied: Arc<DeniedTypes>) -> Self {
        self.denied = denied;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn denied_types(&self) -> &Arc<DeniedTypes> {
        &self.denied
    }

    /// JSON snapshot of `value` and `context`, or `None` when there is
    /// nothing worth attaching to the log entry.
    ///
    /// With `serialize_simple_types` unset, strings and scalars produce no
    /// `logArg`: they are the log message itself and would only repeat it.
    pub fn serialize_debug_data(
        &self,
        value: Option<&dyn LogArg>,
        serialize_simple_types: bool,
        context: Option<&ContextBag<'_>>,
    ) -> Option<String> {
        let node = self.snapshot(value, serialize_simple_types, context)?;
        self.recover(encode::to_json(&node))
    }

    /// Same as [`serialize_debug_data`](Self::serialize_debug_data), stopping
    /// before the tree is encoded.
    pub fn snapshot(
        &self,
        value: Option<&dyn LogArg>,
        serialize_simple_types: bool,
        context: Option<&ContextBag<'_>>,
    ) -> Option<Node> {
        let mut root = value.and_then(|v| self.convert_primary(v, serialize_simple_types));
        if let Some(bag) = context.filter(|bag| !bag.is_empty()) {
            root.get_or_insert_with(Node::empty_object)
                .insert(CONTEXT, self.merge_context(bag));
        }
        let root = root?;
        self.recover(prune::prune(root, self.options.max_fields))
    }

    fn convert_primary(&self, value: &dyn LogArg, serialize_simple_types: bool) -> Option<Node> {
        let full = typename::strip_refs(value.type_name());
        match self.primary_node(value, full, serialize_simple_types) {
            Ok(node) => node,
            Err(err) => {
                // A borrowed `RefCell<T>` failing says nothing about `T`, so
                // only plain forwarding wrappers deny their contents too.
                self.denied.insert(full);
                self.denied.insert(typename::forwarded_name(full));
                self.sink.report(&err.to_string());
                None
            }
        }
    }

    fn primary_node(
        &self,
        value: &dyn LogArg,
        full: &str,
        serialize_simple_types: bool,
    ) -> Result<Option<Node>> {
        let name = typename::runtime_name(full);
        match classify::classify(Some(value), &self.denied) {
            Some(Class::StringLike | Class::Scalar) => {
                if !serialize_simple_types {
                    return Ok(None);
                }
                let converted = convert_guarded(value, full)?;
                Ok(simple_node(converted.node))
            }
            Some(_) => Ok(None),
            None => {
                let converted = convert_guarded(value, full)?;
                Ok(match classify::classify_converted(name, &converted) {
                    Class::CompoundObject => Some(compound_node(name, converted)),
                    Class::ArrayLike => Some(array_node(name, converted.node)),
                    Class::GenericContainer => Some(container_node(name, converted.node)),
                    Class::Scalar | Class::StringLike if serialize_simple_types => {
                        simple_node(converted.node)
                    }
                    _ => None,
                })
            }
        }
    }

    fn merge_context(&self, bag: &ContextBag<'_>) -> Node {
        let mut props = Node::empty_object();
        for (key, value) in bag.iter() {
            if value.is_resource() {
                continue;
            }
            // Scalars and compounds share the converter; only the resulting
            // node differs.
            let name = typename::strip_refs(value.type_name());
            match convert_guarded(value, name) {
                Ok(converted) => props.insert(key, converted.node),
                Err(err) => self.sink.report(&format!("context `{key}`: {err}")),
            }
        }
        props
    }

    fn recover<T>(&self, result: Result<T>) -> Option<T> {
        result.map_err(|err| self.sink.report(&err.to_string())).ok()
    }
}

thread_local! {
    static CONVERTING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CONVERTING.try_with(Cell::get).unwrap_or(false) {
                previous(info);
            }
        }));
    });
}

/// Runs the conversion, turning both serializer errors and panics raised by
/// `Serialize` impls into [`Error`]s.
fn convert_guarded(value: &dyn LogArg, name: &str) -> Result<Converted> {
    install_quiet_hook();
    let outer = CONVERTING.with(|flag| flag.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(|| value.to_node()));
    CONVERTING.with(|flag| flag.set(outer));
    match result {
        Ok(Ok(converted)) => Ok(converted),
        Ok(Err(err)) => Err(Error::Convert {
            type_name: name.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => Err(Error::Panicked {
            type_name: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn simple_node(value: Node) -> Option<Node> {
    match value {
        Node::Null => None,
        value => Some(Node::log_arg(value)),
    }
}

/// Structs and enum variants carry their type name; maps, dynamic values and
/// anonymous types describe themselves.
fn compound_node(name: &str, converted: Converted) -> Node {
    let Converted { mut node, shape } = converted;
    let annotate = shape == Shape::Struct
        && !typename::is_primitive_or_string(name)
        && !typename::is_anonymous(name)
        && !typename::is_self_describing(name)
        && !node.contains_key(OBJECT_TYPE);
    if annotate {
        node.insert(OBJECT_TYPE, Node::from(name));
    }
    node
}

/// Arrays, slices and tuples are annotated with their element type.
fn array_node(name: &str, elements: Node) -> Node {
    let is_empty = matches!(&elements, Node::Array(items) if items.is_empty());
    let mut node = Node::log_arg(elements);
    if !is_empty {
        if let Some(element) = typename::array_element(name).map(typename::runtime_name) {
            annotate_element(&mut node, element);
        }
    }
    node
}

/// Generic collections are annotated with their first type argument, or with
/// their own name when they have none.
fn container_node(name: &str, elements: Node) -> Node {
    let mut node = Node::log_arg(elements);
    match typename::generic_args(name).first() {
        Some(arg) => annotate_element(&mut node, typename::runtime_name(arg)),
        None if !typename::is_self_describing(name) => node.insert(OBJECT_TYPE, Node::from(name)),
        None => {}
    }
    node
}

fn annotate_element(node: &mut Node, element: &str) {
    if !typename::is_primitive_or_string(element) && !typename::is_anonymous(element) {
        node.insert(OBJECT_TYPE, Node::from(element));
    }
}
