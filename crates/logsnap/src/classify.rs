//! Type classification of logged values.

use serde::Serialize;
use serde::ser::Error as _;

use crate::denylist::DeniedTypes;
use crate::node::Node;
use crate::ser::{self, ConvertError, Converted, Shape};
use crate::typename;

/// A value that can be handed to the snapshot pipeline.
///
/// Every `Serialize` type is a `LogArg`; wrap values that must never be
/// traversed in [`Opaque`].
pub trait LogArg {
    /// Fully-qualified type identifier, as reported by `core::any::type_name`.
    fn type_name(&self) -> &'static str;

    /// Resource-bearing values are skipped without being looked at.
    fn is_resource(&self) -> bool {
        false
    }

    fn to_node(&self) -> Result<Converted, ConvertError>;
}

impl<T: Serialize + ?Sized> LogArg for T {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    fn to_node(&self) -> Result<Converted, ConvertError> {
        ser::to_node(self)
    }
}

/// Marks a value as an opaque resource (open handles, guards, connections).
/// The pipeline never introspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Opaque<T>(pub T);

impl<T> LogArg for Opaque<T> {
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    fn is_resource(&self) -> bool {
        true
    }

    fn to_node(&self) -> Result<Converted, ConvertError> {
        Err(ConvertError::custom("opaque values are never converted"))
    }
}

/// Handling strategy selected for a logged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Nil,
    StringLike,
    Scalar,
    OpaqueUnsafe,
    DeniedType,
    CompoundObject,
    ArrayLike,
    GenericContainer,
}

/// Classifies from the type alone. `None` means the value needs a general
/// conversion before it can be classified, see [`classify_converted`].
pub fn classify(value: Option<&dyn LogArg>, denied: &DeniedTypes) -> Option<Class> {
    let Some(value) = value else {
        return Some(Class::Nil);
    };
    let full = typename::strip_refs(value.type_name());
    let name = typename::runtime_name(full);
    if typename::is_string(name) || typename::is_formatted_message(name) {
        Some(Class::StringLike)
    } else if typename::is_primitive(name) {
        Some(Class::Scalar)
    } else if value.is_resource() {
        Some(Class::OpaqueUnsafe)
    } else if denied.contains(full)
        || denied.contains(typename::forwarded_name(full))
        || denied.contains(name)
    {
        Some(Class::DeniedType)
    } else {
        None
    }
}

/// Classifies a value from the shape its conversion produced.
pub fn classify_converted(type_name: &str, converted: &Converted) -> Class {
    match converted.shape {
        _ if matches!(converted.node, Node::Null) => Class::Nil,
        Shape::Struct | Shape::Map => Class::CompoundObject,
        Shape::Seq | Shape::Tuple if typename::is_array_like(type_name) => Class::ArrayLike,
        Shape::Seq | Shape::Tuple => Class::GenericContainer,
        Shape::Scalar => Class::Scalar,
    }
}
