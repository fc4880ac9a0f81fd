//! Conversion of any `Serialize` value into a [`Node`] tree.
//!
//! serde's data model stands in for runtime type inspection: the serializer
//! records which kind of call the root value made (struct, map, sequence,
//! tuple or scalar), which is what the snapshot pipeline classifies on.

mod node_builder;

use serde::Serialize;

use crate::node::Node;

pub use node_builder::ConvertError;

/// Kind of serde call made by the root of a converted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Booleans, numbers, strings, unit variants, `None`.
    Scalar,
    /// `serialize_seq`: vectors, slices, sets.
    Seq,
    /// `serialize_tuple`: fixed-size arrays, tuples, tuple structs.
    Tuple,
    /// `serialize_map`: maps and other self-describing key/value shapes.
    Map,
    /// `serialize_struct` and the data-carrying enum variants.
    Struct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub node: Node,
    pub shape: Shape,
}

/// Converts `value`, eliding any nested value already being converted
/// further up the current path.
pub fn to_node<T: Serialize + ?Sized>(value: &T) -> Result<Converted, ConvertError> {
    let mut ser = node_builder::NodeSerializer::default();
    let node = ser.visit(value)?.unwrap_or(Node::Null);
    Ok(Converted {
        node,
        shape: ser.root_shape(),
    })
}
