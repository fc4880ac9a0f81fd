use serde::Serialize;
use serde::ser::*;

use super::Shape;
use crate::node::{Number, Node};

/// Failure raised by a value's `Serialize` implementation, or by a map key
/// that cannot become an object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError(String);

impl core::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::ser::Error for ConvertError {
    fn custom<T: core::fmt::Display>(msg: T) -> Self {
        ConvertError(msg.to_string())
    }
}

impl core::error::Error for ConvertError {}

/// Builds a [`Node`] while tracking the identities of the values on the
/// active path. An identity is the value's address paired with its type
/// name, so a newtype and the value it wraps stay distinct.
///
/// Smart pointers and cells serialize their contents without passing through
/// [`visit`](Self::visit), so structs also record their own identity: the
/// address and type of their first field, together with the struct name.
#[derive(Default)]
pub(crate) struct NodeSerializer {
    path: Vec<(usize, &'static str)>,
    structs: Vec<(usize, &'static str, &'static str)>,
    // Set when the value just produced is a struct already open further up.
    elide: bool,
    root: Option<Shape>,
}

impl NodeSerializer {
    pub(crate) fn root_shape(&self) -> Shape {
        self.root.unwrap_or(Shape::Scalar)
    }

    fn mark(&mut self, shape: Shape) {
        if self.root.is_none() {
            self.root = Some(shape);
        }
    }

    /// Serializes a nested value. `Ok(None)` means the value is already on
    /// the active path and was elided.
    pub(crate) fn visit<T: ?Sized + Serialize>(
        &mut self,
        value: &T,
    ) -> Result<Option<Node>, ConvertError> {
        // Zero-sized values share addresses freely and cannot close a cycle.
        if core::mem::size_of_val(value) == 0 {
            let out = value.serialize(&mut *self);
            return self.finish(out);
        }
        let id = (
            (value as *const T).cast::<()>() as usize,
            core::any::type_name::<T>(),
        );
        if self.path.contains(&id) {
            return Ok(None);
        }
        self.path.push(id);
        let out = value.serialize(&mut *self);
        self.path.pop();
        self.finish(out)
    }

    fn finish(&mut self, out: Result<Node, ConvertError>) -> Result<Option<Node>, ConvertError> {
        let node = out?;
        if core::mem::take(&mut self.elide) {
            Ok(None)
        } else {
            Ok(Some(node))
        }
    }

    /// Opens the struct whose first field is `first`. Returns `false` when
    /// the same struct is already open on the active path.
    fn enter_struct<T: ?Sized>(&mut self, name: &'static str, first: &T) -> bool {
        let id = (
            (first as *const T).cast::<()>() as usize,
            name,
            core::any::type_name::<T>(),
        );
        if self.structs.contains(&id) {
            return false;
        }
        self.structs.push(id);
        true
    }

    /// Passes an elided inner value on to the enclosing [`visit`](Self::visit).
    fn forward(&mut self, inner: Option<Node>) -> Node {
        inner.unwrap_or_else(|| {
            self.elide = true;
            Node::Null
        })
    }
}

/// Cycle bookkeeping shared by struct and struct-variant serializers.
#[derive(Default)]
enum StructState {
    #[default]
    Unopened,
    Open,
    Elided,
}

impl StructState {
    /// Whether the field should be serialized.
    fn admit<T: ?Sized>(&mut self, ser: &mut NodeSerializer, name: &'static str, first: &T) -> bool {
        match *self {
            StructState::Open => true,
            StructState::Elided => false,
            StructState::Unopened if ser.enter_struct(name, first) => {
                *self = StructState::Open;
                true
            }
            StructState::Unopened => {
                *self = StructState::Elided;
                false
            }
        }
    }

    /// Closes the struct. An elided one becomes `Null` and flags the
    /// enclosing [`NodeSerializer::visit`] to drop it.
    fn close(self, ser: &mut NodeSerializer, node: Node) -> Node {
        match self {
            StructState::Open => {
                ser.structs.pop();
                node
            }
            StructState::Elided => {
                ser.elide = true;
                Node::Null
            }
            StructState::Unopened => node,
        }
    }
}

impl<'a> Serializer for &'a mut NodeSerializer {
    type Ok = Node;
    type Error = ConvertError;
    type SerializeSeq = SeqSerializer<'a>;
    type SerializeTuple = SeqSerializer<'a>;
    type SerializeTupleStruct = SeqSerializer<'a>;
    type SerializeTupleVariant = TupleVariantSerializer<'a>;
    type SerializeMap = MapSerializer<'a>;
    type SerializeStruct = MapSerializer<'a>;
    type SerializeStructVariant = StructVariantSerializer<'a>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::Bool(v))
    }
    fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(v as i64)
    }
    fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(v as i64)
    }
    fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
        self.serialize_i64(v as i64)
    }
    fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::Number(Number::I64(v)))
    }
    fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
        match i64::try_from(v) {
            Ok(small) => self.serialize_i64(small),
            Err(_) => self.serialize_str(&v.to_string()),
        }
    }
    fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(v as u64)
    }
    fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(v as u64)
    }
    fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
        self.serialize_u64(v as u64)
    }
    fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::Number(Number::U64(v)))
    }
    fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
        match u64::try_from(v) {
            Ok(small) => self.serialize_u64(small),
            Err(_) => self.serialize_str(&v.to_string()),
        }
    }
    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        self.serialize_f64(v as f64)
    }
    fn serialize_f64(self, f: f64) -> Result<Self::Ok, Self::Error> {
        if f.is_finite() {
            self.mark(Shape::Scalar);
            Ok(Node::Number(Number::F64(f)))
        } else {
            // JSON has no NaN or infinity; keep the value as text instead.
            self.serialize_str(ryu::Buffer::new().format(f))
        }
    }
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::String(v.to_string()))
    }
    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::String(v.to_string()))
    }
    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Seq);
        Ok(Node::Array(
            v.iter()
                .map(|b| Node::Number(Number::U64(*b as u64)))
                .collect(),
        ))
    }
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::Null)
    }
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok, Self::Error> {
        let inner = self.visit(value)?;
        Ok(self.forward(inner))
    }
    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Scalar);
        Ok(Node::Null)
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_str(variant)
    }
    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        let inner = self.visit(value)?;
        Ok(self.forward(inner))
    }
    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error> {
        self.mark(Shape::Struct);
        let inner = self.visit(value)?.unwrap_or(Node::Null);
        Ok(Node::Object(vec![(variant.to_string(), inner)]))
    }
    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        self.mark(Shape::Seq);
        Ok(SeqSerializer {
            ser: self,
            elems: Vec::with_capacity(len.unwrap_or(0)),
        })
    }
    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.mark(Shape::Tuple);
        Ok(SeqSerializer {
            ser: self,
            elems: Vec::with_capacity(len),
        })
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_tuple(len)
    }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        self.mark(Shape::Struct);
        Ok(TupleVariantSerializer {
            ser: self,
            elems: Vec::with_capacity(len),
            name: variant.to_string(),
        })
    }
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        self.mark(Shape::Map);
        Ok(MapSerializer {
            ser: self,
            map: Vec::new(),
            next_key: None,
            name: "",
            state: StructState::default(),
        })
    }
    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.mark(Shape::Struct);
        Ok(MapSerializer {
            ser: self,
            map: Vec::with_capacity(len),
            next_key: None,
            name,
            state: StructState::default(),
        })
    }
    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        self.mark(Shape::Struct);
        Ok(StructVariantSerializer {
            ser: self,
            map: Vec::with_capacity(len),
            name: variant,
            state: StructState::default(),
        })
    }
}

pub struct SeqSerializer<'a> {
    ser: &'a mut NodeSerializer,
    elems: Vec<Node>,
}

impl SerializeSeq for SeqSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        if let Some(node) = self.ser.visit(value)? {
            self.elems.push(node);
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Node::Array(self.elems))
    }
}

impl SerializeTuple for SeqSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Self::Ok, Self::Error> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SeqSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        SerializeSeq::serialize_element(self, value)
    }
    fn end(self) -> Result<Self::Ok, Self::Error> {
        SerializeSeq::end(self)
    }
}

pub struct TupleVariantSerializer<'a> {
    ser: &'a mut NodeSerializer,
    elems: Vec<Node>,
    name: String,
}

impl SerializeTupleVariant for TupleVariantSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        if let Some(node) = self.ser.visit(value)? {
            self.elems.push(node);
        }
        Ok(())
    }
    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Node::Object(vec![(self.name, Node::Array(self.elems))]))
    }
}

pub struct MapSerializer<'a> {
    ser: &'a mut NodeSerializer,
    map: Vec<(String, Node)>,
    next_key: Option<String>,
    name: &'static str,
    state: StructState,
}

impl SerializeMap for MapSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Self::Error> {
        // Keys get their own serializer so they never count toward the path
        // or the root shape.
        let mut ser = NodeSerializer::default();
        let s = match key.serialize(&mut ser)? {
            Node::String(s) => s,
            Node::Number(n) => n.to_string(),
            Node::Bool(b) => b.to_string(),
            Node::Null => "null".into(),
            Node::Array(_) | Node::Object(_) => {
                return Err(ConvertError::custom("map key must be a string or a scalar"));
            }
        };
        self.next_key = Some(s);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Self::Error> {
        let k = self.next_key.take().unwrap_or_default();
        if let Some(v) = self.ser.visit(value)? {
            self.map.push((k, v));
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(Node::Object(self.map))
    }
}

impl SerializeStruct for MapSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        if !self.state.admit(self.ser, self.name, value) {
            return Ok(());
        }
        if let Some(v) = self.ser.visit(value)? {
            self.map.push((key.to_string(), v));
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        Ok(self.state.close(self.ser, Node::Object(self.map)))
    }
}

pub struct StructVariantSerializer<'a> {
    ser: &'a mut NodeSerializer,
    map: Vec<(String, Node)>,
    name: &'static str,
    state: StructState,
}

impl SerializeStructVariant for StructVariantSerializer<'_> {
    type Ok = Node;
    type Error = ConvertError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        if !self.state.admit(self.ser, self.name, value) {
            return Ok(());
        }
        if let Some(v) = self.ser.visit(value)? {
            self.map.push((key.to_string(), v));
        }
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        let node = Node::Object(vec![(self.name.to_string(), Node::Object(self.map))]);
        Ok(self.state.close(self.ser, node))
    }
}
