//! JSON text for snapshot trees.
//!
//! Null-valued object fields are left out (see the `Serialize` impl of
//! [`Node`]). Trees are acyclic, so no cycle handling happens here.

use crate::Result;
use crate::node::Node;

pub fn to_json(node: &Node) -> Result<String> {
    Ok(serde_json::to_string(node)?)
}

pub fn to_json_pretty(node: &Node) -> Result<String> {
    Ok(serde_json::to_string_pretty(node)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Number;

    #[test]
    fn null_fields_are_omitted() {
        let tree = Node::Object(vec![
            ("kept".into(), Node::Number(Number::U64(0))),
            ("dropped".into(), Node::Null),
            ("list".into(), Node::Array(vec![Node::Null, Node::Bool(false)])),
        ]);
        assert_eq!(to_json(&tree).unwrap(), r#"{"kept":0,"list":[null,false]}"#);
    }

    #[test]
    fn floats_keep_their_value() {
        let tree = Node::Object(vec![("f".into(), Node::Number(Number::F64(2.5)))]);
        assert_eq!(to_json(&tree).unwrap(), r#"{"f":2.5}"#);
    }
}
