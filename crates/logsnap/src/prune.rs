//! Field-count ceiling for snapshots.

use crate::Result;
use crate::node::Node;

/// Number of leaf values in `node`. Objects and arrays contribute the sum of
/// their children (an empty one contributes nothing); every scalar, null
/// included, counts once.
pub fn field_count(node: &Node) -> usize {
    match node {
        Node::Array(items) => items.iter().map(field_count).sum(),
        Node::Object(fields) => fields.iter().map(|(_, v)| field_count(v)).sum(),
        _ => 1,
    }
}

/// Returns `node` unchanged when it has at most `max_fields` leaves,
/// otherwise `{"invalid": true, "message": <node as indented JSON>}`.
pub fn prune(node: Node, max_fields: usize) -> Result<Node> {
    let count = field_count(&node);
    if count <= max_fields {
        return Ok(node);
    }
    tracing::debug!(target: "logsnap", count, max_fields, "snapshot collapsed to text");
    let message = crate::encode::to_json_pretty(&node)?;
    Ok(Node::Object(vec![
        (crate::INVALID.to_string(), Node::Bool(true)),
        (crate::MESSAGE.to_string(), Node::String(message)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Number;

    fn obj(fields: &[(&str, Node)]) -> Node {
        Node::Object(fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn counts_leaves() {
        let tree = obj(&[
            ("a", Node::from(1i64)),
            ("b", Node::Array(vec![Node::from(true), Node::Null, obj(&[("c", Node::from("x"))])])),
            ("empty", Node::Array(vec![])),
        ]);
        assert_eq!(field_count(&tree), 4);
        assert_eq!(field_count(&Node::empty_object()), 0);
        assert_eq!(field_count(&Node::Number(Number::F64(0.5))), 1);
    }

    #[test]
    fn at_ceiling_is_kept() {
        let tree = obj(&[("a", Node::from(1i64)), ("b", Node::from(2i64))]);
        assert_eq!(prune(tree.clone(), 2).unwrap(), tree);
    }

    #[test]
    fn above_ceiling_collapses() {
        let tree = obj(&[("a", Node::from(1i64)), ("b", Node::from(2i64))]);
        let pruned = prune(tree, 1).unwrap();
        assert_eq!(pruned.get("invalid"), Some(&Node::Bool(true)));
        let Some(Node::String(message)) = pruned.get("message") else {
            panic!("message missing");
        };
        assert_eq!(message, "{\n  \"a\": 1,\n  \"b\": 2\n}");
        assert_eq!(field_count(&pruned), 2);
    }
}
