//! Local `$ref` resolution: `#` and `#/definitions/<name>`, possibly chained.
use crate::schema::SchemaNode;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("Reference not found: {0}")]
    NotFound(String),
    #[error("Definitions not found")]
    DefinitionsNotFound,
    #[error("Reference not supported: {0}")]
    NotSupported(String),
    #[error("Reference cycle detected: {0}")]
    Cycle(String),
}

/// Walk `path` starting at `current`; `#` restarts at `root`.
pub fn lookup_ref<'a, S: AsRef<str>>(
    root: &'a SchemaNode,
    path: &[S],
    current: &'a SchemaNode,
) -> Result<&'a SchemaNode, ReferenceError> {
    match path {
        [] => Ok(current),
        [head, rest @ ..] if head.as_ref() == "#" => lookup_ref(root, rest, root),
        [head, name, rest @ ..] if head.as_ref() == "definitions" => {
            let definitions = current.definitions.as_ref().ok_or(ReferenceError::DefinitionsNotFound)?;
            let target = definitions
                .get(name.as_ref())
                .ok_or_else(|| ReferenceError::NotFound(name.as_ref().to_string()))?;
            tracing::trace!(name = name.as_ref(), "resolved definition");
            lookup_ref(root, rest, target)
        }
        [head, ..] => Err(ReferenceError::NotSupported(head.as_ref().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(v: serde_json::Value) -> SchemaNode { SchemaNode::from_value(&v).unwrap() }

    #[test]
    fn finds_definition_from_root() {
        let root = node(json!({"definitions": {"A": {"type": "string"}}}));
        let found = lookup_ref(&root, &["#", "definitions", "A"], &root).unwrap();
        assert_eq!(found, &root.definitions.as_ref().unwrap()["A"]);
    }

    #[test]
    fn missing_definitions_block() {
        let root = node(json!({"type": "string"}));
        assert_eq!(
            lookup_ref(&root, &["#", "definitions", "A"], &root),
            Err(ReferenceError::DefinitionsNotFound)
        );
    }

    #[test]
    fn missing_definition_entry() {
        let root = node(json!({"definitions": {"B": {}}}));
        assert_eq!(
            lookup_ref(&root, &["#", "definitions", "A"], &root),
            Err(ReferenceError::NotFound("A".into()))
        );
    }

    #[test]
    fn empty_path_returns_input() {
        let root = node(json!({}));
        let other = node(json!({"title": "x"}));
        let empty: [&str; 0] = [];
        assert_eq!(lookup_ref(&root, &empty, &other).unwrap(), &other);
    }

    #[test]
    fn hash_alone_is_the_root() {
        let root = node(json!({"title": "root"}));
        let other = node(json!({}));
        assert_eq!(lookup_ref(&root, &["#"], &other).unwrap(), &root);
    }

    #[test]
    fn nested_definitions_chain() {
        let root = node(json!({"definitions": {"A": {"definitions": {"B": {"title": "b"}}}}}));
        let found = lookup_ref(&root, &["#", "definitions", "A", "definitions", "B"], &root).unwrap();
        assert_eq!(found.title.as_deref(), Some("b"));
    }

    #[test]
    fn other_segments_are_unsupported() {
        let root = node(json!({"properties": {"a": {}}}));
        assert_eq!(
            lookup_ref(&root, &["#", "properties", "a"], &root),
            Err(ReferenceError::NotSupported("properties".into()))
        );
        assert_eq!(
            lookup_ref(&root, &["other.json"], &root),
            Err(ReferenceError::NotSupported("other.json".into()))
        );
        // a dangling `definitions` with no name is not a pointer we understand
        assert_eq!(
            lookup_ref(&root, &["#", "definitions"], &root),
            Err(ReferenceError::NotSupported("definitions".into()))
        );
    }
}
