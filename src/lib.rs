//! Bridge between JSON Schema documents and an in-memory type graph.
//!
//! Forward: JSON text → [`schema::SchemaNode`] → [`ir::Ty`] registered in a
//! [`ir::TypeContext`]. Reverse: a populated graph → a JSON Schema document
//! with `definitions` and `$ref` wiring.
pub mod error;
pub mod format;
pub mod ir;
pub mod naming;
pub mod render;
pub mod resolve;
pub mod schema;
pub mod translate;

pub use error::{Error, Result};
pub use ir::{GraphError, Ty, TypeContext, TypeGraph};
pub use naming::Namer;
pub use render::SchemaRenderer;
pub use schema::SchemaNode;
pub use translate::Translator;

// ------------------------------- Front API -------------------------------- //

/// Decode `source`, translate it, and declare the result as the top-level
/// type `top_level_name`. On error the graph is left as it was.
pub fn ingest_str<G: TypeContext + ?Sized>(graph: &mut G, source: &str, top_level_name: &str) -> Result<Ty> {
    let value: serde_json::Value = serde_json::from_str(source)?;
    ingest_value(graph, &value, top_level_name)
}

pub fn ingest_value<G: TypeContext + ?Sized>(
    graph: &mut G,
    value: &serde_json::Value,
    top_level_name: &str,
) -> Result<Ty> {
    if graph.top_levels().contains_key(top_level_name) {
        return Err(GraphError::DuplicateTopLevel(top_level_name.to_string()).into());
    }
    let root = SchemaNode::from_value(value)?;
    let mark = graph.record_count();
    let translated = Translator::new(graph, &root).translate_root(top_level_name);
    let result = translated.and_then(|ty| {
        graph.add_top_level(top_level_name, ty.clone())?;
        Ok(ty)
    });
    match result {
        Ok(ty) => {
            tracing::debug!(top_level = top_level_name, "ingested schema");
            Ok(ty)
        }
        Err(error) => {
            // records from a half-translated document must not reach output
            graph.discard_records_from(mark);
            Err(error)
        }
    }
}

pub fn render_string<G: TypeContext + ?Sized>(graph: &G, namer: &Namer) -> Result<String> {
    let mut buf = Vec::new();
    SchemaRenderer::new(graph, namer).write_to(&mut buf)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
