//! IR → JSON Schema.
//!
//! Read-only walk over a populated graph. Records become entries under
//! `definitions` and are referenced with `$ref`; the top-level shape is
//! inlined when there is exactly one top-level type, `oneOf` otherwise.
use std::io;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::ir::{GraphError, RecordId, Ty, TypeContext};
use crate::naming::Namer;
use crate::schema::JsonType;
use crate::translate::collect_all;

type Object = Map<String, Value>;

fn object<const N: usize>(pairs: [(&str, Value); N]) -> Object {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn scalar(kind: JsonType) -> Object {
    object([("type", Value::from(kind.as_str()))])
}

pub struct SchemaRenderer<'a, G: TypeContext + ?Sized> {
    graph: &'a G,
    names: IndexMap<RecordId, String>,
}

impl<'a, G: TypeContext + ?Sized> SchemaRenderer<'a, G> {
    pub fn new(graph: &'a G, namer: &Namer) -> Self {
        Self { graph, names: namer.assign_record_names(graph) }
    }

    pub fn names(&self) -> &IndexMap<RecordId, String> { &self.names }

    pub fn record_name(&self, id: RecordId) -> Result<&str, GraphError> {
        self.names.get(&id).map(String::as_str).ok_or(GraphError::UnknownRecord(id))
    }

    pub fn emit_type(&self, ty: &Ty) -> Result<Object, GraphError> {
        Ok(match ty {
            Ty::Bottom => Object::new(),
            Ty::Null => scalar(JsonType::Null),
            Ty::Bool => scalar(JsonType::Boolean),
            Ty::Integer => scalar(JsonType::Integer),
            Ty::Double => scalar(JsonType::Number),
            Ty::String => scalar(JsonType::String),
            Ty::Array(item) => object([
                ("type", Value::from(JsonType::Array.as_str())),
                ("items", Value::Object(self.emit_type(item)?)),
            ]),
            Ty::Map(value) => object([
                ("type", Value::from(JsonType::Object.as_str())),
                ("additionalProperties", Value::Object(self.emit_type(value)?)),
            ]),
            Ty::Record(id) => object([("$ref", Value::from(format!("#/definitions/{}", self.record_name(*id)?)))]),
            Ty::Union(members) => object([("oneOf", Value::Array(self.emit_all(members)?))]),
        })
    }

    fn emit_all<'t>(&self, types: impl IntoIterator<Item = &'t Ty>) -> Result<Vec<Value>, GraphError> {
        collect_all(types.into_iter().map(|t| self.emit_type(t).map(Value::Object)))
    }

    pub fn emit_definition(&self, id: RecordId) -> Result<Object, GraphError> {
        let record = self.graph.record(id).ok_or(GraphError::UnknownRecord(id))?;
        let properties = collect_all(
            record.properties.iter().map(|(name, ty)| self.emit_type(ty).map(|o| (name.clone(), Value::Object(o)))),
        )?;
        let required: Vec<Value> = record
            .properties
            .iter()
            .filter(|(_, ty)| !ty.includes_null())
            .map(|(name, _)| Value::from(name.as_str()))
            .collect();
        Ok(object([
            ("type", Value::from(JsonType::Object.as_str())),
            ("additionalProperties", Value::Bool(false)),
            ("properties", Value::Object(properties.into_iter().collect())),
            ("required", Value::Array(required)),
            ("title", Value::from(self.record_name(id)?)),
        ]))
    }

    /// A lone top-level record is inlined as its full definition.
    fn emit_top_level(&self, ty: &Ty) -> Result<Object, GraphError> {
        match ty {
            Ty::Record(id) => self.emit_definition(*id),
            other => self.emit_type(other),
        }
    }

    pub fn render_document(&self) -> Result<Value, GraphError> {
        let definitions = collect_all(self.graph.records().map(|(id, _)| {
            let name = self.record_name(id)?.to_string();
            self.emit_definition(id).map(|d| (name, Value::Object(d)))
        }))?;

        let top_levels: Vec<&Ty> = self.graph.top_levels().values().collect();
        let shape = match top_levels.as_slice() {
            [] => Object::new(),
            [only] => self.emit_top_level(only)?,
            many => object([("oneOf", Value::Array(self.emit_all(many.iter().copied())?))]),
        };
        tracing::debug!(definitions = definitions.len(), top_levels = top_levels.len(), "rendered schema document");

        let mut doc = Object::new();
        doc.insert("definitions".into(), Value::Object(definitions.into_iter().collect()));
        doc.extend(shape);
        Ok(Value::Object(doc))
    }

    /// Pretty-print the document into `out`, followed by a newline.
    pub fn write_to<W: io::Write>(&self, mut out: W) -> Result<(), Error> {
        let doc = self.render_document()?;
        serde_json::to_writer_pretty(&mut out, &doc)?;
        writeln!(out)?;
        Ok(())
    }
}

// ------------------------------- Tests ------------------------------------ //
