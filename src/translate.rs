//! Schema → IR.
//!
//! Walks a decoded [`SchemaNode`] with the document root in scope, unifying
//! every alternative shape (type token, type set, `oneOf`) through the graph
//! context, and registering a record for every object with `properties`.
use indexmap::IndexMap;

use crate::error::Error;
use crate::ir::{Ty, TypeContext};
use crate::naming::singular;
use crate::resolve::{lookup_ref, ReferenceError};
use crate::schema::{AdditionalProperties, JsonType, SchemaNode, TypeSpec};

/// Run every step; the first error wins and nothing after it is looked at.
pub fn collect_all<T, E, I>(steps: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    steps.into_iter().collect()
}

pub struct Translator<'a, G: TypeContext + ?Sized> {
    graph: &'a mut G,
    root: &'a SchemaNode,
    /// `$ref`s currently being expanded, innermost last.
    active_refs: Vec<String>,
}

impl<'a, G: TypeContext + ?Sized> Translator<'a, G> {
    pub fn new(graph: &'a mut G, root: &'a SchemaNode) -> Self {
        Self { graph, root, active_refs: Vec::new() }
    }

    pub fn translate_root(&mut self, name_hint: &str) -> Result<Ty, Error> {
        let root = self.root;
        self.translate(name_hint, root)
    }

    pub fn translate(&mut self, name_hint: &str, node: &'a SchemaNode) -> Result<Ty, Error> {
        if let Some(reference) = &node.reference {
            if self.active_refs.iter().any(|r| r == reference.raw()) {
                return Err(ReferenceError::Cycle(reference.raw().to_string()).into());
            }
            let target = lookup_ref(self.root, reference.segments(), node)?;
            self.active_refs.push(reference.raw().to_string());
            let result = self.translate(reference.name_hint(), target);
            self.active_refs.pop();
            return result;
        }

        match &node.types {
            Some(TypeSpec::Single(kind)) => self.translate_kind(name_hint, *kind, node),
            Some(TypeSpec::Set(kinds)) => {
                let types = collect_all(kinds.iter().map(|k| self.translate_kind(name_hint, *k, node)))?;
                Ok(self.graph.unify_all(types)?)
            }
            None => match &node.one_of {
                Some(alternatives) => {
                    let types = collect_all(alternatives.iter().map(|alt| self.translate(name_hint, alt)))?;
                    Ok(self.graph.unify_all(types)?)
                }
                None => Ok(Ty::Bottom),
            },
        }
    }

    fn translate_kind(&mut self, name_hint: &str, kind: JsonType, node: &'a SchemaNode) -> Result<Ty, Error> {
        match kind {
            JsonType::Object => self.translate_object(name_hint, node),
            JsonType::Array => match &node.items {
                Some(items) => Ok(Ty::array(self.translate(&singular(name_hint), items)?)),
                None => Ok(Ty::array(Ty::Bottom)),
            },
            JsonType::Boolean => Ok(Ty::Bool),
            JsonType::String => Ok(Ty::String),
            JsonType::Null => Ok(Ty::Null),
            JsonType::Integer => Ok(Ty::Integer),
            JsonType::Number => Ok(Ty::Double),
        }
    }

    fn translate_object(&mut self, name_hint: &str, node: &'a SchemaNode) -> Result<Ty, Error> {
        let Some(properties) = &node.properties else {
            return match &node.additional_properties {
                AdditionalProperties::Allowed(true) => Ok(Ty::map(Ty::Bottom)),
                AdditionalProperties::Allowed(false) => Ok(Ty::Bottom),
                AdditionalProperties::Schema(values) => Ok(Ty::map(self.translate(&singular(name_hint), values)?)),
            };
        };

        let required = node.required.as_deref().unwrap_or_default();
        let translated = collect_all(
            properties.iter().map(|(name, schema)| self.translate(name, schema).map(|ty| (name, ty))),
        )?;

        let mut fields = IndexMap::with_capacity(translated.len());
        for (name, ty) in translated {
            let ty = if required.contains(name) { ty } else { self.graph.unify(ty, Ty::Null)? };
            fields.insert(name.clone(), ty);
        }

        let title = node.title.as_deref().unwrap_or(name_hint);
        Ok(Ty::Record(self.graph.add_record(title, fields)))
    }
}

// ------------------------------- Tests ------------------------------------ //
