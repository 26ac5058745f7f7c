//! Strongly-typed IR shared by every ingestion and rendering path.
//!
//! The graph is append-only: records are registered once and referenced by
//! [`RecordId`] from then on; every other type is a plain value built by
//! unification. Nothing in here knows about JSON Schema syntax.
pub mod unify;

use std::collections::BTreeSet;
use indexmap::IndexMap;
use serde::Serialize;

// ------------------------------- Types ------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Ty {
    Bottom,                  // no information; identity of unification
    Null,
    Bool,
    Integer,
    Double,
    String,
    Array(Box<Ty>),
    Map(Box<Ty>),
    Record(RecordId),
    Union(Vec<Ty>),          // flattened, order as encountered
}

impl Ty {
    pub fn array(item: Ty) -> Self { Ty::Array(Box::new(item)) }
    pub fn map(value: Ty) -> Self { Ty::Map(Box::new(value)) }

    /// Null, or a union with a top-level Null member.
    pub fn includes_null(&self) -> bool {
        match self {
            Ty::Null => true,
            Ty::Union(members) => members.iter().any(|m| matches!(m, Ty::Null)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub names: BTreeSet<String>,         // raw hints; combined by the namer
    pub properties: IndexMap<String, Ty>, // stable order for deterministic output
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Unknown record id {0}")]
    UnknownRecord(RecordId),
    #[error("Top-level type `{0}` is already declared")]
    DuplicateTopLevel(String),
}

// ------------------------------- Context ---------------------------------- //

/// The seam between schema ingestion/rendering and whatever owns the graph.
pub trait TypeContext {
    fn unify(&mut self, a: Ty, b: Ty) -> Result<Ty, GraphError>;

    /// Multi-way unification; Bottom for an empty list.
    fn unify_all(&mut self, types: Vec<Ty>) -> Result<Ty, GraphError> {
        types.into_iter().try_fold(Ty::Bottom, |acc, t| self.unify(acc, t))
    }

    fn add_record(&mut self, hint: &str, properties: IndexMap<String, Ty>) -> RecordId;
    fn record(&self, id: RecordId) -> Option<&Record>;
    fn records(&self) -> Box<dyn Iterator<Item = (RecordId, &Record)> + '_>;

    fn record_count(&self) -> usize;

    /// Drop every record registered at or after `count`. Only for undoing a
    /// failed ingestion, before anything outside it could refer to them.
    fn discard_records_from(&mut self, count: usize);

    fn add_top_level(&mut self, name: &str, ty: Ty) -> Result<(), GraphError>;
    fn top_levels(&self) -> &IndexMap<String, Ty>;
}

// ------------------------------- Graph ------------------------------------ //

#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeGraph {
    records: Vec<Record>,
    top_levels: IndexMap<String, Ty>,
}

impl TypeGraph {
    pub fn new() -> Self { Self::default() }

    fn check_records(&self, ty: &Ty) -> Result<(), GraphError> {
        match ty {
            Ty::Record(id) if id.0 >= self.records.len() => Err(GraphError::UnknownRecord(*id)),
            Ty::Array(inner) | Ty::Map(inner) => self.check_records(inner),
            Ty::Union(members) => members.iter().try_for_each(|m| self.check_records(m)),
            _ => Ok(()),
        }
    }
}

impl TypeContext for TypeGraph {
    fn unify(&mut self, a: Ty, b: Ty) -> Result<Ty, GraphError> {
        self.check_records(&a)?;
        self.check_records(&b)?;
        Ok(unify::join(a, b))
    }

    fn add_record(&mut self, hint: &str, properties: IndexMap<String, Ty>) -> RecordId {
        let id = RecordId(self.records.len());
        let mut names = BTreeSet::new();
        names.insert(hint.to_string());
        self.records.push(Record { names, properties });
        tracing::debug!(id = id.0, hint, "registered record");
        id
    }

    fn record(&self, id: RecordId) -> Option<&Record> { self.records.get(id.0) }
    fn record_count(&self) -> usize { self.records.len() }

    fn discard_records_from(&mut self, count: usize) {
        if count < self.records.len() {
            tracing::debug!(discarded = self.records.len() - count, "discarded records");
            self.records.truncate(count);
        }
    }

    fn records(&self) -> Box<dyn Iterator<Item = (RecordId, &Record)> + '_> {
        Box::new(self.records.iter().enumerate().map(|(i, r)| (RecordId(i), r)))
    }

    fn add_top_level(&mut self, name: &str, ty: Ty) -> Result<(), GraphError> {
        if self.top_levels.contains_key(name) {
            return Err(GraphError::DuplicateTopLevel(name.to_string()));
        }
        self.check_records(&ty)?;
        self.top_levels.insert(name.to_string(), ty);
        Ok(())
    }

    fn top_levels(&self) -> &IndexMap<String, Ty> { &self.top_levels }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_null_only_at_top_union_level() {
        assert!(Ty::Null.includes_null());
        assert!(Ty::Union(vec![Ty::Integer, Ty::Null]).includes_null());
        assert!(!Ty::array(Ty::Null).includes_null());
        assert!(!Ty::Bottom.includes_null());
    }

    #[test]
    fn record_ids_are_stable_and_sequential() {
        let mut g = TypeGraph::new();
        let a = g.add_record("a", IndexMap::new());
        let b = g.add_record("b", IndexMap::new());
        assert_eq!(a, RecordId(0));
        assert_eq!(b, RecordId(1));
        assert!(g.record(a).unwrap().names.contains("a"));
        let ids: Vec<_> = g.records().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn discarding_records_keeps_earlier_ids() {
        let mut g = TypeGraph::new();
        let keep = g.add_record("keep", IndexMap::new());
        g.add_record("drop", IndexMap::new());
        g.discard_records_from(1);
        assert_eq!(g.record_count(), 1);
        assert!(g.record(keep).is_some());
        assert_eq!(g.add_record("next", IndexMap::new()), RecordId(1));
        g.discard_records_from(5);
        assert_eq!(g.record_count(), 2);
    }

    #[test]
    fn unify_rejects_unregistered_records() {
        let mut g = TypeGraph::new();
        let err = g.unify(Ty::Record(RecordId(3)), Ty::Null).unwrap_err();
        assert_eq!(err, GraphError::UnknownRecord(RecordId(3)));
    }

    #[test]
    fn unify_all_of_nothing_is_bottom() {
        let mut g = TypeGraph::new();
        assert_eq!(g.unify_all(vec![]).unwrap(), Ty::Bottom);
    }

    #[test]
    fn top_levels_keep_order_and_reject_duplicates() {
        let mut g = TypeGraph::new();
        g.add_top_level("B", Ty::String).unwrap();
        g.add_top_level("A", Ty::Integer).unwrap();
        let names: Vec<_> = g.top_levels().keys().cloned().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(
            g.add_top_level("A", Ty::Bool),
            Err(GraphError::DuplicateTopLevel("A".into()))
        );
    }
}
