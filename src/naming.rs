//! Identifier-safe, deterministic names for records and types.
use std::collections::{BTreeSet, HashSet};

use convert_case::{Case, Casing};
use indexmap::IndexMap;

use crate::ir::{RecordId, Ty, TypeContext};

const COLLISION_PREFIX: &str = "Other";
const FALLBACK_RECORD_NAME: &str = "Record";

// ------------------------------ Primitives -------------------------------- //

/// Replace anything outside printable ASCII (and `/`) with `_`.
/// One output char per input char.
pub fn legalize(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) && c != '/' { c } else { '_' })
        .collect()
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn name_style(text: &str) -> String {
    capitalize(&legalize(text).to_case(Case::Camel))
}

/// Order-independent: parts are sorted before styling.
pub fn union_name<S: AsRef<str>>(parts: &[S]) -> String {
    let mut sorted: Vec<&str> = parts.iter().map(|p| p.as_ref()).collect();
    sorted.sort_unstable();
    sorted.into_iter().map(name_style).collect::<Vec<_>>().join("Or")
}

/// Shortest hint wins; ties go to the lexicographically smallest.
pub fn combined_name(hints: &BTreeSet<String>) -> String {
    hints
        .iter()
        .min_by_key(|h| h.len())
        .cloned()
        .unwrap_or_else(|| FALLBACK_RECORD_NAME.to_string())
}

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
];

/// English singular form; good enough for generated element names.
pub fn singular(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some((_, single)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        // keep the caller's leading case
        return if word.starts_with(|c: char| c.is_uppercase()) { capitalize(single) } else { single.to_string() };
    }
    let n = word.len();
    if lower.ends_with("ies") && n > 3 {
        format!("{}y", &word[..n - 3])
    } else if lower.ends_with("sses") {
        word[..n - 2].to_string()
    } else if lower.ends_with("uses") && n > 4 && !lower[..n - 4].ends_with(['a', 'e', 'i', 'o', 'u']) {
        // statuses, bonuses; not houses or causes
        word[..n - 2].to_string()
    } else if ["xes", "ches", "shes", "zzes"].iter().any(|s| lower.ends_with(s)) {
        word[..n - 2].to_string()
    } else if lower.ends_with('s') && n > 1 && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        word[..n - 1].to_string()
    } else {
        word.to_string()
    }
}

// -------------------------------- Namer ----------------------------------- //

/// Assigns final display names, steering around forbidden and taken names
/// by prefixing `Other`.
#[derive(Debug, Clone, Default)]
pub struct Namer {
    forbidden: HashSet<String>,
}

impl Namer {
    pub fn new<I, S>(forbidden: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { forbidden: forbidden.into_iter().map(Into::into).collect() }
    }

    pub fn avoid_collision(&self, proposed: String, taken: &HashSet<String>) -> String {
        let mut name = proposed;
        while self.forbidden.contains(&name) || taken.contains(&name) {
            name = format!("{COLLISION_PREFIX}{name}");
        }
        name
    }

    /// Hints with nothing nameable in them (`""`, `"_"`) fall back to `Record`.
    pub fn name_for_record(&self, hints: &BTreeSet<String>) -> String {
        let name = name_style(&combined_name(hints));
        if name.is_empty() { FALLBACK_RECORD_NAME.to_string() } else { name }
    }

    /// Every registered record gets a unique name; earlier ids win ties.
    pub fn assign_record_names<G: TypeContext + ?Sized>(&self, graph: &G) -> IndexMap<RecordId, String> {
        let mut taken = HashSet::new();
        let mut out = IndexMap::new();
        for (id, record) in graph.records() {
            let name = self.avoid_collision(self.name_for_record(&record.names), &taken);
            taken.insert(name.clone());
            out.insert(id, name);
        }
        out
    }

    pub fn name_for_type(&self, ty: &Ty, records: &IndexMap<RecordId, String>) -> String {
        match ty {
            Ty::Bottom => "Anything".into(),
            Ty::Null => "Null".into(),
            Ty::Bool => "Bool".into(),
            Ty::Integer => "Integer".into(),
            Ty::Double => "Double".into(),
            Ty::String => "String".into(),
            Ty::Array(item) => format!("{}Array", self.name_for_type(item, records)),
            Ty::Map(value) => format!("{}Map", self.name_for_type(value, records)),
            Ty::Record(id) => records.get(id).cloned().unwrap_or_else(|| format!("Record{}", id.0)),
            Ty::Union(members) => {
                let parts: Vec<String> = members.iter().map(|m| self.name_for_type(m, records)).collect();
                union_name(&parts)
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeGraph;

    #[test]
    fn legalize_preserves_length() {
        assert_eq!(legalize("a/b"), "a_b");
        assert_eq!(legalize("tab\there"), "tab_here");
        assert_eq!(legalize("né"), "n_");
        assert_eq!(legalize("plain ~ text"), "plain ~ text");
    }

    #[test]
    fn name_style_is_pascal_case() {
        assert_eq!(name_style("point"), "Point");
        assert_eq!(name_style("my_type"), "MyType");
        assert_eq!(name_style("line item"), "LineItem");
    }

    #[test]
    fn union_name_is_order_independent() {
        assert_eq!(union_name(&["b", "a"]), union_name(&["a", "b"]));
        assert_eq!(union_name(&["string", "integer"]), "IntegerOrString");
    }

    #[test]
    fn singular_forms() {
        assert_eq!(singular("items"), "item");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("statuses"), "status");
        assert_eq!(singular("bonuses"), "bonus");
        assert_eq!(singular("houses"), "house");
        assert_eq!(singular("uses"), "use");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("People"), "Person");
        assert_eq!(singular("data"), "data");
    }

    #[test]
    fn combined_name_prefers_shortest() {
        let hints: BTreeSet<String> = ["location", "point", "pos"].iter().map(|s| s.to_string()).collect();
        assert_eq!(combined_name(&hints), "pos");
    }

    #[test]
    fn namer_prefixes_collisions() {
        let mut g = TypeGraph::new();
        let a = g.add_record("point", IndexMap::new());
        let b = g.add_record("Point", IndexMap::new());
        let c = g.add_record("list", IndexMap::new());
        let names = Namer::new(["List"]).assign_record_names(&g);
        assert_eq!(names[&a], "Point");
        assert_eq!(names[&b], "OtherPoint");
        assert_eq!(names[&c], "OtherList");
    }

    #[test]
    fn unnameable_hints_fall_back() {
        let mut g = TypeGraph::new();
        let a = g.add_record("_", IndexMap::new());
        let b = g.add_record("", IndexMap::new());
        let names = Namer::default().assign_record_names(&g);
        assert_eq!(names[&a], "Record");
        assert_eq!(names[&b], "OtherRecord");
    }

    #[test]
    fn type_names_use_union_naming() {
        let namer = Namer::default();
        let ty = Ty::array(Ty::Union(vec![Ty::String, Ty::Integer]));
        assert_eq!(namer.name_for_type(&ty, &IndexMap::new()), "IntegerOrStringArray");
    }
}
