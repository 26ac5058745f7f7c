//! Join (⊔) over IR types.
//!
//! - Bottom is the identity.
//! - Containers of the same kind join element-wise.
//! - Integer ⊔ Double widens to Double.
//! - Everything else becomes a flattened union; a member only merges with an
//!   existing member it is compatible with, so `{string, null}` stays a
//!   two-member union rather than collapsing to a nullable string.
use super::Ty;

pub fn join(a: Ty, b: Ty) -> Ty {
    match (a, b) {
        (Ty::Bottom, x) | (x, Ty::Bottom) => x,
        (a, b) if a == b => a,
        (Ty::Array(x), Ty::Array(y)) => Ty::array(join(*x, *y)),
        (Ty::Map(x), Ty::Map(y)) => Ty::map(join(*x, *y)),
        (Ty::Integer, Ty::Double) | (Ty::Double, Ty::Integer) => Ty::Double,
        (a, b) => {
            let mut members = Vec::new();
            insert_member(&mut members, a);
            insert_member(&mut members, b);
            collapse(members)
        }
    }
}

fn compatible(a: &Ty, b: &Ty) -> bool {
    matches!(
        (a, b),
        (Ty::Array(_), Ty::Array(_))
            | (Ty::Map(_), Ty::Map(_))
            | (Ty::Integer | Ty::Double, Ty::Integer | Ty::Double)
    ) || a == b
}

fn insert_member(members: &mut Vec<Ty>, t: Ty) {
    match t {
        Ty::Bottom => {}
        Ty::Union(inner) => {
            for m in inner { insert_member(members, m); }
        }
        t => {
            if let Some(slot) = members.iter_mut().find(|m| compatible(m, &t)) {
                let existing = std::mem::replace(slot, Ty::Bottom);
                *slot = join(existing, t);
            } else {
                members.push(t);
            }
        }
    }
}

fn collapse(mut members: Vec<Ty>) -> Ty {
    match members.len() {
        0 => Ty::Bottom,
        1 => members.remove(0),
        _ => Ty::Union(members),
    }
}

// ------------------------------- Tests ------------------------------------ //
