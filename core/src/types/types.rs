use core::fmt;

use bumpalo::Bump;

/// A Ridge static type.
///
/// Types are allocated in an arena and referenced as `&'a Type<'a>`. Unions are
/// always normalized through [`union_in`]: flattened, free of `Nothing`,
/// deduplicated, sorted, and never singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type<'a> {
    /// Bottom type: the type of `throw(...)`, assignable to anything.
    Nothing,
    Unit,
    Bool,
    Int,
    Str,
    Bytes,
    List(&'a Type<'a>),
    Struct(&'a StructType<'a>),
    Union(&'a [&'a Type<'a>]),
}

/// A named record type with ordered fields.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructType<'a> {
    pub name: &'a str,
    pub fields: &'a [(&'a str, &'a Type<'a>)],
}

impl<'a> StructType<'a> {
    pub fn field(&self, name: &str) -> Option<&'a Type<'a>> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, ty)| *ty)
    }
}

impl<'a> Type<'a> {
    /// Members of a union, or the type itself.
    pub fn members(&'a self) -> Vec<&'a Type<'a>> {
        match self {
            Type::Union(members) => members.to_vec(),
            Type::Nothing => Vec::new(),
            other => vec![other],
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union(_))
    }

    pub fn as_struct(&self) -> Option<&'a StructType<'a>> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn struct_name(&self) -> Option<&'a str> {
        self.as_struct().map(|s| s.name)
    }

    /// Whether the type may hold `unit` at runtime.
    pub fn contains_unit(&self) -> bool {
        match self {
            Type::Unit => true,
            Type::Union(members) => members.iter().any(|m| **m == Type::Unit),
            _ => false,
        }
    }
}

/// Whether a value of type `from` can be used where `to` is expected.
///
/// There is no numeric widening: apart from `Nothing`, unions and list
/// covariance, types must be equal.
pub fn is_assignable(from: &Type<'_>, to: &Type<'_>) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (Type::Nothing, _) => true,
        (Type::Union(members), _) => members.iter().all(|m| is_assignable(m, to)),
        (_, Type::Union(members)) => members.iter().any(|m| is_assignable(from, m)),
        (Type::List(a), Type::List(b)) => is_assignable(a, b),
        _ => false,
    }
}

/// Build a normalized union of `members` in `arena`.
pub fn union_in<'a>(arena: &'a Bump, members: &[&'a Type<'a>]) -> &'a Type<'a> {
    let mut flat: Vec<&'a Type<'a>> = Vec::with_capacity(members.len());
    for member in members {
        match member {
            Type::Union(inner) => flat.extend(inner.iter().copied()),
            Type::Nothing => {}
            _ => flat.push(member),
        }
    }
    flat.sort();
    flat.dedup();

    // A list type subsumed by another member (e.g. List[Nothing] next to
    // List[Int]) adds nothing to the union.
    let subsumed: Vec<bool> = flat
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            flat.iter()
                .enumerate()
                .any(|(j, other)| i != j && is_assignable(ty, other) && !is_assignable(other, ty))
        })
        .collect();
    let mut kept: Vec<&'a Type<'a>> = flat
        .iter()
        .zip(subsumed)
        .filter(|(_, s)| !s)
        .map(|(ty, _)| *ty)
        .collect();

    match kept.len() {
        0 => &Type::Nothing,
        1 => kept.remove(0),
        _ => arena.alloc(Type::Union(arena.alloc_slice_copy(&kept))),
    }
}

impl fmt::Display for Type<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Nothing => write!(f, "Nothing"),
            Type::Unit => write!(f, "Unit"),
            Type::Bool => write!(f, "Boolean"),
            Type::Int => write!(f, "Int"),
            Type::Str => write!(f, "String"),
            Type::Bytes => write!(f, "ByteVector"),
            Type::List(elem) => write!(f, "List[{}]", elem),
            Type::Struct(s) => write!(f, "{}", s.name),
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}
