use bumpalo::Bump;

use crate::stdlib::structs::StdStructs;
use crate::types::types::{StructType, Type, union_in};

/// Factory for arena-allocated types.
///
/// Primitive types are `'static` constants; composite types are allocated in
/// the arena the manager was created with. The standard struct types (Address,
/// Invocation, DataEntry, ...) are built once at construction.
pub struct TypeManager<'a> {
    // Arena holding all composite types from this TypeManager.
    arena: &'a Bump,
    std: StdStructs<'a>,
}

impl<'a> TypeManager<'a> {
    pub fn new(arena: &'a Bump) -> &'a Self {
        let std = StdStructs::new(arena);
        arena.alloc(Self { arena, std })
    }

    pub fn arena(&self) -> &'a Bump {
        self.arena
    }

    /// Standard struct types.
    pub fn std(&self) -> &StdStructs<'a> {
        &self.std
    }

    // Factory methods for types.
    pub fn nothing(&self) -> &'a Type<'a> {
        &Type::Nothing
    }
    pub fn unit(&self) -> &'a Type<'a> {
        &Type::Unit
    }
    pub fn bool(&self) -> &'a Type<'a> {
        &Type::Bool
    }
    pub fn int(&self) -> &'a Type<'a> {
        &Type::Int
    }
    pub fn str(&self) -> &'a Type<'a> {
        &Type::Str
    }
    pub fn bytes(&self) -> &'a Type<'a> {
        &Type::Bytes
    }

    pub fn list(&self, elem_ty: &'a Type<'a>) -> &'a Type<'a> {
        self.arena.alloc(Type::List(elem_ty))
    }

    pub fn structure(&self, name: &str, fields: &[(&str, &'a Type<'a>)]) -> &'a Type<'a> {
        make_struct(self.arena, name, fields)
    }

    /// Normalized union of the given members.
    pub fn union(&self, members: &[&'a Type<'a>]) -> &'a Type<'a> {
        union_in(self.arena, members)
    }

    /// Least upper bound of two types, used for `if` and `match` results.
    pub fn join(&self, a: &'a Type<'a>, b: &'a Type<'a>) -> &'a Type<'a> {
        if a == b {
            return a;
        }
        self.union(&[a, b])
    }

    /// `T|Unit` for a value that may be absent.
    pub fn optional(&self, ty: &'a Type<'a>) -> &'a Type<'a> {
        self.union(&[ty, self.unit()])
    }

    /// The members of `ty` that are not covered by `removed`.
    pub fn without(&self, ty: &'a Type<'a>, removed: &[&'a Type<'a>]) -> &'a Type<'a> {
        let remaining: Vec<&'a Type<'a>> = ty
            .members()
            .into_iter()
            .filter(|member| !removed.iter().any(|r| member == r))
            .collect();
        self.union(&remaining)
    }

    /// Look up a type by its source name (`Int`, `Address`, ...).
    pub fn named(&self, name: &str) -> Option<&'a Type<'a>> {
        match name {
            "Nothing" => Some(self.nothing()),
            "Unit" => Some(self.unit()),
            "Boolean" => Some(self.bool()),
            "Int" => Some(self.int()),
            "String" => Some(self.str()),
            "ByteVector" => Some(self.bytes()),
            _ => self.std.by_name(name),
        }
    }
}

pub(crate) fn make_struct<'a>(
    arena: &'a Bump,
    name: &str,
    fields: &[(&str, &'a Type<'a>)],
) -> &'a Type<'a> {
    let fields = arena.alloc_slice_fill_iter(
        fields
            .iter()
            .map(|(field, ty)| (&*arena.alloc_str(field), *ty)),
    );
    let s = arena.alloc(StructType {
        name: arena.alloc_str(name),
        fields,
    });
    arena.alloc(Type::Struct(s))
}
