use core::fmt;

use bumpalo::Bump;

use crate::syntax::bytes_literal::encode_base58;
use crate::syntax::string_literal::escape_string;
use crate::types::Type;

/// A runtime value.
///
/// Values are arena-allocated and `Copy`. `throw` is not a value: it travels
/// as an error through the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'v> {
    Unit,
    Bool(bool),
    Int(i64),
    Str(&'v str),
    Bytes(&'v [u8]),
    List(&'v [Value<'v>]),
    Struct(&'v StructValue<'v>),
}

/// A struct instance. Fields are in the order of the struct type.
#[derive(Debug, PartialEq, Eq)]
pub struct StructValue<'v> {
    pub name: &'v str,
    pub fields: &'v [(&'v str, Value<'v>)],
}

impl<'v> StructValue<'v> {
    pub fn field(&self, name: &str) -> Option<Value<'v>> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }
}

impl<'v> Value<'v> {
    pub fn str(arena: &'v Bump, s: &str) -> Self {
        Value::Str(arena.alloc_str(s))
    }

    pub fn bytes(arena: &'v Bump, bytes: &[u8]) -> Self {
        Value::Bytes(arena.alloc_slice_copy(bytes))
    }

    pub fn list(arena: &'v Bump, items: &[Value<'v>]) -> Self {
        Value::List(arena.alloc_slice_copy(items))
    }

    /// Build a struct value. `name` and field names are expected to outlive
    /// the arena (they come from the type or from string constants).
    pub fn structure(arena: &'v Bump, name: &'v str, fields: &[(&'v str, Value<'v>)]) -> Self {
        Value::Struct(arena.alloc(StructValue {
            name,
            fields: arena.alloc_slice_copy(fields),
        }))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'v str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'v [u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&'v [Value<'v>]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&'v StructValue<'v>> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the runtime type of this value, as used by `match`.
    pub fn type_name(&self) -> &'v str {
        match self {
            Value::Unit => "Unit",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Str(_) => "String",
            Value::Bytes(_) => "ByteVector",
            Value::List(_) => "List",
            Value::Struct(s) => s.name,
        }
    }

    /// Whether this value inhabits `ty`.
    ///
    /// Struct values are matched by name; list values check every element.
    pub fn conforms(&self, ty: &Type<'_>) -> bool {
        match (self, ty) {
            (_, Type::Union(members)) => members.iter().any(|m| self.conforms(m)),
            (Value::Unit, Type::Unit)
            | (Value::Bool(_), Type::Bool)
            | (Value::Int(_), Type::Int)
            | (Value::Str(_), Type::Str)
            | (Value::Bytes(_), Type::Bytes) => true,
            (Value::List(items), Type::List(elem)) => items.iter().all(|item| item.conforms(elem)),
            (Value::Struct(s), Type::Struct(st)) => s.name == st.name,
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "unit"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => escape_string(f, s),
            Value::Bytes(b) => write!(f, "base58'{}'", encode_base58(b)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(s) => {
                write!(f, "{}(", s.name)?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", name, value)?;
                }
                write!(f, ")")
            }
        }
    }
}
