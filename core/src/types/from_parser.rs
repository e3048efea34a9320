//! Conversion from parser TypeExpr to type system Type.

use crate::parser;
use crate::types::{Type, manager::TypeManager};

/// Error returned when converting a TypeExpr to a Type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeConversionError {
    UnknownType { name: String },
}

impl std::fmt::Display for TypeConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeConversionError::UnknownType { name } => write!(f, "Unknown type: {}", name),
        }
    }
}

impl std::error::Error for TypeConversionError {}

/// Converts a parser TypeExpr into the type system's Type representation.
///
/// Returns a `TypeConversionError` without span information. The caller should
/// annotate this error with the appropriate source span.
pub fn type_expr_to_type<'a>(
    type_manager: &TypeManager<'a>,
    type_expr: &parser::TypeExpr<'_>,
) -> Result<&'a Type<'a>, TypeConversionError> {
    match type_expr {
        parser::TypeExpr::Named(name) => {
            type_manager
                .named(name)
                .ok_or_else(|| TypeConversionError::UnknownType {
                    name: name.to_string(),
                })
        }
        parser::TypeExpr::List(elem) => {
            let elem = type_expr_to_type(type_manager, elem)?;
            Ok(type_manager.list(elem))
        }
        parser::TypeExpr::Union(members) => {
            let members = members
                .iter()
                .map(|m| type_expr_to_type(type_manager, m))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(type_manager.union(&members))
        }
    }
}
