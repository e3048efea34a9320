pub mod from_parser;
pub mod manager;
#[allow(clippy::module_inception)]
mod types;

#[cfg(test)]
mod manager_test;

pub use from_parser::{TypeConversionError, type_expr_to_type};
pub use manager::TypeManager;
pub use types::{StructType, Type, is_assignable, union_in};
