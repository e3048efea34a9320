//! Runtime values.

mod value;

pub use value::{StructValue, Value};
