//! Literal encodings shared by the parser and value printing.

pub mod bytes_literal;
pub mod string_literal;
