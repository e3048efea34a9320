//! Static cost estimation.
//!
//! Every accepted script has a known upper bound on the work it can do. The
//! estimator walks the typed tree once, charging fixed per-node costs and the
//! builtin costs from the standard library table, and rejects scripts whose
//! entry points exceed their limits or whose `FOLD`s are not bounded.

mod error;
mod estimator;


pub use error::{CostError, CostErrorKind};
pub use estimator::{Complexity, estimate};
