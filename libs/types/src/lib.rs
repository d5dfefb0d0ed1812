//! Shared types for the tokenized-asset trading core.
//!
//! Everything the engine, market-data and gateway crates agree on lives
//! here: identifiers, fixed-point numerics, the order and trade models,
//! the derived position model, and the error taxonomy.

pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod position;
pub mod time;
pub mod trade;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::position::*;
    pub use crate::trade::*;
}
