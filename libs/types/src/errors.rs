//! Error taxonomy for the trading core
//!
//! Comprehensive error taxonomy using thiserror. Validation and conflict
//! errors are synchronous and cheap; an invariant violation is fatal for
//! the operation that detected it and must never surface as a partial
//! success.

use thiserror::Error;

/// Rejections raised before any book mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("price must be positive")]
    NonPositivePrice,

    #[error("limit order requires a price")]
    MissingPrice,

    #[error("market order must not carry a price")]
    UnexpectedPrice,

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("order already in terminal state: {status}")]
    AlreadyTerminal { status: String },

    #[error("self-trade prevented against resting order {order_id}")]
    SelfTrade { order_id: String },

    #[error("invariant violated: {detail}")]
    Invariant { detail: String },
}

impl EngineError {
    /// Shorthand for invariant failures detected inside the engine.
    pub fn invariant(detail: impl Into<String>) -> Self {
        EngineError::Invariant {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::UnknownSymbol("BOGUS".to_string());
        assert_eq!(err.to_string(), "unknown symbol: BOGUS");
    }

    #[test]
    fn test_engine_error_from_validation() {
        let err: EngineError = ValidationError::NonPositiveQuantity.into();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_invariant_shorthand() {
        let err = EngineError::invariant("crossed book");
        assert_eq!(err.to_string(), "invariant violated: crossed book");
    }
}
