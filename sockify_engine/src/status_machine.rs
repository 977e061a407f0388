//! Order status transitions.
//!
//! ```text
//!   received ──► shipped ──► delivered ──► returned
//!       │
//!       └──────► canceled
//! ```
//!
//! These four edges are the only legal moves. Everything else, including "moving" an order to the status it already
//! has, is rejected with a [`StatusTransitionError`]. The checks here are pure; callers run them before touching the
//! database.
use thiserror::Error;

use crate::db_types::OrderStatusType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusTransitionError {
    #[error("The new status can not be empty")]
    EmptyStatus { from: OrderStatusType },
    #[error("The new status can not be the same as the old status ('{from}')")]
    SameStatus { from: OrderStatusType },
    #[error("Order status can not change from '{from}' to '{to}'")]
    IllegalTransition { from: OrderStatusType, to: String },
}

impl StatusTransitionError {
    pub fn from_status(&self) -> OrderStatusType {
        match self {
            Self::EmptyStatus { from } | Self::SameStatus { from } | Self::IllegalTransition { from, .. } => *from,
        }
    }
}

pub fn is_valid_transition(from: OrderStatusType, to: OrderStatusType) -> bool {
    use OrderStatusType::*;
    matches!((from, to), (Received, Shipped) | (Received, Canceled) | (Shipped, Delivered) | (Delivered, Returned))
}

pub fn validate_transition(from: OrderStatusType, to: OrderStatusType) -> Result<(), StatusTransitionError> {
    if from == to {
        return Err(StatusTransitionError::SameStatus { from });
    }
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        Err(StatusTransitionError::IllegalTransition { from, to: to.to_string() })
    }
}

/// Validates a transition requested as free text (e.g. straight from an HTTP body) and returns the parsed target.
pub fn validate_requested_transition(
    from: OrderStatusType,
    requested: &str,
) -> Result<OrderStatusType, StatusTransitionError> {
    if requested.trim().is_empty() {
        return Err(StatusTransitionError::EmptyStatus { from });
    }
    let to = requested
        .parse::<OrderStatusType>()
        .map_err(|_| StatusTransitionError::IllegalTransition { from, to: requested.to_string() })?;
    validate_transition(from, to)?;
    Ok(to)
}
