//! Fulfillment workflow transition table.
//!
//! Each non-terminal status owns exactly one [`Transition`]. A transition
//! names the side effect that has to run before the order may move, and the
//! status it lands on.

use super::errors::DomainError;
use super::order::OrderStatus;

/// Side effect attached to a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Move to the regular target only if every line is in stock, to
    /// `otherwise` if not.
    CheckAvailability { otherwise: OrderStatus },
    /// Consume the order's stock. The transition fails if that fails.
    ConsumeStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// EVALUATION -> PREPARATION, or CANCELED when stock is short.
    Evaluate,
    /// PREPARATION -> READY.
    Prepare,
    /// READY -> DELIVERY, consuming stock.
    Dispatch,
    /// DELIVERY -> CONCLUDED.
    Conclude,
}

impl Transition {
    /// Looks up the transition leaving `status`.
    pub fn from_status(status: OrderStatus) -> Result<Self, DomainError> {
        match status {
            OrderStatus::Evaluation => Ok(Transition::Evaluate),
            OrderStatus::Preparation => Ok(Transition::Prepare),
            OrderStatus::Ready => Ok(Transition::Dispatch),
            OrderStatus::Delivery => Ok(Transition::Conclude),
            OrderStatus::Canceled => Err(DomainError::OrderCanceled),
            OrderStatus::Concluded => Err(DomainError::InvalidState(status)),
        }
    }

    pub fn source(self) -> OrderStatus {
        match self {
            Transition::Evaluate => OrderStatus::Evaluation,
            Transition::Prepare => OrderStatus::Preparation,
            Transition::Dispatch => OrderStatus::Ready,
            Transition::Conclude => OrderStatus::Delivery,
        }
    }

    pub fn target(self) -> OrderStatus {
        match self {
            Transition::Evaluate => OrderStatus::Preparation,
            Transition::Prepare => OrderStatus::Ready,
            Transition::Dispatch => OrderStatus::Delivery,
            Transition::Conclude => OrderStatus::Concluded,
        }
    }

    pub fn effect(self) -> Effect {
        match self {
            Transition::Evaluate => Effect::CheckAvailability {
                otherwise: OrderStatus::Canceled,
            },
            Transition::Dispatch => Effect::ConsumeStock,
            Transition::Prepare | Transition::Conclude => Effect::None,
        }
    }
}
