use thiserror::Error;
use uuid::Uuid;

use super::order::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("No order for id {0}")]
    OrderNotFound(Uuid),

    #[error("Product with id {0} does not exist")]
    ProductNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("The order has been canceled")]
    OrderCanceled,

    #[error("An order in status {0} cannot be advanced")]
    InvalidState(OrderStatus),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("{entity} {id} was modified concurrently, retry the request")]
    ConcurrentModification { entity: &'static str, id: Uuid },

    #[error("A product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn order_conflict(id: Uuid) -> Self {
        Self::ConcurrentModification { entity: "order", id }
    }

    pub fn product_conflict(id: Uuid) -> Self {
        Self::ConcurrentModification {
            entity: "product",
            id,
        }
    }

    /// Whether re-issuing the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}
