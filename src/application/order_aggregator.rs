use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ClientInfo, LineRequest, Order, OrderLine, OrderStatus};
use crate::domain::ports::ProductLookup;

/// Builds priced orders from client requests. Never touches stock.
pub struct OrderAggregator<L: ?Sized> {
    products: Arc<L>,
}

impl<L: ProductLookup + ?Sized> OrderAggregator<L> {
    pub fn new(products: Arc<L>) -> Self {
        Self { products }
    }

    /// Resolves every requested product and prices the order at the prices
    /// observed now. Any missing product aborts the whole order.
    pub fn create_order(
        &self,
        client: ClientInfo,
        requests: &[LineRequest],
    ) -> Result<Order, DomainError> {
        client.validate()?;
        if requests.is_empty() {
            return Err(DomainError::validation(
                "An order must have at least one product.",
            ));
        }

        let mut total_value = BigDecimal::from(0);
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            if request.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "Quantity for product {} must be positive.",
                    request.product_id
                )));
            }
            let product = self
                .products
                .find_product(request.product_id)?
                .ok_or(DomainError::ProductNotFound(request.product_id))?;

            let line = OrderLine {
                id: Uuid::new_v4(),
                product_id: product.id,
                quantity: request.quantity,
                unit_price: product.unit_price,
            };
            total_value += line.line_total();
            lines.push(line);
        }

        Ok(Order {
            id: Uuid::new_v4(),
            client,
            created_date: Utc::now(),
            total_value,
            status: OrderStatus::Evaluation,
            version: 0,
            lines,
        })
    }
}
