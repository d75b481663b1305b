use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ClientInfo, LineRequest, ListResult, Order, OrderStatus};
use crate::domain::ports::{OrderStore, ProductLookup, Transactional};

use super::order_aggregator::OrderAggregator;
use super::order_workflow::OrderWorkflow;

pub struct OrderService<S: ?Sized> {
    store: Arc<S>,
    aggregator: OrderAggregator<S>,
    workflow: OrderWorkflow<S>,
}

impl<S: ProductLookup + OrderStore + Transactional + ?Sized> OrderService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            aggregator: OrderAggregator::new(store.clone()),
            workflow: OrderWorkflow::new(store.clone()),
            store,
        }
    }

    pub fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        log::info!("Finding all orders.");
        self.store.list_orders(page, limit)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Order, DomainError> {
        log::info!("Finding order {}.", id);
        self.store
            .find_order(id)?
            .ok_or(DomainError::OrderNotFound(id))
    }

    pub fn create_order(
        &self,
        client: ClientInfo,
        lines: &[LineRequest],
    ) -> Result<Order, DomainError> {
        log::info!("Creating an order with {} lines.", lines.len());
        let order = self.aggregator.create_order(client, lines)?;
        self.store.insert_order(&order)?;
        log::info!("Order {} created, total {}", order.id, order.total_value);
        Ok(order)
    }

    pub fn update_order(&self, id: Uuid, client: ClientInfo) -> Result<Order, DomainError> {
        log::info!("Updating order {}.", id);
        client.validate()?;
        self.store
            .update_client(id, &client)?
            .ok_or(DomainError::OrderNotFound(id))
    }

    /// Removes the order whatever its status. Consumed stock is not restored.
    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        log::info!("Deleting order {}.", id);
        if self.store.delete_order(id)? {
            Ok(())
        } else {
            Err(DomainError::OrderNotFound(id))
        }
    }

    pub fn advance_order(
        &self,
        id: Uuid,
        expected: Option<OrderStatus>,
    ) -> Result<Order, DomainError> {
        self.workflow.advance(id, expected)
    }
}
