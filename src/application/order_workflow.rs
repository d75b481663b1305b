use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{CasOutcome, OrderStore, StoreScope, Transactional};
use crate::domain::workflow::{Effect, Transition};

use super::stock_ledger::StockLedger;

/// Advances orders one workflow step at a time.
///
/// Concurrent advances of the same order are serialised optimistically: each
/// step first claims the order at the version read at the start, so a lost
/// race fails before any stock is touched, and the status write is checked
/// against the same version.
pub struct OrderWorkflow<S: ?Sized> {
    store: Arc<S>,
}

impl<S: OrderStore + Transactional + ?Sized> OrderWorkflow<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Applies the single transition leaving the order's current status.
    ///
    /// `expected` is the status the caller believes the order is in; a
    /// mismatch fails with a concurrent modification instead of advancing.
    pub fn advance(
        &self,
        order_id: Uuid,
        expected: Option<OrderStatus>,
    ) -> Result<Order, DomainError> {
        let mut order = self
            .store
            .find_order(order_id)?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        if let Some(expected) = expected {
            if expected != order.status {
                log::warn!(
                    "Order {} expected in {} but is {}",
                    order_id,
                    expected,
                    order.status
                );
                return Err(DomainError::order_conflict(order_id));
            }
        }

        let transition = Transition::from_status(order.status)?;

        let mut next = None;
        self.store
            .transaction(&mut |scope: &dyn StoreScope| -> Result<(), DomainError> {
                // A lost race on the order must not surface as a stock error.
                if scope.claim_version(order.id, order.version)? == CasOutcome::Conflict {
                    return Err(DomainError::order_conflict(order.id));
                }
                let status = apply_effect(scope, transition, &order)?;
                match scope.compare_and_set_status(order.id, order.version, status)? {
                    CasOutcome::Applied => {
                        next = Some(status);
                        Ok(())
                    }
                    CasOutcome::Conflict => Err(DomainError::order_conflict(order.id)),
                }
            })
            .inspect_err(|e| {
                if e.is_retryable() {
                    log::warn!("Lost race advancing order {}: {}", order_id, e);
                }
            })?;

        let next = next.ok_or_else(|| {
            DomainError::Internal(format!("transition of order {order_id} did not complete"))
        })?;
        log::info!("Order {} moved {} -> {}", order.id, order.status, next);
        order.status = next;
        order.version += 1;
        Ok(order)
    }
}

/// Runs the transition's side effect and decides the status it lands on.
fn apply_effect(
    scope: &dyn StoreScope,
    transition: Transition,
    order: &Order,
) -> Result<OrderStatus, DomainError> {
    let ledger = StockLedger::new(scope);
    match transition.effect() {
        Effect::None => Ok(transition.target()),
        Effect::CheckAvailability { otherwise } => {
            if ledger.has_availability(order)? {
                Ok(transition.target())
            } else {
                Ok(otherwise)
            }
        }
        Effect::ConsumeStock => {
            ledger.decrement_all(order)?;
            Ok(transition.target())
        }
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::order_aggregator::OrderAggregator;
    use crate::domain::order::{ClientInfo, LineRequest};
    use crate::domain::ports::ProductLookup;
    use crate::domain::product::Product;
    use crate::infrastructure::memory::InMemoryStore;

    fn product(price: i32, stock: i32) -> Product {
        let id = Uuid::new_v4();
        Product {
            id,
            sku: format!("SKU-{}", &id.simple().to_string()[..6]),
            name: "Item".to_string(),
            description: None,
            unit_price: BigDecimal::from(price),
            stock_quantity: stock,
        }
    }

    /// Store holding `products` and one persisted order for `lines`.
    fn setup(products: Vec<Product>, lines: &[(Uuid, i32)]) -> (Arc<InMemoryStore>, Order) {
        let store = Arc::new(InMemoryStore::with_products(products));
        let requests: Vec<_> = lines
            .iter()
            .map(|&(product_id, quantity)| LineRequest {
                product_id,
                quantity,
            })
            .collect();
        let order = OrderAggregator::new(store.clone())
            .create_order(
                ClientInfo {
                    client_name: "Carla".to_string(),
                    phone_number: "5531977776666".to_string(),
                    address: "Rua da Bahia, 5".to_string(),
                },
                &requests,
            )
            .unwrap();
        store.insert_order(&order).unwrap();
        (store, order)
    }

    fn stock_of(store: &InMemoryStore, id: Uuid) -> i32 {
        store.find_product(id).unwrap().unwrap().stock_quantity
    }

    #[test]
    fn short_stock_cancels_at_evaluation() {
        let a = product(10, 2);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 3)]);
        let workflow = OrderWorkflow::new(store.clone());

        let advanced = workflow.advance(order.id, None).unwrap();

        assert_eq!(advanced.status, OrderStatus::Canceled);
        assert_eq!(stock_of(&store, a.id), 2);
    }

    #[test]
    fn full_lifecycle_consumes_stock_once() {
        let a = product(10, 5);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 3)]);
        let workflow = OrderWorkflow::new(store.clone());

        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(workflow.advance(order.id, None).unwrap().status);
        }

        assert_eq!(
            seen,
            vec![
                OrderStatus::Preparation,
                OrderStatus::Ready,
                OrderStatus::Delivery,
                OrderStatus::Concluded
            ]
        );
        assert_eq!(stock_of(&store, a.id), 2);

        let stored = store.find_order(order.id).unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Concluded);
        assert_eq!(stored.version, 4);
    }

    #[test]
    fn stock_is_untouched_before_dispatch() {
        let a = product(10, 5);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 3)]);
        let workflow = OrderWorkflow::new(store.clone());

        workflow.advance(order.id, None).unwrap();
        workflow.advance(order.id, None).unwrap();

        assert_eq!(stock_of(&store, a.id), 5);
    }

    #[test]
    fn canceled_order_rejects_advance() {
        let a = product(10, 0);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 1)]);
        let workflow = OrderWorkflow::new(store);

        workflow.advance(order.id, None).unwrap();
        assert_eq!(
            workflow.advance(order.id, None).unwrap_err(),
            DomainError::OrderCanceled
        );
    }

    #[test]
    fn concluded_order_rejects_advance() {
        let a = product(10, 1);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 1)]);
        let workflow = OrderWorkflow::new(store);
        for _ in 0..4 {
            workflow.advance(order.id, None).unwrap();
        }

        assert_eq!(
            workflow.advance(order.id, None).unwrap_err(),
            DomainError::InvalidState(OrderStatus::Concluded)
        );
    }

    #[test]
    fn failed_dispatch_keeps_order_ready_and_stock_intact() {
        let a = product(10, 5);
        let b = product(10, 5);
        let (store, order) = setup(vec![a.clone(), b.clone()], &[(a.id, 3), (b.id, 3)]);
        let workflow = OrderWorkflow::new(store.clone());
        workflow.advance(order.id, None).unwrap();
        workflow.advance(order.id, None).unwrap();

        // Stock of b drops after evaluation; dispatch must not half-apply.
        let mut drained = store.find_product(b.id).unwrap().unwrap();
        drained.stock_quantity = 1;
        crate::domain::ports::ProductCatalog::update_product(store.as_ref(), &drained).unwrap();

        let err = workflow.advance(order.id, None).unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { product_id, .. } if product_id == b.id));
        assert_eq!(stock_of(&store, a.id), 5);
        assert_eq!(stock_of(&store, b.id), 1);
        assert_eq!(
            store.find_order(order.id).unwrap().unwrap().status,
            OrderStatus::Ready
        );
    }

    #[test]
    fn stale_expected_status_is_rejected_without_advancing() {
        let a = product(10, 5);
        let (store, order) = setup(vec![a.clone()], &[(a.id, 1)]);
        let workflow = OrderWorkflow::new(store.clone());
        workflow.advance(order.id, Some(OrderStatus::Evaluation)).unwrap();

        let err = workflow
            .advance(order.id, Some(OrderStatus::Evaluation))
            .unwrap_err();

        assert_eq!(err, DomainError::order_conflict(order.id));
        assert_eq!(
            store.find_order(order.id).unwrap().unwrap().status,
            OrderStatus::Preparation
        );
    }

    #[test]
    fn unknown_order_is_not_found() {
        let store = Arc::new(InMemoryStore::default());
        let id = Uuid::new_v4();
        assert_eq!(
            OrderWorkflow::new(store).advance(id, None).unwrap_err(),
            DomainError::OrderNotFound(id)
        );
    }
}
