use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::{CasOutcome, ProductLookup, ProductStore};

/// Authoritative view of product stock for the order lifecycle.
pub struct StockLedger<'a, P: ?Sized> {
    products: &'a P,
}

impl<'a, P: ProductLookup + ?Sized> StockLedger<'a, P> {
    pub fn new(products: &'a P) -> Self {
        Self { products }
    }

    /// True iff every product the order references has enough stock for the
    /// order's full demand. A product that no longer exists is unavailable.
    pub fn has_availability(&self, order: &Order) -> Result<bool, DomainError> {
        for (product_id, requested) in order.demand() {
            match self.products.find_product(product_id)? {
                Some(product) if i64::from(product.stock_quantity) >= requested => {}
                Some(product) => {
                    log::info!(
                        "Order {} short on product {}: requested {}, in stock {}",
                        order.id,
                        product_id,
                        requested,
                        product.stock_quantity
                    );
                    return Ok(false);
                }
                None => {
                    log::info!(
                        "Order {} references missing product {}",
                        order.id,
                        product_id
                    );
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

impl<'a, P: ProductStore + ?Sized> StockLedger<'a, P> {
    /// Consumes the order's demand from every product, or from none.
    ///
    /// Every product is checked before the first write, so a shortage leaves
    /// all stock untouched. A compare-and-set lost to a concurrent writer
    /// after earlier writes succeeded leaves those writes in place; callers
    /// run this inside [`Transactional::transaction`] so they roll back.
    ///
    /// [`Transactional::transaction`]: crate::domain::ports::Transactional::transaction
    pub fn decrement_all(&self, order: &Order) -> Result<(), DomainError> {
        let mut plan = Vec::new();
        for (product_id, requested) in order.demand() {
            let product = self
                .products
                .find_product(product_id)?
                .ok_or(DomainError::ProductNotFound(product_id))?;
            let remaining = remaining_after(product_id, product.stock_quantity, requested)?;
            plan.push((product_id, product.stock_quantity, remaining));
        }

        for (product_id, expected, remaining) in plan {
            match self
                .products
                .compare_and_set_quantity(product_id, expected, remaining)?
            {
                CasOutcome::Applied => {
                    log::debug!(
                        "Stock of product {} decremented {} -> {}",
                        product_id,
                        expected,
                        remaining
                    );
                }
                CasOutcome::Conflict => {
                    return Err(self.explain_conflict(product_id, i64::from(expected - remaining)))
                }
            }
        }
        Ok(())
    }

    /// Re-reads a product whose stock changed under us and reports a shortage
    /// if the concurrent writer left too little.
    fn explain_conflict(&self, product_id: Uuid, requested: i64) -> DomainError {
        match self.products.find_product(product_id) {
            Ok(Some(product)) => match remaining_after(product_id, product.stock_quantity, requested) {
                Err(shortage) => shortage,
                Ok(_) => DomainError::product_conflict(product_id),
            },
            Ok(None) => DomainError::ProductNotFound(product_id),
            Err(e) => e,
        }
    }
}

fn remaining_after(product_id: Uuid, available: i32, requested: i64) -> Result<i32, DomainError> {
    let remaining = i64::from(available) - requested;
    if remaining < 0 {
        return Err(DomainError::InsufficientStock {
            product_id,
            requested,
            available: i64::from(available),
        });
    }
    i32::try_from(remaining).map_err(|e| DomainError::Internal(e.to_string()))
}
