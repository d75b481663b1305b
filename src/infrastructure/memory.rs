//! In-process store implementing every port, used by tests and local runs
//! without a database.
//!
//! Transactions hold the store lock for their whole duration and work on a
//! copy of the state that replaces the live one only on success.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, ClientInfo, ListResult, Order, OrderStatus};
use crate::domain::ports::{
    CasOutcome, OrderStore, ProductCatalog, ProductLookup, ProductStore, StoreScope,
    Transactional,
};
use crate::domain::product::Product;

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<Uuid, Product>,
    orders: HashMap<Uuid, Order>,
}

impl State {
    fn find_product(&self, id: Uuid) -> Option<Product> {
        self.products.get(&id).cloned()
    }

    fn list_products(&self, page: i64, limit: i64) -> ListResult<Product> {
        let mut items: Vec<_> = self.products.values().cloned().collect();
        items.sort_by(|a, b| a.sku.cmp(&b.sku));
        paginate(items, page, limit)
    }

    fn ensure_unique_sku(&self, product: &Product) -> Result<(), DomainError> {
        let taken = self
            .products
            .values()
            .any(|p| p.id != product.id && p.sku == product.sku);
        if taken {
            return Err(DomainError::DuplicateSku(product.sku.clone()));
        }
        Ok(())
    }

    fn insert_product(&mut self, product: &Product) -> Result<(), DomainError> {
        self.ensure_unique_sku(product)?;
        if self.products.contains_key(&product.id) {
            return Err(DomainError::Internal(format!(
                "product {} already stored",
                product.id
            )));
        }
        self.products.insert(product.id, product.clone());
        Ok(())
    }

    fn update_product(&mut self, product: &Product) -> Result<bool, DomainError> {
        if !self.products.contains_key(&product.id) {
            return Ok(false);
        }
        self.ensure_unique_sku(product)?;
        self.products.insert(product.id, product.clone());
        Ok(true)
    }

    fn delete_product(&mut self, id: Uuid) -> bool {
        self.products.remove(&id).is_some()
    }

    fn compare_and_set_quantity(&mut self, id: Uuid, expected: i32, new: i32) -> CasOutcome {
        match self.products.get_mut(&id) {
            Some(product) if product.stock_quantity == expected && new >= 0 => {
                product.stock_quantity = new;
                CasOutcome::Applied
            }
            _ => CasOutcome::Conflict,
        }
    }

    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
        if self.orders.contains_key(&order.id) {
            return Err(DomainError::Internal(format!(
                "order {} already stored",
                order.id
            )));
        }
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    fn find_order(&self, id: Uuid) -> Option<Order> {
        self.orders.get(&id).cloned()
    }

    fn list_orders(&self, page: i64, limit: i64) -> ListResult<Order> {
        let mut items: Vec<_> = self.orders.values().cloned().collect();
        items.sort_by(|a, b| {
            b.created_date
                .cmp(&a.created_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        paginate(items, page, limit)
    }

    fn update_client(&mut self, id: Uuid, client: &ClientInfo) -> Option<Order> {
        let order = self.orders.get_mut(&id)?;
        order.client = client.clone();
        Some(order.clone())
    }

    fn claim_version(&self, id: Uuid, expected_version: i32) -> CasOutcome {
        match self.orders.get(&id) {
            Some(order) if order.version == expected_version => CasOutcome::Applied,
            _ => CasOutcome::Conflict,
        }
    }

    fn compare_and_set_status(
        &mut self,
        id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> CasOutcome {
        match self.orders.get_mut(&id) {
            Some(order) if order.version == expected_version => {
                order.status = status;
                order.version += 1;
                CasOutcome::Applied
            }
            _ => CasOutcome::Conflict,
        }
    }

    fn delete_order(&mut self, id: Uuid) -> bool {
        self.orders.remove(&id).is_some()
    }
}

fn paginate<T>(items: Vec<T>, page: i64, limit: i64) -> ListResult<T> {
    let total = items.len() as i64;
    let skip = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(0);
    ListResult {
        items: items.into_iter().skip(skip).take(take).collect(),
        total,
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            state: Mutex::new(State {
                products,
                orders: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Internal("in-memory store lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, DomainError> {
        let state = self.lock()?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, DomainError> {
        let mut state = self.lock()?;
        Ok(f(&mut state))
    }
}

/// Transaction view over a private copy of the store state.
struct MemoryScope {
    state: RefCell<State>,
}

impl MemoryScope {
    fn read<T>(&self, f: impl FnOnce(&State) -> T) -> Result<T, DomainError> {
        let state = self
            .state
            .try_borrow()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(f(&state))
    }

    fn write<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, DomainError> {
        let mut state = self
            .state
            .try_borrow_mut()
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        Ok(f(&mut state))
    }
}

impl Transactional for InMemoryStore {
    fn transaction(
        &self,
        work: &mut dyn FnMut(&dyn StoreScope) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut guard = self.lock()?;
        let scope = MemoryScope {
            state: RefCell::new((*guard).clone()),
        };
        work(&scope)?;
        *guard = scope.state.into_inner();
        Ok(())
    }
}

impl ProductLookup for InMemoryStore {
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.read(|s| s.find_product(id))
    }
}

impl ProductStore for InMemoryStore {
    fn compare_and_set_quantity(
        &self,
        id: Uuid,
        expected: i32,
        new: i32,
    ) -> Result<CasOutcome, DomainError> {
        self.write(|s| s.compare_and_set_quantity(id, expected, new))
    }
}

impl ProductCatalog for InMemoryStore {
    fn list_products(&self, page: i64, limit: i64) -> Result<ListResult<Product>, DomainError> {
        self.read(|s| s.list_products(page, limit))
    }

    fn insert_product(&self, product: &Product) -> Result<(), DomainError> {
        self.write(|s| s.insert_product(product))?
    }

    fn update_product(&self, product: &Product) -> Result<bool, DomainError> {
        self.write(|s| s.update_product(product))?
    }

    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError> {
        self.write(|s| s.delete_product(id))
    }
}

impl OrderStore for InMemoryStore {
    fn insert_order(&self, order: &Order) -> Result<(), DomainError> {
        self.write(|s| s.insert_order(order))?
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.read(|s| s.find_order(id))
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        self.read(|s| s.list_orders(page, limit))
    }

    fn update_client(&self, id: Uuid, client: &ClientInfo) -> Result<Option<Order>, DomainError> {
        self.write(|s| s.update_client(id, client))
    }

    fn claim_version(&self, id: Uuid, expected_version: i32) -> Result<CasOutcome, DomainError> {
        self.read(|s| s.claim_version(id, expected_version))
    }

    fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> Result<CasOutcome, DomainError> {
        self.write(|s| s.compare_and_set_status(id, expected_version, status))
    }

    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError> {
        self.write(|s| s.delete_order(id))
    }
}

impl ProductLookup for MemoryScope {
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.read(|s| s.find_product(id))
    }
}

impl ProductStore for MemoryScope {
    fn compare_and_set_quantity(
        &self,
        id: Uuid,
        expected: i32,
        new: i32,
    ) -> Result<CasOutcome, DomainError> {
        self.write(|s| s.compare_and_set_quantity(id, expected, new))
    }
}

impl OrderStore for MemoryScope {
    fn insert_order(&self, order: &Order) -> Result<(), DomainError> {
        self.write(|s| s.insert_order(order))?
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.read(|s| s.find_order(id))
    }

    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError> {
        self.read(|s| s.list_orders(page, limit))
    }

    fn update_client(&self, id: Uuid, client: &ClientInfo) -> Result<Option<Order>, DomainError> {
        self.write(|s| s.update_client(id, client))
    }

    fn claim_version(&self, id: Uuid, expected_version: i32) -> Result<CasOutcome, DomainError> {
        self.read(|s| s.claim_version(id, expected_version))
    }

    fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> Result<CasOutcome, DomainError> {
        self.write(|s| s.compare_and_set_status(id, expected_version, status))
    }

    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError> {
        self.write(|s| s.delete_order(id))
    }
}
