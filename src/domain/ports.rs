use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ClientInfo, ListResult, Order, OrderStatus};
use super::product::Product;

/// Result of a compare-and-set write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    /// The stored value no longer matched the expected one; nothing was written.
    Conflict,
}

pub trait ProductLookup {
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
}

pub trait ProductStore: ProductLookup {
    fn compare_and_set_quantity(
        &self,
        id: Uuid,
        expected: i32,
        new: i32,
    ) -> Result<CasOutcome, DomainError>;
}

/// Product CRUD, used outside the order lifecycle.
pub trait ProductCatalog: ProductLookup {
    fn list_products(&self, page: i64, limit: i64) -> Result<ListResult<Product>, DomainError>;
    fn insert_product(&self, product: &Product) -> Result<(), DomainError>;
    /// Returns `false` when no product has `product.id`.
    fn update_product(&self, product: &Product) -> Result<bool, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderStore {
    /// Persists the order together with its lines.
    fn insert_order(&self, order: &Order) -> Result<(), DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_orders(&self, page: i64, limit: i64) -> Result<ListResult<Order>, DomainError>;
    /// Overwrites the client fields only; status and version are untouched.
    fn update_client(&self, id: Uuid, client: &ClientInfo) -> Result<Option<Order>, DomainError>;
    /// Confirms the order is still at `expected_version` and holds it there
    /// until the enclosing transaction ends. Concurrent claims of the same
    /// version wait, and all but the first see `Conflict`.
    fn claim_version(&self, id: Uuid, expected_version: i32) -> Result<CasOutcome, DomainError>;
    /// Sets `status` and bumps the version if the stored version equals
    /// `expected_version`.
    fn compare_and_set_status(
        &self,
        id: Uuid,
        expected_version: i32,
        status: OrderStatus,
    ) -> Result<CasOutcome, DomainError>;
    fn delete_order(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// Stores visible inside a transaction.
pub trait StoreScope: ProductStore + OrderStore {}

impl<T: ProductStore + OrderStore> StoreScope for T {}

pub trait Transactional {
    /// Runs `work` against a scope whose writes commit together when it
    /// returns `Ok` and are discarded when it returns `Err`.
    fn transaction(
        &self,
        work: &mut dyn FnMut(&dyn StoreScope) -> Result<(), DomainError>,
    ) -> Result<(), DomainError>;
}

/// Everything the HTTP layer needs from a backing store.
pub trait Store:
    ProductCatalog + ProductStore + OrderStore + Transactional + Send + Sync + 'static
{
}

impl<T> Store for T where
    T: ProductCatalog + ProductStore + OrderStore + Transactional + Send + Sync + 'static
{
}
