use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::ListResult;
use crate::domain::ports::ProductCatalog;
use crate::domain::product::{Product, ProductDraft};

pub struct ProductService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ProductCatalog + ?Sized> ProductService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn list_products(&self, page: i64, limit: i64) -> Result<ListResult<Product>, DomainError> {
        log::info!("Finding all products.");
        self.store.list_products(page, limit)
    }

    pub fn get_product(&self, id: Uuid) -> Result<Product, DomainError> {
        log::info!("Finding product {}.", id);
        self.store
            .find_product(id)?
            .ok_or(DomainError::ProductNotFound(id))
    }

    pub fn create_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        log::info!("Saving product {}.", draft.sku);
        draft.validate()?;
        let product = draft.into_product(Uuid::new_v4());
        self.store.insert_product(&product)?;
        Ok(product)
    }

    /// Replaces every field, stock quantity included.
    pub fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Product, DomainError> {
        log::info!("Updating product {}.", id);
        draft.validate()?;
        let product = draft.into_product(id);
        if self.store.update_product(&product)? {
            Ok(product)
        } else {
            Err(DomainError::ProductNotFound(id))
        }
    }

    pub fn delete_product(&self, id: Uuid) -> Result<(), DomainError> {
        log::info!("Deleting product {}.", id);
        if self.store.delete_product(id)? {
            Ok(())
        } else {
            Err(DomainError::ProductNotFound(id))
        }
    }
}
