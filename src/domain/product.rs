use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::check_max_len;

pub const SKU_MAX_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 30;
pub const DESCRIPTION_MAX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
}

/// Client-supplied product fields, used for both creation and update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("It is necessary the product code."));
        }
        check_max_len(
            &self.sku,
            SKU_MAX_LEN,
            "The code must have a maximum of 10 characters.",
        )?;
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("It is necessary the product name."));
        }
        check_max_len(
            &self.name,
            NAME_MAX_LEN,
            "The name must have a maximum of 30 characters.",
        )?;
        if let Some(description) = &self.description {
            check_max_len(
                description,
                DESCRIPTION_MAX_LEN,
                "The description must have a maximum of 200 characters.",
            )?;
        }
        if self.unit_price <= BigDecimal::from(0) {
            return Err(DomainError::validation("The unit price must be positive."));
        }
        if self.stock_quantity < 0 {
            return Err(DomainError::validation(
                "The stock quantity cannot be negative.",
            ));
        }
        Ok(())
    }

    pub fn into_product(self, id: Uuid) -> Product {
        Product {
            id,
            sku: self.sku,
            name: self.name,
            description: self.description,
            unit_price: self.unit_price,
            stock_quantity: self.stock_quantity,
        }
    }
}
