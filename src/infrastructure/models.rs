use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{ClientInfo, Order, OrderLine, OrderStatus};
use crate::domain::product::Product;
use crate::schema::{order_lines, orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            unit_price: row.unit_price,
            stock_quantity: row.stock_quantity,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
}

impl From<&Product> for NewProductRow {
    fn from(p: &Product) -> Self {
        NewProductRow {
            id: p.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            unit_price: p.unit_price.clone(),
            stock_quantity: p.stock_quantity,
        }
    }
}

/// Full replacement of a product's editable columns. A missing description
/// clears the stored one.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: BigDecimal,
    pub stock_quantity: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductChangeset {
    fn from(p: &Product) -> Self {
        ProductChangeset {
            sku: p.sku.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            unit_price: p.unit_price.clone(),
            stock_quantity: p.stock_quantity,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
    pub created_date: DateTime<Utc>,
    pub total_value: BigDecimal,
    pub status: String,
    pub version: i32,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    /// Assembles the aggregate; `lines` must already be in position order.
    pub fn into_order(self, lines: Vec<OrderLineRow>) -> Result<Order, DomainError> {
        let status = OrderStatus::from_str(&self.status).map_err(|_| {
            DomainError::Internal(format!(
                "order {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Order {
            id: self.id,
            client: ClientInfo {
                client_name: self.client_name,
                phone_number: self.phone_number,
                address: self.address,
            },
            created_date: self.created_date,
            total_value: self.total_value,
            status,
            version: self.version,
            lines: lines
                .into_iter()
                .map(|l| OrderLine {
                    id: l.id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
    pub created_date: DateTime<Utc>,
    pub total_value: BigDecimal,
    pub status: String,
    pub version: i32,
}

impl From<&Order> for NewOrderRow {
    fn from(o: &Order) -> Self {
        NewOrderRow {
            id: o.id,
            client_name: o.client.client_name.clone(),
            phone_number: o.client.phone_number.clone(),
            address: o.client.address.clone(),
            created_date: o.created_date,
            total_value: o.total_value.clone(),
            status: o.status.as_str().to_string(),
            version: o.version,
        }
    }
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}
