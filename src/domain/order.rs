use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const CLIENT_NAME_MAX_LEN: usize = 50;
pub const PHONE_NUMBER_MAX_LEN: usize = 13;
pub const ADDRESS_MAX_LEN: usize = 100;

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Evaluation,
    Preparation,
    Ready,
    Delivery,
    Concluded,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Evaluation,
        OrderStatus::Preparation,
        OrderStatus::Ready,
        OrderStatus::Delivery,
        OrderStatus::Concluded,
        OrderStatus::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Evaluation => "EVALUATION",
            OrderStatus::Preparation => "PREPARATION",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivery => "DELIVERY",
            OrderStatus::Concluded => "CONCLUDED",
            OrderStatus::Canceled => "CANCELED",
        }
    }

    /// Statuses reachable from `self` in a single step.
    pub fn successors(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Evaluation => &[OrderStatus::Preparation, OrderStatus::Canceled],
            OrderStatus::Preparation => &[OrderStatus::Ready],
            OrderStatus::Ready => &[OrderStatus::Delivery],
            OrderStatus::Delivery => &[OrderStatus::Concluded],
            OrderStatus::Concluded | OrderStatus::Canceled => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown order status '{s}'")))
    }
}

/// Contact details of the client placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
}

impl ClientInfo {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.client_name.trim().is_empty() {
            return Err(DomainError::validation("The client name must not be blank."));
        }
        check_max_len(
            &self.client_name,
            CLIENT_NAME_MAX_LEN,
            "The client name must have a maximum of 50 characters.",
        )?;
        check_max_len(
            &self.phone_number,
            PHONE_NUMBER_MAX_LEN,
            "The phone number must have a maximum of 13 digits.",
        )?;
        check_max_len(
            &self.address,
            ADDRESS_MAX_LEN,
            "The address must have a maximum of 100 characters.",
        )
    }
}

pub(crate) fn check_max_len(value: &str, max: usize, msg: &str) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(msg));
    }
    Ok(())
}

/// A requested (product, quantity) pair, before the product is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Product price observed when the order was created.
    pub unit_price: BigDecimal,
}

impl OrderLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * &BigDecimal::from(self.quantity)
    }
}

/// Aggregate root: an order owns its lines and is persisted with them as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub client: ClientInfo,
    pub created_date: DateTime<Utc>,
    pub total_value: BigDecimal,
    pub status: OrderStatus,
    /// Bumped on every status transition.
    pub version: i32,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Total quantity demanded per product, in product id order.
    ///
    /// Lines naming the same product are summed so that stock checks see the
    /// full demand of the order.
    pub fn demand(&self) -> BTreeMap<Uuid, i64> {
        let mut demand = BTreeMap::new();
        for line in &self.lines {
            *demand.entry(line.product_id).or_insert(0) += i64::from(line.quantity);
        }
        demand
    }
}

#[derive(Debug, Clone)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Rows to skip before `page`. Saturates instead of overflowing, so a huge
/// page number simply lands past the end of the list.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(limit.max(0))
}
