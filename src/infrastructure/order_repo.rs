use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, ClientInfo, ListResult, Order, OrderStatus};
use crate::domain::ports::CasOutcome;
use crate::schema::{order_lines, orders};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

/// Inserts the order and its lines in one transaction.
pub fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), DomainError> {
    conn.transaction::<_, DomainError, _>(|conn| {
        diesel::insert_into(orders::table)
            .values(&NewOrderRow::from(order))
            .execute(conn)?;

        let new_lines: Vec<NewOrderLineRow> = order
            .lines
            .iter()
            .enumerate()
            .map(|(position, l)| NewOrderLineRow {
                id: l.id,
                order_id: order.id,
                product_id: l.product_id,
                position: position as i32,
                quantity: l.quantity,
                unit_price: l.unit_price.clone(),
            })
            .collect();
        diesel::insert_into(order_lines::table)
            .values(&new_lines)
            .execute(conn)?;

        Ok(())
    })
}

pub fn find_order(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, DomainError> {
    let order = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(order) = order else {
        return Ok(None);
    };

    let lines = OrderLineRow::belonging_to(&order)
        .select(OrderLineRow::as_select())
        .order(order_lines::position.asc())
        .load(conn)?;

    order.into_order(lines).map(Some)
}

pub fn list_orders(
    conn: &mut PgConnection,
    page: i64,
    limit: i64,
) -> Result<ListResult<Order>, DomainError> {
    let offset = page_offset(page, limit);
    conn.transaction::<_, DomainError, _>(|conn| {
        let total: i64 = orders::table.count().get_result(conn)?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order((orders::created_date.desc(), orders::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(conn)?;

        let lines = OrderLineRow::belonging_to(&rows)
            .select(OrderLineRow::as_select())
            .order(order_lines::position.asc())
            .load(conn)?;
        let grouped = lines.grouped_by(&rows);

        let items = rows
            .into_iter()
            .zip(grouped)
            .map(|(row, lines)| row.into_order(lines))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListResult { items, total })
    })
}

pub fn update_client(
    conn: &mut PgConnection,
    id: Uuid,
    client: &ClientInfo,
) -> Result<Option<Order>, DomainError> {
    let updated = diesel::update(orders::table.find(id))
        .set((
            orders::client_name.eq(&client.client_name),
            orders::phone_number.eq(&client.phone_number),
            orders::address.eq(&client.address),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Ok(None);
    }
    find_order(conn, id)
}

/// Locks the order row with `FOR UPDATE` if it is still at `expected_version`.
///
/// A concurrent claimant blocks on the row lock; once the holder commits a
/// version bump, its predicate no longer matches and it gets `Conflict`.
pub fn claim_version(
    conn: &mut PgConnection,
    id: Uuid,
    expected_version: i32,
) -> Result<CasOutcome, DomainError> {
    let claimed = orders::table
        .filter(orders::id.eq(id))
        .filter(orders::version.eq(expected_version))
        .select(orders::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()?;

    Ok(if claimed.is_some() {
        CasOutcome::Applied
    } else {
        CasOutcome::Conflict
    })
}

pub fn compare_and_set_status(
    conn: &mut PgConnection,
    id: Uuid,
    expected_version: i32,
    status: OrderStatus,
) -> Result<CasOutcome, DomainError> {
    let updated = diesel::update(
        orders::table
            .filter(orders::id.eq(id))
            .filter(orders::version.eq(expected_version)),
    )
    .set((
        orders::status.eq(status.as_str()),
        orders::version.eq(orders::version + 1),
        orders::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    Ok(if updated == 1 {
        CasOutcome::Applied
    } else {
        CasOutcome::Conflict
    })
}

/// Lines go with the order through `ON DELETE CASCADE`.
pub fn delete_order(conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
    let deleted = diesel::delete(orders::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}
