use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{page_offset, ListResult};
use crate::domain::ports::CasOutcome;
use crate::domain::product::Product;
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

fn map_unique_sku(e: DieselError, sku: &str) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::DuplicateSku(sku.to_string())
        }
        other => other.into(),
    }
}

pub fn find_product(conn: &mut PgConnection, id: Uuid) -> Result<Option<Product>, DomainError> {
    let row = products::table
        .find(id)
        .select(ProductRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Product::from))
}

pub fn list_products(
    conn: &mut PgConnection,
    page: i64,
    limit: i64,
) -> Result<ListResult<Product>, DomainError> {
    let offset = page_offset(page, limit);
    conn.transaction::<_, DomainError, _>(|conn| {
        let total: i64 = products::table.count().get_result(conn)?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::sku.asc())
            .limit(limit)
            .offset(offset)
            .load(conn)?;

        Ok(ListResult {
            items: rows.into_iter().map(Product::from).collect(),
            total,
        })
    })
}

pub fn insert_product(conn: &mut PgConnection, product: &Product) -> Result<(), DomainError> {
    diesel::insert_into(products::table)
        .values(&NewProductRow::from(product))
        .execute(conn)
        .map_err(|e| map_unique_sku(e, &product.sku))?;
    Ok(())
}

pub fn update_product(conn: &mut PgConnection, product: &Product) -> Result<bool, DomainError> {
    let updated = diesel::update(products::table.find(product.id))
        .set(&ProductChangeset::from(product))
        .execute(conn)
        .map_err(|e| map_unique_sku(e, &product.sku))?;
    Ok(updated > 0)
}

pub fn delete_product(conn: &mut PgConnection, id: Uuid) -> Result<bool, DomainError> {
    let deleted = diesel::delete(products::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

/// Writes `new` only while the stored quantity still equals `expected`.
///
/// Under Postgres row locking a concurrent writer blocks this statement until
/// it commits; the predicate is then re-evaluated against the committed value.
pub fn compare_and_set_quantity(
    conn: &mut PgConnection,
    id: Uuid,
    expected: i32,
    new: i32,
) -> Result<CasOutcome, DomainError> {
    let updated = diesel::update(
        products::table
            .filter(products::id.eq(id))
            .filter(products::stock_quantity.eq(expected)),
    )
    .set((
        products::stock_quantity.eq(new),
        products::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    Ok(if updated == 1 {
        CasOutcome::Applied
    } else {
        CasOutcome::Conflict
    })
}
