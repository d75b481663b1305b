use std::str::FromStr;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{ClientInfo, LineRequest, Order, OrderLine, OrderStatus};
use crate::errors::{ApiError, AppError, ErrorBody};

use super::{run_blocking, AppState, PageParams};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
    pub lines: Vec<CreateOrderLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
}

impl From<UpdateOrderRequest> for ClientInfo {
    fn from(r: UpdateOrderRequest) -> Self {
        ClientInfo {
            client_name: r.client_name,
            phone_number: r.phone_number,
            address: r.address,
        }
    }
}

/// Moves an order one step along its workflow.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceOrderRequest {
    pub id: Uuid,
    /// Status the caller believes the order is in. The request fails with
    /// 409 when the order has already moved on.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusResponse {
    pub id: Uuid,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Decimal as a string, e.g. "9.99"
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(l: &OrderLine) -> Self {
        OrderLineResponse {
            id: l.id,
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: l.unit_price.to_string(),
            line_total: l.line_total().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub client_name: String,
    pub phone_number: String,
    pub address: String,
    pub created_date: String,
    pub total_value: String,
    pub status: String,
    pub version: i32,
    pub lines: Vec<OrderLineResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            lines: o.lines.iter().map(OrderLineResponse::from).collect(),
            client_name: o.client.client_name,
            phone_number: o.client.phone_number,
            address: o.client.address,
            created_date: o.created_date.to_rfc3339(),
            total_value: o.total_value.to_string(),
            status: o.status.to_string(),
            version: o.version,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/order
///
/// Returns a page of orders, newest first, each with its lines.
#[utoipa::path(
    get,
    path = "/api/order",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, ApiError> {
    let (page, limit) = query.normalized();

    let result = run_blocking(&req, move || state.orders.list_orders(page, limit)).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /api/order/{id}
#[utoipa::path(
    get,
    path = "/api/order/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn get_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let order = run_blocking(&req, move || state.orders.get_order(id)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /api/order
///
/// Creates an order in EVALUATION, pricing each line at the product's current
/// unit price. Stock is not touched until the order is dispatched.
#[utoipa::path(
    post,
    path = "/api/order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse,
            headers(("Location" = String, description = "URI of the new order"))),
        (status = 400, description = "Invalid client data or lines", body = ErrorBody),
        (status = 404, description = "A line names an unknown product", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn create_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let client = ClientInfo {
        client_name: body.client_name,
        phone_number: body.phone_number,
        address: body.address,
    };
    let lines: Vec<LineRequest> = body
        .lines
        .iter()
        .map(|l| LineRequest {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();

    let order = run_blocking(&req, move || state.orders.create_order(client, &lines)).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/order/{}", order.id)))
        .json(OrderResponse::from(order)))
}

/// PUT /api/order/{id}
///
/// Replaces the client details. Status and lines are left as they are.
#[utoipa::path(
    put,
    path = "/api/order/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid client data", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn update_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let client = ClientInfo::from(body.into_inner());

    let order = run_blocking(&req, move || state.orders.update_order(id, client)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /api/order/status
///
/// Advances the order by exactly one step. Leaving EVALUATION checks stock and
/// may cancel the order; leaving READY consumes stock.
#[utoipa::path(
    patch,
    path = "/api/order/status",
    request_body = AdvanceOrderRequest,
    responses(
        (status = 200, description = "Order advanced", body = OrderStatusResponse),
        (status = 400, description = "Order canceled or unknown status", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 409, description = "Terminal status, insufficient stock or concurrent change", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn advance_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<AdvanceOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let expected = body
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()
        .map_err(|e| AppError::from(e).at(&req))?;
    let id = body.id;

    let order = run_blocking(&req, move || state.orders.advance_order(id, expected)).await?;

    Ok(HttpResponse::Ok().json(OrderStatusResponse {
        id: order.id,
        status: order.status.to_string(),
    }))
}

/// DELETE /api/order/{id}
///
/// Removes the order in any status. Stock already consumed is not restored.
#[utoipa::path(
    delete,
    path = "/api/order/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    run_blocking(&req, move || state.orders.delete_order(id)).await?;

    Ok(HttpResponse::NoContent().finish())
}
