use std::str::FromStr;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::product::{Product, ProductDraft};
use crate::errors::{ApiError, AppError, ErrorBody};

use super::{run_blocking, AppState, PageParams};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub stock_quantity: i32,
}

impl TryFrom<ProductRequest> for ProductDraft {
    type Error = DomainError;

    fn try_from(r: ProductRequest) -> Result<Self, Self::Error> {
        let unit_price = BigDecimal::from_str(r.unit_price.trim()).map_err(|e| {
            DomainError::validation(format!("Invalid unit_price '{}': {}", r.unit_price, e))
        })?;
        Ok(ProductDraft {
            sku: r.sku,
            name: r.name,
            description: r.description,
            unit_price,
            stock_quantity: r.stock_quantity,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: String,
    pub stock_quantity: i32,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            sku: p.sku,
            name: p.name,
            description: p.description,
            unit_price: p.unit_price.to_string(),
            stock_quantity: p.stock_quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn parse_draft(req: &HttpRequest, body: ProductRequest) -> Result<ProductDraft, ApiError> {
    ProductDraft::try_from(body).map_err(|e| AppError::from(e).at(req))
}

/// GET /api/product
#[utoipa::path(
    get,
    path = "/api/product",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of products", body = ListProductsResponse),
        (status = 400, description = "Malformed query string", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "products"
)]
pub async fn list_products(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, ApiError> {
    let (page, limit) = query.normalized();

    let result = run_blocking(&req, move || state.products.list_products(page, limit)).await?;

    Ok(HttpResponse::Ok().json(ListProductsResponse {
        items: result.items.into_iter().map(ProductResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /api/product/{id}
#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "products"
)]
pub async fn get_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let product = run_blocking(&req, move || state.products.get_product(id)).await?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /api/product
#[utoipa::path(
    post,
    path = "/api/product",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse,
            headers(("Location" = String, description = "URI of the new product"))),
        (status = 400, description = "Invalid product fields", body = ErrorBody),
        (status = 409, description = "SKU already in use", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "products"
)]
pub async fn create_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, ApiError> {
    let draft = parse_draft(&req, body.into_inner())?;

    let product = run_blocking(&req, move || state.products.create_product(draft)).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/product/{}", product.id)))
        .json(ProductResponse::from(product)))
}

/// PUT /api/product/{id}
///
/// Replaces every field, stock quantity included.
#[utoipa::path(
    put,
    path = "/api/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product fields", body = ErrorBody),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 409, description = "SKU already in use", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "products"
)]
pub async fn update_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let draft = parse_draft(&req, body.into_inner())?;

    let product = run_blocking(&req, move || state.products.update_product(id, draft)).await?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /api/product/{id}
#[utoipa::path(
    delete,
    path = "/api/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "products"
)]
pub async fn delete_product(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    run_blocking(&req, move || state.products.delete_product(id)).await?;

    Ok(HttpResponse::NoContent().finish())
}
