use std::sync::Arc;

use actix_web::{web, HttpRequest};
use serde::Deserialize;
use utoipa::{IntoParams, OpenApi};

use crate::application::order_service::OrderService;
use crate::application::product_service::ProductService;
use crate::domain::errors::DomainError;
use crate::domain::ports::Store;
use crate::errors::{ApiError, AppError, ErrorBody};

pub mod orders;
pub mod products;

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

/// Services shared by every worker.
pub struct AppState {
    pub orders: OrderService<dyn Store>,
    pub products: ProductService<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            orders: OrderService::new(store.clone()),
            products: ProductService::new(store),
        }
    }
}

/// Runs blocking store work on the actix thread pool and maps its errors
/// to a response bound to `req`.
pub(crate) async fn run_blocking<T, F>(req: &HttpRequest, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()).at(req))?
        .map_err(|e| AppError::from(e).at(req))
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 10, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl PageParams {
    /// `(page, limit)` forced into their valid ranges.
    pub fn normalized(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, MAX_PAGE_LIMIT))
    }
}

// ── Routing ──────────────────────────────────────────────────────────────────

/// Registers extractor error handlers and every API route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        AppError::BadRequest(err.to_string()).at(req).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        AppError::BadRequest(err.to_string()).at(req).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, req| {
        AppError::BadRequest(err.to_string()).at(req).into()
    }))
    .service(
        web::resource("/api/order")
            .route(web::get().to(orders::list_orders))
            .route(web::post().to(orders::create_order)),
    )
    .service(web::resource("/api/order/status").route(web::patch().to(orders::advance_order)))
    .service(
        web::resource("/api/order/{id}")
            .route(web::get().to(orders::get_order))
            .route(web::put().to(orders::update_order))
            .route(web::delete().to(orders::delete_order)),
    )
    .service(
        web::resource("/api/product")
            .route(web::get().to(products::list_products))
            .route(web::post().to(products::create_product)),
    )
    .service(
        web::resource("/api/product/{id}")
            .route(web::get().to(products::get_product))
            .route(web::put().to(products::update_product))
            .route(web::delete().to(products::delete_product)),
    );
}

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::advance_order,
        orders::delete_order,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
    ),
    components(schemas(ErrorBody)),
    tags(
        (name = "orders", description = "Order intake and fulfillment workflow"),
        (name = "products", description = "Product catalog and stock"),
    )
)]
pub struct ApiDoc;
