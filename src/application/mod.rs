pub mod order_aggregator;
pub mod order_service;
pub mod order_workflow;
pub mod product_service;
pub mod stock_ledger;
