pub mod memory;
pub mod models;
pub mod order_repo;
pub mod pg_store;
pub mod product_repo;

pub use memory::InMemoryStore;
pub use pg_store::PgStore;
