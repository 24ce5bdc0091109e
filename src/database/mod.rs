pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod seed;
pub mod store;

pub use manager::DatabaseManager;
pub use memory::MemoryEngineerStore;
pub use models::{Engineer, EngineerFilter, EngineerTemplate};
pub use postgres::PgEngineerStore;
pub use store::{abort, EngineerSession, EngineerStore, StoreError};
