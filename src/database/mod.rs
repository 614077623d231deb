pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;

pub use manager::DatabaseError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Store, ENROLLMENT_UNIQUE_CONSTRAINT};
