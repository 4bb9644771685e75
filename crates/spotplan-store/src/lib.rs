//! SpotPlan Store: durable SQLite storage for spot records.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;
