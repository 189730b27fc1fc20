//! Infrastructure layer: record stores, config, and the warehouse service.

pub mod config;
pub mod store;
pub mod warehouse;


pub use config::{ConfigError, WarehouseConfig};
pub use store::{InMemoryRecordStore, LedgerSnapshot, RecordStore, SqliteRecordStore, StoreError};
pub use warehouse::{ErrorKind, Warehouse, WarehouseError, WarehouseResult};
