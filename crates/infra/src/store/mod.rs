//! Record store abstractions (movement ledger + status table).
//!
//! The engine never touches a storage format directly; it goes through these
//! traits. Writes are staged until [`Durable::commit`] makes them durable, and
//! [`Durable::rollback`] throws staged writes away.

use std::collections::HashMap;

use thiserror::Error;

use toolcrib_core::PartId;
use toolcrib_inventory::{InboundRecord, InventoryStatusRow, MovementRecord, Thresholds};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::{InMemoryRecordStore, LedgerSnapshot};
pub use sqlite::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Inbound side of the movement ledger: one entry per part.
pub trait InboundLedger {
    fn append_inbound(&self, record: InboundRecord) -> StoreResult<()>;

    fn find_inbound(&self, part_id: &PartId) -> StoreResult<Option<InboundRecord>>;

    /// Overwrite the live stock counter of a part's entry.
    fn set_on_hand(&self, part_id: &PartId, on_hand: u64) -> StoreResult<()>;

    /// Overwrite an existing entry (merged quantity, fields and date).
    fn update_inbound(&self, record: InboundRecord) -> StoreResult<()>;

    /// All entries in insertion order.
    fn list_inbound(&self) -> StoreResult<Vec<InboundRecord>>;
}

/// Outbound side of the movement ledger (append-only).
pub trait OutboundLedger {
    fn append_outbound(&self, record: MovementRecord) -> StoreResult<()>;

    /// All records in insertion order.
    fn list_outbound(&self) -> StoreResult<Vec<MovementRecord>>;
}

/// Derived inventory status table.
pub trait StatusTable {
    /// Swap the whole table in one step.
    fn replace_all(&self, rows: Vec<InventoryStatusRow>) -> StoreResult<()>;

    fn list_status(&self) -> StoreResult<Vec<InventoryStatusRow>>;

    fn thresholds(&self) -> StoreResult<HashMap<PartId, Thresholds>> {
        Ok(Thresholds::from_rows(&self.list_status()?))
    }
}

/// Explicit durability boundary.
pub trait Durable {
    fn commit(&self) -> StoreResult<()>;

    fn rollback(&self) -> StoreResult<()>;
}

/// Everything the warehouse service needs from persistence.
pub trait RecordStore: InboundLedger + OutboundLedger + StatusTable + Durable {}

impl<T> RecordStore for T where T: InboundLedger + OutboundLedger + StatusTable + Durable {}
