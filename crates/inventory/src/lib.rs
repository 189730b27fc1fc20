//! Inventory reconciliation and forecasting engine.
//!
//! This crate contains the business rules for warehouse stock, implemented
//! purely as deterministic domain logic (no IO, no storage). Callers pass the
//! movement ledger and existing thresholds in explicitly; every function
//! returns a fresh result instead of mutating shared state.

pub mod aggregator;
pub mod forecast;
pub mod movement;
pub mod reconcile;
pub mod report;
pub mod status;

pub use aggregator::{AggregatedStock, StockLevel, aggregate_stock};
pub use forecast::{DemandForecaster, ForecastPolicy, consumption_in_window, forecast};
pub use movement::{
    InboundRecord, IssueStock, MovementDetails, MovementKind, MovementRecord, ReceiveStock,
    RecordDate, UpsertOutcome,
};
pub use reconcile::{InventoryStatusRow, Thresholds, default_thresholds, reconcile};
pub use report::{Report, RestockSuggestion, generate_report};
pub use status::{StockStatus, classify};
