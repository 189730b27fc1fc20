//! Warehouse service: the engine's operations over a record store.
//!
//! ```text
//! upsert_inbound / record_outbound
//!   ↓
//! 1. Validate + decide in the domain (no writes on rejection)
//!   ↓
//! 2. Stage ledger writes
//!   ↓
//! 3. Reconcile: rebuild the status table from the full ledger
//!   ↓
//! 4. Commit (or roll back everything staged on failure)
//! ```
//!
//! Mutating operations take `&mut self`, so two of them can never interleave
//! their reads and writes within one session.

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use toolcrib_core::{DomainError, PartId};
use toolcrib_inventory::{
    DemandForecaster, ForecastPolicy, InboundRecord, InventoryStatusRow, IssueStock,
    MovementRecord, ReceiveStock, Report, Thresholds, UpsertOutcome, generate_report, reconcile,
};

use crate::config::WarehouseConfig;
use crate::store::{RecordStore, StoreError};

/// Stable error categories for the presentation layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UnknownPart,
    InsufficientStock,
    Persistence,
    Internal,
}

#[derive(Debug, Error)]
pub enum WarehouseError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl WarehouseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WarehouseError::Domain(DomainError::Validation(_))
            | WarehouseError::Domain(DomainError::InvalidId(_)) => ErrorKind::Validation,
            WarehouseError::Domain(DomainError::UnknownPart { .. }) => ErrorKind::UnknownPart,
            WarehouseError::Domain(DomainError::InsufficientStock { .. }) => {
                ErrorKind::InsufficientStock
            }
            WarehouseError::Domain(DomainError::InvariantViolation(_)) => ErrorKind::Internal,
            WarehouseError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Inventory engine bound to one record store.
#[derive(Debug)]
pub struct Warehouse<S> {
    store: S,
    forecaster: DemandForecaster,
    forecast_window_days: u32,
}

impl<S> Warehouse<S>
where
    S: RecordStore,
{
    pub fn new(store: S) -> Self {
        Self::with_config(store, &WarehouseConfig::default())
    }

    pub fn with_config(store: S, config: &WarehouseConfig) -> Self {
        Self {
            store,
            forecaster: DemandForecaster::default(),
            forecast_window_days: config.forecast_window_days,
        }
    }

    pub fn with_policy(mut self, policy: ForecastPolicy) -> Self {
        self.forecaster = DemandForecaster::new(policy);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn inbound_history(&self) -> WarehouseResult<Vec<InboundRecord>> {
        Ok(self.store.list_inbound()?)
    }

    pub fn outbound_history(&self) -> WarehouseResult<Vec<MovementRecord>> {
        Ok(self.store.list_outbound()?)
    }

    pub fn status_table(&self) -> WarehouseResult<Vec<InventoryStatusRow>> {
        Ok(self.store.list_status()?)
    }

    /// Receive stock: merge into the part's inbound entry or open a new one.
    pub fn upsert_inbound(&mut self, cmd: ReceiveStock) -> WarehouseResult<UpsertOutcome> {
        let outcome = match self.store.find_inbound(&cmd.part_id)? {
            Some(mut entry) => {
                entry.merge(&cmd)?;
                self.transact(|store| {
                    store.update_inbound(entry)?;
                    rebuild_status(store)?;
                    Ok(())
                })?;
                UpsertOutcome::Merged
            }
            None => {
                let entry = InboundRecord::open(&cmd)?;
                self.transact(|store| {
                    store.append_inbound(entry)?;
                    rebuild_status(store)?;
                    Ok(())
                })?;
                UpsertOutcome::Created
            }
        };

        tracing::info!(
            part_id = %cmd.part_id,
            quantity = cmd.quantity.get(),
            ?outcome,
            "inbound recorded"
        );
        Ok(outcome)
    }

    /// Issue stock: rejected without any write when the part was never
    /// received or when the request exceeds what is on hand.
    pub fn record_outbound(&mut self, cmd: IssueStock) -> WarehouseResult<MovementRecord> {
        let Some(entry) = self.store.find_inbound(&cmd.part_id)? else {
            tracing::warn!(part_id = %cmd.part_id, "outbound rejected: part never received");
            return Err(DomainError::unknown_part(cmd.part_id.clone()).into());
        };

        let (record, remaining) = entry.issue(&cmd).inspect_err(|e| {
            tracing::warn!(part_id = %cmd.part_id, error = %e, "outbound rejected");
        })?;

        let appended = record.clone();
        self.transact(|store| {
            store.append_outbound(appended)?;
            store.set_on_hand(&cmd.part_id, remaining)?;
            rebuild_status(store)?;
            Ok(())
        })?;

        tracing::info!(
            part_id = %cmd.part_id,
            quantity = record.quantity,
            remaining,
            "outbound recorded"
        );
        Ok(record)
    }

    /// Rebuild and store the status table from the full ledger.
    pub fn reconcile(&mut self) -> WarehouseResult<Vec<InventoryStatusRow>> {
        let rows = self.transact(rebuild_status::<S>)?;
        tracing::info!(parts = rows.len(), "inventory reconciled");
        Ok(rows)
    }

    /// Hand-set a part's thresholds; the only manual edit the status table
    /// accepts. The row is reclassified against the new bounds and the values
    /// are carried over by later reconciliations.
    pub fn set_thresholds(
        &mut self,
        part_id: &PartId,
        thresholds: Thresholds,
    ) -> WarehouseResult<InventoryStatusRow> {
        let mut rows = self.store.list_status()?;
        let Some(row) = rows.iter_mut().find(|r| &r.part_id == part_id) else {
            return Err(DomainError::unknown_part(part_id.clone()).into());
        };
        row.minimum = thresholds.minimum;
        row.maximum = thresholds.maximum;
        row.reclassify();
        let updated = row.clone();

        self.transact(|store| store.replace_all(rows))?;

        tracing::info!(
            part_id = %part_id,
            minimum = thresholds.minimum,
            maximum = thresholds.maximum,
            "thresholds updated"
        );
        Ok(updated)
    }

    /// Refine thresholds and status from outbound history dated within
    /// `window_days` before `as_of`.
    pub fn forecast(
        &mut self,
        window_days: u32,
        as_of: NaiveDate,
    ) -> WarehouseResult<Vec<InventoryStatusRow>> {
        let forecaster = self.forecaster.clone();
        let rows = self.transact(|store| {
            let rows = forecaster.forecast(
                store.list_status()?,
                &store.list_outbound()?,
                window_days,
                as_of,
            );
            store.replace_all(rows.clone())?;
            Ok(rows)
        })?;

        tracing::info!(window_days, %as_of, parts = rows.len(), "forecast completed");
        Ok(rows)
    }

    /// [`Warehouse::forecast`] over the configured window, as of today (UTC).
    pub fn forecast_today(&mut self) -> WarehouseResult<Vec<InventoryStatusRow>> {
        self.forecast(self.forecast_window_days, Utc::now().date_naive())
    }

    pub fn generate_report(&self) -> WarehouseResult<Report> {
        let report = generate_report(&self.store.list_status()?);
        tracing::info!(
            total_items = report.total_items,
            restock = report.restock.len(),
            "inventory report generated"
        );
        Ok(report)
    }

    /// Run staged writes and commit them; on any failure roll back so the
    /// store is left as of the previous commit.
    fn transact<T>(
        &mut self,
        work: impl FnOnce(&S) -> Result<T, StoreError>,
    ) -> WarehouseResult<T> {
        let result = work(&self.store).and_then(|value| {
            self.store.commit()?;
            Ok(value)
        });

        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!(error = %err, "store operation failed; rolling back");
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err.into())
            }
        }
    }
}

fn rebuild_status<S: RecordStore>(store: &S) -> Result<Vec<InventoryStatusRow>, StoreError> {
    let inbound: Vec<MovementRecord> = store
        .list_inbound()?
        .into_iter()
        .map(|entry| entry.movement)
        .collect();
    let outbound = store.list_outbound()?;
    let existing = store.thresholds()?;

    let rows = reconcile(&inbound, &outbound, &existing);
    store.replace_all(rows.clone())?;
    Ok(rows)
}
