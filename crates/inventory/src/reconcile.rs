use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use toolcrib_core::{Entity, PartId};

use crate::aggregator::aggregate_stock;
use crate::movement::MovementRecord;
use crate::status::{StockStatus, classify};

/// Default minimum as a share of current stock.
const DEFAULT_MIN_RATIO: f64 = 0.3;
/// Default maximum as a multiple of current stock.
const DEFAULT_MAX_FACTOR: f64 = 2.0;

/// Configured stock bounds for a part. Zero means "not configured".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub minimum: u64,
    pub maximum: u64,
}

impl Thresholds {
    pub fn new(minimum: u64, maximum: u64) -> Self {
        Self { minimum, maximum }
    }

    /// Thresholds currently stored in a status table, keyed by part.
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = &'a InventoryStatusRow>,
    ) -> HashMap<PartId, Thresholds> {
        rows.into_iter()
            .map(|row| (row.part_id.clone(), row.thresholds()))
            .collect()
    }
}

/// One row of the derived inventory status table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStatusRow {
    pub part_id: PartId,
    pub name: String,
    pub current_stock: u64,
    pub minimum: u64,
    pub maximum: u64,
    pub status: StockStatus,
}

impl InventoryStatusRow {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.minimum, self.maximum)
    }

    /// Re-run the classifier against the row's own stock and thresholds.
    pub fn reclassify(&mut self) {
        self.status = classify(self.current_stock, self.minimum, self.maximum);
    }
}

impl Entity for InventoryStatusRow {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.part_id
    }
}

/// Thresholds for a part that has none configured.
///
/// With stock on hand: minimum is 30% of stock (at least 1), maximum is twice
/// the stock (at least minimum + 1). Without stock both stay at zero.
pub fn default_thresholds(stock: u64) -> Thresholds {
    if stock == 0 {
        return Thresholds::default();
    }
    let minimum = default_minimum(stock);
    Thresholds::new(minimum, default_maximum(stock, minimum))
}

fn default_minimum(stock: u64) -> u64 {
    ((stock as f64 * DEFAULT_MIN_RATIO).round() as u64).max(1)
}

fn default_maximum(stock: u64, minimum: u64) -> u64 {
    ((stock as f64 * DEFAULT_MAX_FACTOR).round() as u64).max(minimum.saturating_add(1))
}

/// Rebuild the whole status table from movement history.
///
/// Existing non-zero thresholds are carried over per field; missing ones are
/// derived from the clamped stock. Rows come out in first-seen inbound order,
/// one per received part. The result is meant to replace the stored table
/// wholesale.
pub fn reconcile(
    inbound: &[MovementRecord],
    outbound: &[MovementRecord],
    existing: &HashMap<PartId, Thresholds>,
) -> Vec<InventoryStatusRow> {
    let stock = aggregate_stock(inbound, outbound);

    stock
        .iter()
        .map(|(part_id, level)| {
            let current = u64::try_from(level.net_stock).unwrap_or(0);
            let configured = existing.get(part_id).copied().unwrap_or_default();

            let minimum = match configured.minimum {
                0 if current > 0 => default_minimum(current),
                m => m,
            };
            let maximum = match configured.maximum {
                0 if current > 0 => default_maximum(current, minimum),
                m => m,
            };

            tracing::debug!(
                part_id = %part_id,
                net_stock = level.net_stock,
                minimum,
                maximum,
                "resolved thresholds"
            );

            InventoryStatusRow {
                part_id: part_id.clone(),
                name: level.name.clone(),
                current_stock: current,
                minimum,
                maximum,
                status: classify(current, minimum, maximum),
            }
        })
        .collect()
}
