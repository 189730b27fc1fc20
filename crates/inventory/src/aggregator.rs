use std::collections::HashMap;

use toolcrib_core::PartId;

use crate::movement::MovementRecord;

/// Raw stock position of one part after folding the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub name: String,
    /// Inbound minus outbound. Not clamped: a negative value means the
    /// history itself is inconsistent.
    pub net_stock: i64,
}

/// Per-part stock mapping, iterable in first-seen inbound order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedStock {
    order: Vec<PartId>,
    levels: HashMap<PartId, StockLevel>,
    skipped: Vec<PartId>,
}

impl AggregatedStock {
    pub fn get(&self, part_id: &PartId) -> Option<&StockLevel> {
        self.levels.get(part_id)
    }

    pub fn net_stock(&self, part_id: &PartId) -> Option<i64> {
        self.levels.get(part_id).map(|l| l.net_stock)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PartId, &StockLevel)> {
        self.order
            .iter()
            .filter_map(|id| self.levels.get(id).map(|level| (id, level)))
    }

    /// Outbound part ids that had no inbound history (one entry per skipped
    /// record).
    pub fn skipped_outbound(&self) -> &[PartId] {
        &self.skipped
    }
}

/// Fold inbound and outbound history into per-part stock.
///
/// Inbound quantities accumulate and the latest non-empty name wins.
/// Outbound quantities are subtracted; outbound records for parts never
/// received are logged and skipped rather than failing the pass.
pub fn aggregate_stock(inbound: &[MovementRecord], outbound: &[MovementRecord]) -> AggregatedStock {
    let mut agg = AggregatedStock::default();

    for rec in inbound {
        if !agg.levels.contains_key(&rec.part_id) {
            agg.order.push(rec.part_id.clone());
        }
        let level = agg.levels.entry(rec.part_id.clone()).or_insert_with(|| StockLevel {
            name: String::new(),
            net_stock: 0,
        });
        level.net_stock = level.net_stock.saturating_add(to_signed(rec.quantity));
        if !rec.details.name.trim().is_empty() {
            level.name = rec.details.name.clone();
        }
    }

    for rec in outbound {
        match agg.levels.get_mut(&rec.part_id) {
            Some(level) => {
                level.net_stock = level.net_stock.saturating_sub(to_signed(rec.quantity));
            }
            None => {
                tracing::warn!(
                    part_id = %rec.part_id,
                    movement_id = %rec.id,
                    "outbound movement references a part with no inbound history; skipping"
                );
                agg.skipped.push(rec.part_id.clone());
            }
        }
    }

    agg
}

fn to_signed(quantity: u64) -> i64 {
    i64::try_from(quantity).unwrap_or(i64::MAX)
}
