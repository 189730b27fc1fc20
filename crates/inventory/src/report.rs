use serde::{Deserialize, Serialize};

use toolcrib_core::PartId;

use crate::reconcile::InventoryStatusRow;
use crate::status::StockStatus;

/// A part that should be reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockSuggestion {
    pub part_id: PartId,
    pub name: String,
    pub current_stock: u64,
    pub minimum: u64,
    /// Enough to end one unit above the minimum.
    pub suggested_quantity: u64,
}

/// Summary of the status table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub total_items: usize,
    /// Depleted and urgent parts, counted together.
    pub critical: usize,
    pub alerts: usize,
    pub warnings: usize,
    pub restock: Vec<RestockSuggestion>,
}

impl Report {
    /// Plain-text rendering for dialogs and logs.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl core::fmt::Display for Report {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "--- Inventory report ---")?;
        writeln!(f, "Total items: {}", self.total_items)?;
        writeln!(f, "Depleted/urgent items: {}", self.critical)?;
        writeln!(f, "Items in alert: {}", self.alerts)?;
        writeln!(f, "Items in warning: {}", self.warnings)?;
        writeln!(f)?;
        writeln!(f, "Restock suggestions:")?;
        if self.restock.is_empty() {
            writeln!(f, "No restock suggestions at this time.")?;
        }
        for s in &self.restock {
            writeln!(
                f,
                "- Part: {}, Name: {}, Current: {}, Minimum: {}, Suggested: {}",
                s.part_id, s.name, s.current_stock, s.minimum, s.suggested_quantity
            )?;
        }
        Ok(())
    }
}

/// Count rows per status bucket and list every part below its minimum.
pub fn generate_report(rows: &[InventoryStatusRow]) -> Report {
    let mut report = Report {
        total_items: rows.len(),
        ..Report::default()
    };

    for row in rows {
        match row.status {
            StockStatus::Depleted | StockStatus::Urgent { .. } => report.critical += 1,
            StockStatus::Alert { .. } => report.alerts += 1,
            StockStatus::Warning => report.warnings += 1,
            StockStatus::Full | StockStatus::Normal | StockStatus::Sufficient { .. } => {}
        }

        if row.current_stock < row.minimum {
            report.restock.push(RestockSuggestion {
                part_id: row.part_id.clone(),
                name: row.name.clone(),
                current_stock: row.current_stock,
                minimum: row.minimum,
                suggested_quantity: (row.minimum - row.current_stock + 1).max(1),
            });
        }
    }

    report
}
