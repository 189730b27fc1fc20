use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use toolcrib_core::PartId;

use crate::movement::MovementRecord;
use crate::reconcile::InventoryStatusRow;
use crate::status::StockStatus;

/// Coefficients of the demand forecast.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPolicy {
    /// Days of consumption the suggested minimum should cover.
    pub min_cover_days: f64,
    /// Days of consumption the suggested maximum should cover.
    pub max_cover_days: f64,
    /// Fewer remaining days than this is urgent.
    pub urgent_days: f64,
    /// Fewer remaining days than this (but not urgent) is an alert.
    pub alert_days: f64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            min_cover_days: 15.0,
            max_cover_days: 30.0,
            urgent_days: 7.0,
            alert_days: 15.0,
        }
    }
}

/// Total outbound quantity per part dated within the `window_days` calendar
/// days ending on `as_of`, i.e. after `as_of - window_days` up to and
/// including `as_of`.
///
/// Records without a parseable date are left out of the window. A window
/// reaching past the earliest representable date covers all history.
pub fn consumption_in_window(
    outbound: &[MovementRecord],
    window_days: u32,
    as_of: NaiveDate,
) -> HashMap<PartId, u64> {
    let start = Duration::try_days(i64::from(window_days))
        .and_then(|span| as_of.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN);
    let mut totals: HashMap<PartId, u64> = HashMap::new();

    for rec in outbound {
        let Some(date) = rec.date.parse() else {
            tracing::warn!(
                part_id = %rec.part_id,
                movement_id = %rec.id,
                date = rec.date.as_str(),
                "outbound movement has no usable date; excluded from forecast window"
            );
            continue;
        };
        if date <= start || date > as_of {
            continue;
        }
        let total = totals.entry(rec.part_id.clone()).or_insert(0);
        *total = total.saturating_add(rec.quantity);
    }

    totals
}

/// Refines thresholds and status from recent consumption.
#[derive(Debug, Clone, Default)]
pub struct DemandForecaster {
    policy: ForecastPolicy,
}

impl DemandForecaster {
    pub fn new(policy: ForecastPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Project remaining days of stock for every row.
    ///
    /// Parts consumed within the window get a daily rate, suggested
    /// thresholds (applied only when they raise the current value, or when
    /// the current value is unset) and a days-of-cover status. All other
    /// parts keep their thresholds and are reclassified.
    pub fn forecast(
        &self,
        rows: Vec<InventoryStatusRow>,
        outbound: &[MovementRecord],
        window_days: u32,
        as_of: NaiveDate,
    ) -> Vec<InventoryStatusRow> {
        let consumption = consumption_in_window(outbound, window_days, as_of);

        rows.into_iter()
            .map(|mut row| {
                let total = consumption.get(&row.part_id).copied().unwrap_or(0);
                if total > 0 && window_days > 0 {
                    self.apply_rate(&mut row, total as f64 / f64::from(window_days));
                } else {
                    row.reclassify();
                }
                row
            })
            .collect()
    }

    fn apply_rate(&self, row: &mut InventoryStatusRow, daily_rate: f64) {
        let remaining_days = row.current_stock as f64 / daily_rate;

        let suggested_min = ((daily_rate * self.policy.min_cover_days).round() as u64).max(1);
        let suggested_max = (daily_rate * self.policy.max_cover_days).round() as u64;

        if row.minimum == 0 || suggested_min > row.minimum {
            row.minimum = suggested_min;
        }
        if row.maximum == 0 || suggested_max > row.maximum {
            row.maximum = suggested_max;
        }

        row.status = if remaining_days < self.policy.urgent_days {
            StockStatus::Urgent { remaining_days }
        } else if remaining_days < self.policy.alert_days {
            StockStatus::Alert {
                remaining_days: Some(remaining_days),
            }
        } else {
            StockStatus::Sufficient { remaining_days }
        };

        tracing::debug!(
            part_id = %row.part_id,
            daily_rate,
            remaining_days,
            minimum = row.minimum,
            maximum = row.maximum,
            "forecast applied"
        );
    }
}

/// [`DemandForecaster::forecast`] with the default policy.
pub fn forecast(
    rows: Vec<InventoryStatusRow>,
    outbound: &[MovementRecord],
    window_days: u32,
    as_of: NaiveDate,
) -> Vec<InventoryStatusRow> {
    DemandForecaster::default().forecast(rows, outbound, window_days, as_of)
}
