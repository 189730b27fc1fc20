use serde::{Deserialize, Serialize};

/// Fraction above the minimum that still counts as an alert.
const ALERT_MARGIN: f64 = 1.2;
/// Fraction above the minimum that counts as a warning.
const WARNING_MARGIN: f64 = 1.5;
/// Fraction of the maximum from which stock counts as full.
const FULL_RATIO: f64 = 0.9;

/// Health classification of a part's stock.
///
/// Forecast-driven variants carry the projected days of cover; formatting is
/// left to [`StockStatus::message`] and `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Depleted,
    Urgent { remaining_days: f64 },
    Alert { remaining_days: Option<f64> },
    Warning,
    Full,
    Normal,
    Sufficient { remaining_days: f64 },
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Depleted => "DEPLETED",
            StockStatus::Urgent { .. } => "URGENT",
            StockStatus::Alert { .. } => "ALERT",
            StockStatus::Warning => "WARNING",
            StockStatus::Full => "FULL",
            StockStatus::Normal => "NORMAL",
            StockStatus::Sufficient { .. } => "SUFFICIENT",
        }
    }

    /// Human-readable explanation, without the label.
    pub fn message(&self) -> String {
        match self {
            StockStatus::Depleted => "no stock available".to_string(),
            StockStatus::Urgent { remaining_days } => {
                format!("only {} days of stock", whole_days(*remaining_days))
            }
            StockStatus::Alert { remaining_days: None } => "below minimum threshold".to_string(),
            StockStatus::Alert {
                remaining_days: Some(days),
            } => format!("{} days of stock", whole_days(*days)),
            StockStatus::Warning => "approaching minimum".to_string(),
            StockStatus::Full => "at or near maximum capacity".to_string(),
            StockStatus::Normal => "within normal range".to_string(),
            StockStatus::Sufficient { remaining_days } => {
                format!("{} days of stock", whole_days(*remaining_days))
            }
        }
    }

    /// Depleted and urgent parts need action now.
    pub fn is_critical(&self) -> bool {
        matches!(self, StockStatus::Depleted | StockStatus::Urgent { .. })
    }

    pub fn remaining_days(&self) -> Option<f64> {
        match self {
            StockStatus::Urgent { remaining_days } | StockStatus::Sufficient { remaining_days } => {
                Some(*remaining_days)
            }
            StockStatus::Alert { remaining_days } => *remaining_days,
            _ => None,
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {}", self.label(), self.message())
    }
}

fn whole_days(days: f64) -> u64 {
    if days.is_finite() && days > 0.0 {
        days.trunc() as u64
    } else {
        0
    }
}

/// Classify stock against its thresholds. First match wins:
///
/// 1. nothing on hand → `Depleted`
/// 2. `current <= minimum * 1.2` → `Alert`
/// 3. `current <= minimum * 1.5` → `Warning`
/// 4. `maximum > 0 && current >= maximum * 0.9` → `Full`
/// 5. otherwise `Normal`
pub fn classify(current: u64, minimum: u64, maximum: u64) -> StockStatus {
    let cur = current as f64;
    let min = minimum as f64;
    let max = maximum as f64;

    if current == 0 {
        StockStatus::Depleted
    } else if cur <= min * ALERT_MARGIN {
        StockStatus::Alert {
            remaining_days: None,
        }
    } else if cur <= min * WARNING_MARGIN {
        StockStatus::Warning
    } else if maximum > 0 && cur >= max * FULL_RATIO {
        StockStatus::Full
    } else {
        StockStatus::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALERT: StockStatus = StockStatus::Alert {
        remaining_days: None,
    };

    #[test]
    fn zero_stock_is_depleted_regardless_of_thresholds() {
        assert_eq!(classify(0, 0, 0), StockStatus::Depleted);
        assert_eq!(classify(0, 10, 100), StockStatus::Depleted);
    }

    #[test]
    fn alert_and_warning_boundaries_are_inclusive() {
        assert_eq!(classify(10, 10, 100), ALERT);
        assert_eq!(classify(12, 10, 100), ALERT);
        assert_eq!(classify(13, 10, 100), StockStatus::Warning);
        assert_eq!(classify(15, 10, 100), StockStatus::Warning);
        assert_eq!(classify(16, 10, 100), StockStatus::Normal);
    }

    #[test]
    fn full_requires_a_maximum() {
        assert_eq!(classify(90, 10, 100), StockStatus::Full);
        assert_eq!(classify(89, 10, 100), StockStatus::Normal);
        assert_eq!(classify(500, 10, 0), StockStatus::Normal);
    }

    #[test]
    fn earlier_rule_wins_over_full() {
        // min 100 makes 95 an alert even though it is also >= 0.9 * max.
        assert_eq!(classify(95, 100, 100), ALERT);
    }

    #[test]
    fn display_joins_label_and_message() {
        assert_eq!(
            StockStatus::Urgent { remaining_days: 5.0 }.to_string(),
            "URGENT - only 5 days of stock"
        );
        assert_eq!(ALERT.to_string(), "ALERT - below minimum threshold");
        assert_eq!(
            StockStatus::Alert {
                remaining_days: Some(9.75)
            }
            .message(),
            "9 days of stock"
        );
    }

    #[test]
    fn serializes_as_tagged_enum() {
        let json = serde_json::to_value(StockStatus::Urgent { remaining_days: 2.5 }).unwrap();
        assert_eq!(json["status"], "URGENT");
        assert_eq!(json["remaining_days"], 2.5);

        let back: StockStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back, StockStatus::Urgent { remaining_days: 2.5 });

        let normal: StockStatus = serde_json::from_str(r#"{"status":"NORMAL"}"#).unwrap();
        assert_eq!(normal, StockStatus::Normal);
    }
}
