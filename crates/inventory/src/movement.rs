use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use toolcrib_core::{DomainError, DomainResult, Entity, MovementId, PartId, Quantity};

/// Storage format for movement dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Inbound,
    Outbound,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::Inbound => "inbound",
            MovementKind::Outbound => "outbound",
        }
    }
}

/// Date of a movement as it sits in the record store.
///
/// Kept as raw text: historical rows may carry malformed or missing dates, and
/// those must survive a load/save cycle untouched. Use [`RecordDate::parse`]
/// when a calendar date is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordDate(String);

impl RecordDate {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar date of the movement, if the stored text is a `YYYY-MM-DD`
    /// date or an RFC 3339 timestamp.
    pub fn parse(&self) -> Option<NaiveDate> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

/// Descriptive fields captured with every movement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementDetails {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub warehouse: String,
    pub location: String,
    pub custodian: String,
    pub comments: String,
}

impl MovementDetails {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: "unit".to_string(),
            warehouse: "main".to_string(),
            location: "general".to_string(),
            custodian: "warehouse".to_string(),
            ..Self::default()
        }
    }

    /// Description and comments are optional; everything else is required.
    pub fn validate(&self) -> DomainResult<()> {
        let required = [
            ("name", &self.name),
            ("unit", &self.unit),
            ("warehouse", &self.warehouse),
            ("location", &self.location),
            ("custodian", &self.custodian),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
        }
        Ok(())
    }

    fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            unit: self.unit.trim().to_string(),
            warehouse: self.warehouse.trim().to_string(),
            location: self.location.trim().to_string(),
            custodian: self.custodian.trim().to_string(),
            comments: self.comments.trim().to_string(),
        }
    }
}

/// A single inbound or outbound movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub id: MovementId,
    pub kind: MovementKind,
    pub date: RecordDate,
    pub part_id: PartId,
    pub quantity: u64,
    pub details: MovementDetails,
}

impl Entity for MovementRecord {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Inbound ledger entry for a part.
///
/// There is one entry per part: repeated receipts merge into it. `movement`
/// holds the cumulative quantity received; `on_hand` is the live stock
/// counter that outbound movements draw down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundRecord {
    pub movement: MovementRecord,
    pub on_hand: u64,
}

impl Entity for InboundRecord {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.movement.part_id
    }
}

/// Whether a receipt created a new inbound entry or merged into one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Merged,
}

/// Command: ReceiveStock (inbound).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub part_id: PartId,
    pub quantity: Quantity,
    pub details: MovementDetails,
    pub occurred_on: NaiveDate,
}

/// Command: IssueStock (outbound).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStock {
    pub part_id: PartId,
    pub quantity: Quantity,
    pub details: MovementDetails,
    pub occurred_on: NaiveDate,
}

impl InboundRecord {
    /// Open a new inbound entry from a first receipt.
    pub fn open(cmd: &ReceiveStock) -> DomainResult<Self> {
        cmd.details.validate()?;
        let quantity = cmd.quantity.get();
        Ok(Self {
            movement: MovementRecord {
                id: MovementId::new(),
                kind: MovementKind::Inbound,
                date: RecordDate::from_date(cmd.occurred_on),
                part_id: cmd.part_id.clone(),
                quantity,
                details: cmd.details.trimmed(),
            },
            on_hand: quantity,
        })
    }

    pub fn part_id(&self) -> &PartId {
        &self.movement.part_id
    }

    pub fn received(&self) -> u64 {
        self.movement.quantity
    }

    /// Merge a repeated receipt: quantities add up, descriptive fields and
    /// date are overwritten by the latest submission.
    pub fn merge(&mut self, cmd: &ReceiveStock) -> DomainResult<()> {
        if cmd.part_id != self.movement.part_id {
            return Err(DomainError::invariant("part_id mismatch"));
        }
        cmd.details.validate()?;

        let quantity = cmd.quantity.get();
        let received = self
            .movement
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("received quantity overflows"))?;
        let on_hand = self
            .on_hand
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflows"))?;

        self.movement.quantity = received;
        self.on_hand = on_hand;
        self.movement.date = RecordDate::from_date(cmd.occurred_on);
        self.movement.details = cmd.details.trimmed();
        Ok(())
    }

    /// Decide an outbound movement against this entry.
    ///
    /// Returns the outbound record to append and the stock left afterwards.
    /// Nothing is mutated; the caller applies the new counter once the
    /// record is accepted.
    pub fn issue(&self, cmd: &IssueStock) -> DomainResult<(MovementRecord, u64)> {
        if cmd.part_id != self.movement.part_id {
            return Err(DomainError::invariant("part_id mismatch"));
        }
        cmd.details.validate()?;

        let requested = cmd.quantity.get();
        if requested > self.on_hand {
            return Err(DomainError::insufficient_stock(
                cmd.part_id.clone(),
                self.on_hand,
                requested,
            ));
        }

        let record = MovementRecord {
            id: MovementId::new(),
            kind: MovementKind::Outbound,
            date: RecordDate::from_date(cmd.occurred_on),
            part_id: cmd.part_id.clone(),
            quantity: requested,
            details: cmd.details.trimmed(),
        };
        Ok((record, self.on_hand - requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn receive(part: &str, qty: u64, name: &str, on: NaiveDate) -> ReceiveStock {
        ReceiveStock {
            part_id: part.parse().unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            details: MovementDetails::named(name),
            occurred_on: on,
        }
    }

    fn issue(part: &str, qty: u64) -> IssueStock {
        IssueStock {
            part_id: part.parse().unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            details: MovementDetails::named("Torque wrench"),
            occurred_on: day(5),
        }
    }

    #[test]
    fn record_date_parses_plain_dates_and_timestamps() {
        assert_eq!(RecordDate::from_raw("2024-03-05").parse(), Some(day(5)));
        assert_eq!(
            RecordDate::from_raw("2024-03-05T10:30:00+00:00").parse(),
            Some(day(5))
        );
        assert_eq!(RecordDate::from_raw("05/03/2024").parse(), None);
        assert_eq!(RecordDate::from_raw("").parse(), None);
    }

    #[test]
    fn missing_required_detail_is_a_validation_error() {
        let mut cmd = receive("P1", 5, "Drill", day(1));
        cmd.details.custodian = "  ".to_string();
        let err = InboundRecord::open(&cmd).unwrap_err();
        assert_eq!(err, DomainError::validation("custodian is required"));
    }

    #[test]
    fn merge_adds_quantity_and_overwrites_details() {
        let mut rec = InboundRecord::open(&receive("P1", 5, "Drill", day(1))).unwrap();
        rec.merge(&receive(" p1 ", 7, "Cordless drill", day(3))).unwrap();

        assert_eq!(rec.received(), 12);
        assert_eq!(rec.on_hand, 12);
        assert_eq!(rec.movement.details.name, "Cordless drill");
        assert_eq!(rec.movement.date.as_str(), "2024-03-03");
    }

    #[test]
    fn merge_rejects_other_part() {
        let mut rec = InboundRecord::open(&receive("P1", 5, "Drill", day(1))).unwrap();
        let err = rec.merge(&receive("P2", 1, "Saw", day(2))).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn issue_within_stock_returns_record_and_remaining() {
        let rec = InboundRecord::open(&receive("P1", 10, "Wrench", day(1))).unwrap();
        let (out, left) = rec.issue(&issue("P1", 4)).unwrap();
        assert_eq!(out.kind, MovementKind::Outbound);
        assert_eq!(out.quantity, 4);
        assert_eq!(left, 6);
        // Deciding does not mutate.
        assert_eq!(rec.on_hand, 10);
    }

    #[test]
    fn issue_beyond_stock_carries_available_and_requested() {
        let rec = InboundRecord::open(&receive("P1", 3, "Wrench", day(1))).unwrap();
        let err = rec.issue(&issue("P1", 4)).unwrap_err();
        match err {
            DomainError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 4);
            }
            other => panic!("expected insufficient stock, got {other:?}"),
        }
    }
}
