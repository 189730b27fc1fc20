use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use toolcrib_core::PartId;
use toolcrib_inventory::{InboundRecord, InventoryStatusRow, MovementRecord};

use super::{Durable, InboundLedger, OutboundLedger, StatusTable, StoreError, StoreResult};

/// Full contents of a record store at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub inbound: Vec<InboundRecord>,
    pub outbound: Vec<MovementRecord>,
    pub status: Vec<InventoryStatusRow>,
}

/// In-memory record store for tests/dev.
///
/// Keeps a staged snapshot that trait writes go to and a committed snapshot
/// that `commit` copies into and `rollback` restores from.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    staged: RwLock<LedgerSnapshot>,
    committed: RwLock<LedgerSnapshot>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from already-durable contents.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            staged: RwLock::new(snapshot.clone()),
            committed: RwLock::new(snapshot),
        }
    }

    /// Current staged contents.
    pub fn snapshot(&self) -> StoreResult<LedgerSnapshot> {
        Ok(self.read()?.clone())
    }

    /// Contents as of the last commit.
    pub fn committed(&self) -> StoreResult<LedgerSnapshot> {
        Ok(self.committed.read().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, LedgerSnapshot>> {
        self.staged.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, LedgerSnapshot>> {
        self.staged.write().map_err(|_| StoreError::Poisoned)
    }
}

fn position(snapshot: &LedgerSnapshot, part_id: &PartId) -> Option<usize> {
    snapshot
        .inbound
        .iter()
        .position(|r| &r.movement.part_id == part_id)
}

impl InboundLedger for InMemoryRecordStore {
    fn append_inbound(&self, record: InboundRecord) -> StoreResult<()> {
        let mut snap = self.write()?;
        if position(&snap, &record.movement.part_id).is_some() {
            return Err(StoreError::Duplicate(format!(
                "inbound entry for part {}",
                record.movement.part_id
            )));
        }
        snap.inbound.push(record);
        Ok(())
    }

    fn find_inbound(&self, part_id: &PartId) -> StoreResult<Option<InboundRecord>> {
        let snap = self.read()?;
        Ok(position(&snap, part_id).map(|i| snap.inbound[i].clone()))
    }

    fn set_on_hand(&self, part_id: &PartId, on_hand: u64) -> StoreResult<()> {
        let mut snap = self.write()?;
        let i = position(&snap, part_id)
            .ok_or_else(|| StoreError::NotFound(format!("inbound entry for part {part_id}")))?;
        snap.inbound[i].on_hand = on_hand;
        Ok(())
    }

    fn update_inbound(&self, record: InboundRecord) -> StoreResult<()> {
        let mut snap = self.write()?;
        let i = position(&snap, &record.movement.part_id).ok_or_else(|| {
            StoreError::NotFound(format!("inbound entry for part {}", record.movement.part_id))
        })?;
        snap.inbound[i] = record;
        Ok(())
    }

    fn list_inbound(&self) -> StoreResult<Vec<InboundRecord>> {
        Ok(self.read()?.inbound.clone())
    }
}

impl OutboundLedger for InMemoryRecordStore {
    fn append_outbound(&self, record: MovementRecord) -> StoreResult<()> {
        self.write()?.outbound.push(record);
        Ok(())
    }

    fn list_outbound(&self) -> StoreResult<Vec<MovementRecord>> {
        Ok(self.read()?.outbound.clone())
    }
}

impl StatusTable for InMemoryRecordStore {
    fn replace_all(&self, rows: Vec<InventoryStatusRow>) -> StoreResult<()> {
        self.write()?.status = rows;
        Ok(())
    }

    fn list_status(&self) -> StoreResult<Vec<InventoryStatusRow>> {
        Ok(self.read()?.status.clone())
    }
}

impl Durable for InMemoryRecordStore {
    fn commit(&self) -> StoreResult<()> {
        let staged = self.snapshot()?;
        *self.committed.write().map_err(|_| StoreError::Poisoned)? = staged;
        Ok(())
    }

    fn rollback(&self) -> StoreResult<()> {
        let committed = self.committed()?;
        *self.write()? = committed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use toolcrib_core::Quantity;
    use toolcrib_inventory::{MovementDetails, ReceiveStock};

    fn entry(part: &str, qty: u64) -> InboundRecord {
        InboundRecord::open(&ReceiveStock {
            part_id: part.parse().unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            details: MovementDetails::named("Multimeter"),
            occurred_on: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn duplicate_inbound_part_is_rejected() {
        let store = InMemoryRecordStore::new();
        store.append_inbound(entry("P1", 1)).unwrap();
        let err = store.append_inbound(entry(" p1", 2)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn set_on_hand_for_missing_part_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store.set_on_hand(&"P1".parse().unwrap(), 3).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn rollback_restores_last_commit() {
        let store = InMemoryRecordStore::new();
        store.append_inbound(entry("P1", 4)).unwrap();
        store.commit().unwrap();

        store.set_on_hand(&"P1".parse().unwrap(), 1).unwrap();
        store.append_inbound(entry("P2", 9)).unwrap();
        store.rollback().unwrap();

        let inbound = store.list_inbound().unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].on_hand, 4);
    }

    #[test]
    fn staged_writes_are_invisible_to_committed_view() {
        let store = InMemoryRecordStore::new();
        store.append_inbound(entry("P1", 4)).unwrap();
        assert!(store.committed().unwrap().inbound.is_empty());
        store.commit().unwrap();
        assert_eq!(store.committed().unwrap().inbound.len(), 1);
    }
}
