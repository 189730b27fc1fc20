//! SQLite-backed record store.
//!
//! The whole ledger is loaded into a staged in-memory snapshot on open.
//! `commit` rewrites the three tables from that snapshot inside a single
//! transaction, so the file either holds the previous commit or the new one.
//! The public API is synchronous; an owned current-thread runtime drives sqlx.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use tokio::runtime::Runtime;

use toolcrib_core::{MovementId, PartId};
use toolcrib_inventory::{
    InboundRecord, InventoryStatusRow, MovementDetails, MovementKind, MovementRecord, RecordDate,
    StockStatus,
};

use super::in_memory::{InMemoryRecordStore, LedgerSnapshot};
use super::{Durable, InboundLedger, OutboundLedger, StatusTable, StoreError, StoreResult};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS inbound_movements (
        position     INTEGER PRIMARY KEY,
        movement_id  TEXT NOT NULL,
        part_id      TEXT NOT NULL UNIQUE,
        recorded_on  TEXT NOT NULL,
        name         TEXT NOT NULL,
        description  TEXT NOT NULL,
        unit         TEXT NOT NULL,
        warehouse    TEXT NOT NULL,
        location     TEXT NOT NULL,
        custodian    TEXT NOT NULL,
        comments     TEXT NOT NULL,
        quantity     INTEGER NOT NULL,
        on_hand      INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS outbound_movements (
        position     INTEGER PRIMARY KEY,
        movement_id  TEXT NOT NULL,
        part_id      TEXT NOT NULL,
        recorded_on  TEXT NOT NULL,
        name         TEXT NOT NULL,
        description  TEXT NOT NULL,
        unit         TEXT NOT NULL,
        warehouse    TEXT NOT NULL,
        location     TEXT NOT NULL,
        custodian    TEXT NOT NULL,
        comments     TEXT NOT NULL,
        quantity     INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_status (
        position       INTEGER PRIMARY KEY,
        part_id        TEXT NOT NULL UNIQUE,
        name           TEXT NOT NULL,
        current_stock  INTEGER NOT NULL,
        minimum        INTEGER NOT NULL,
        maximum        INTEGER NOT NULL,
        status         TEXT NOT NULL
    )
    "#,
];

const MOVEMENT_COLUMNS: &str = "movement_id, part_id, recorded_on, name, description, unit, \
                                warehouse, location, custodian, comments, quantity";

/// Durable record store on a SQLite database.
#[derive(Debug)]
pub struct SqliteRecordStore {
    runtime: Runtime,
    pool: SqlitePool,
    staged: InMemoryRecordStore,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `database_url` and load its contents.
    ///
    /// `sqlite::memory:` works for tests; the pool is pinned to one
    /// connection so the in-memory database lives as long as the store.
    pub fn open(database_url: &str) -> StoreResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Runtime(e.to_string()))?;

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options),
        )?;

        let snapshot = runtime.block_on(async {
            for ddl in SCHEMA {
                sqlx::query(ddl).execute(&pool).await?;
            }
            load_snapshot(&pool).await
        })?;

        tracing::info!(
            database_url,
            inbound = snapshot.inbound.len(),
            outbound = snapshot.outbound.len(),
            status_rows = snapshot.status.len(),
            "record store opened"
        );

        Ok(Self {
            runtime,
            pool,
            staged: InMemoryRecordStore::from_snapshot(snapshot),
        })
    }

    /// Re-read the database, discarding staged and cached state.
    pub fn reload(&mut self) -> StoreResult<()> {
        let snapshot = self.runtime.block_on(load_snapshot(&self.pool))?;
        self.staged = InMemoryRecordStore::from_snapshot(snapshot);
        Ok(())
    }
}

impl InboundLedger for SqliteRecordStore {
    fn append_inbound(&self, record: InboundRecord) -> StoreResult<()> {
        self.staged.append_inbound(record)
    }

    fn find_inbound(&self, part_id: &PartId) -> StoreResult<Option<InboundRecord>> {
        self.staged.find_inbound(part_id)
    }

    fn set_on_hand(&self, part_id: &PartId, on_hand: u64) -> StoreResult<()> {
        self.staged.set_on_hand(part_id, on_hand)
    }

    fn update_inbound(&self, record: InboundRecord) -> StoreResult<()> {
        self.staged.update_inbound(record)
    }

    fn list_inbound(&self) -> StoreResult<Vec<InboundRecord>> {
        self.staged.list_inbound()
    }
}

impl OutboundLedger for SqliteRecordStore {
    fn append_outbound(&self, record: MovementRecord) -> StoreResult<()> {
        self.staged.append_outbound(record)
    }

    fn list_outbound(&self) -> StoreResult<Vec<MovementRecord>> {
        self.staged.list_outbound()
    }
}

impl StatusTable for SqliteRecordStore {
    fn replace_all(&self, rows: Vec<InventoryStatusRow>) -> StoreResult<()> {
        self.staged.replace_all(rows)
    }

    fn list_status(&self) -> StoreResult<Vec<InventoryStatusRow>> {
        self.staged.list_status()
    }
}

impl Durable for SqliteRecordStore {
    fn commit(&self) -> StoreResult<()> {
        let snapshot = self.staged.snapshot()?;
        self.runtime.block_on(write_snapshot(&self.pool, &snapshot))?;
        self.staged.commit()
    }

    fn rollback(&self) -> StoreResult<()> {
        self.staged.rollback()
    }
}

async fn load_snapshot(pool: &SqlitePool) -> StoreResult<LedgerSnapshot> {
    let inbound_rows = sqlx::query(&format!(
        "SELECT {MOVEMENT_COLUMNS}, on_hand FROM inbound_movements ORDER BY position"
    ))
    .fetch_all(pool)
    .await?;
    let outbound_rows = sqlx::query(&format!(
        "SELECT {MOVEMENT_COLUMNS} FROM outbound_movements ORDER BY position"
    ))
    .fetch_all(pool)
    .await?;
    let status_rows = sqlx::query(
        "SELECT part_id, name, current_stock, minimum, maximum, status \
         FROM inventory_status ORDER BY position",
    )
    .fetch_all(pool)
    .await?;

    let inbound = inbound_rows
        .iter()
        .map(|row| {
            Ok(InboundRecord {
                movement: movement_from_row(row, MovementKind::Inbound)?,
                on_hand: unsigned(row, "on_hand")?,
            })
        })
        .collect::<StoreResult<Vec<_>>>()?;
    let outbound = outbound_rows
        .iter()
        .map(|row| movement_from_row(row, MovementKind::Outbound))
        .collect::<StoreResult<Vec<_>>>()?;
    let status = status_rows
        .iter()
        .map(status_from_row)
        .collect::<StoreResult<Vec<_>>>()?;

    Ok(LedgerSnapshot {
        inbound,
        outbound,
        status,
    })
}

async fn write_snapshot(pool: &SqlitePool, snapshot: &LedgerSnapshot) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    for table in ["inbound_movements", "outbound_movements", "inventory_status"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }

    for (position, rec) in snapshot.inbound.iter().enumerate() {
        insert_movement(&mut tx, position, &rec.movement, Some(rec.on_hand)).await?;
    }
    for (position, rec) in snapshot.outbound.iter().enumerate() {
        insert_movement(&mut tx, position, rec, None).await?;
    }
    for (position, row) in snapshot.status.iter().enumerate() {
        let status = serde_json::to_string(&row.status)
            .map_err(|e| StoreError::Corrupt(format!("status of part {}: {e}", row.part_id)))?;
        sqlx::query(
            "INSERT INTO inventory_status \
             (position, part_id, name, current_stock, minimum, maximum, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(signed(position as u64)?)
        .bind(row.part_id.as_str())
        .bind(row.name.as_str())
        .bind(signed(row.current_stock)?)
        .bind(signed(row.minimum)?)
        .bind(signed(row.maximum)?)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

async fn insert_movement(
    tx: &mut Transaction<'_, Sqlite>,
    position: usize,
    rec: &MovementRecord,
    on_hand: Option<u64>,
) -> StoreResult<()> {
    let sql = match on_hand {
        Some(_) => format!(
            "INSERT INTO inbound_movements (position, {MOVEMENT_COLUMNS}, on_hand) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        None => format!(
            "INSERT INTO outbound_movements (position, {MOVEMENT_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
    };

    let d = &rec.details;
    let mut query = sqlx::query(&sql)
        .bind(signed(position as u64)?)
        .bind(rec.id.to_string())
        .bind(rec.part_id.as_str())
        .bind(rec.date.as_str())
        .bind(d.name.as_str())
        .bind(d.description.as_str())
        .bind(d.unit.as_str())
        .bind(d.warehouse.as_str())
        .bind(d.location.as_str())
        .bind(d.custodian.as_str())
        .bind(d.comments.as_str())
        .bind(signed(rec.quantity)?);
    if let Some(on_hand) = on_hand {
        query = query.bind(signed(on_hand)?);
    }
    query.execute(&mut **tx).await?;
    Ok(())
}

fn movement_from_row(row: &SqliteRow, kind: MovementKind) -> StoreResult<MovementRecord> {
    let movement_id: String = row.try_get("movement_id")?;
    let part_id: String = row.try_get("part_id")?;

    Ok(MovementRecord {
        id: MovementId::from_str(&movement_id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        kind,
        date: RecordDate::from_raw(row.try_get::<String, _>("recorded_on")?),
        part_id: PartId::from_str(&part_id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        quantity: unsigned(row, "quantity")?,
        details: MovementDetails {
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            unit: row.try_get("unit")?,
            warehouse: row.try_get("warehouse")?,
            location: row.try_get("location")?,
            custodian: row.try_get("custodian")?,
            comments: row.try_get("comments")?,
        },
    })
}

fn status_from_row(row: &SqliteRow) -> StoreResult<InventoryStatusRow> {
    let part_id: String = row.try_get("part_id")?;
    let status: String = row.try_get("status")?;

    Ok(InventoryStatusRow {
        part_id: PartId::from_str(&part_id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        name: row.try_get("name")?,
        current_stock: unsigned(row, "current_stock")?,
        minimum: unsigned(row, "minimum")?,
        maximum: unsigned(row, "maximum")?,
        status: serde_json::from_str::<StockStatus>(&status)
            .map_err(|e| StoreError::Corrupt(format!("status of part {part_id}: {e}")))?,
    })
}

fn unsigned(row: &SqliteRow, column: &str) -> StoreResult<u64> {
    let value: i64 = row.try_get(column)?;
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} is negative ({value})")))
}

fn signed(value: u64) -> StoreResult<i64> {
    i64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{value} does not fit in INTEGER")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use toolcrib_core::Quantity;
    use toolcrib_inventory::{ReceiveStock, Thresholds, classify};

    fn entry(part: &str, qty: u64) -> InboundRecord {
        InboundRecord::open(&ReceiveStock {
            part_id: part.parse().unwrap(),
            quantity: Quantity::new(qty).unwrap(),
            details: MovementDetails::named("Impact driver"),
            occurred_on: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn committed_rows_survive_reload() {
        let mut store = SqliteRecordStore::open("sqlite::memory:").unwrap();
        let inbound = entry("P1", 8);
        let mut outbound = inbound.movement.clone();
        outbound.kind = MovementKind::Outbound;
        outbound.id = MovementId::new();
        outbound.quantity = 3;
        outbound.date = RecordDate::from_raw("garbled");

        store.append_inbound(inbound.clone()).unwrap();
        store.append_outbound(outbound.clone()).unwrap();
        store
            .replace_all(vec![InventoryStatusRow {
                part_id: "P1".parse().unwrap(),
                name: "Impact driver".to_string(),
                current_stock: 5,
                minimum: 2,
                maximum: 16,
                status: classify(5, 2, 16),
            }])
            .unwrap();
        store.commit().unwrap();

        store.reload().unwrap();
        assert_eq!(store.list_inbound().unwrap(), vec![inbound]);
        assert_eq!(store.list_outbound().unwrap(), vec![outbound]);
        assert_eq!(
            store.thresholds().unwrap().get(&"P1".parse().unwrap()),
            Some(&Thresholds::new(2, 16))
        );
    }

    #[test]
    fn uncommitted_writes_are_lost_on_reload() {
        let mut store = SqliteRecordStore::open("sqlite::memory:").unwrap();
        store.append_inbound(entry("P1", 8)).unwrap();
        store.reload().unwrap();
        assert!(store.list_inbound().unwrap().is_empty());
    }
}
