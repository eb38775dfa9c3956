use crate::models::TradingPairRecord;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

/// The `futures_pairs` table. Cheap to clone, the pool is shared.
#[derive(Clone)]
pub struct PairStore {
    pool: SqlitePool,
}

impl PairStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    /// First `limit` rows ordered by pair name.
    pub async fn list(&self, limit: i64) -> Result<Vec<TradingPairRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT pair, kind, status, tick_size, price_band_upper
             FROM futures_pairs
             ORDER BY pair ASC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM futures_pairs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn record_from_row(r: &SqliteRow) -> TradingPairRecord {
    TradingPairRecord {
        pair: r.get("pair"),
        kind: r.get("kind"),
        status: r.get("status"),
        tick_size: r.get("tick_size"),
        price_band_upper: r.get("price_band_upper"),
    }
}

pub async fn delete_all(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let done = sqlx::query("DELETE FROM futures_pairs").execute(conn).await?;
    Ok(done.rows_affected())
}

/// Insert, or overwrite the row already holding `record.pair`.
pub async fn upsert(conn: &mut SqliteConnection, record: &TradingPairRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO futures_pairs (pair, kind, status, tick_size, price_band_upper)
         VALUES (?, ?, ?, ?, ?)
         ON CONFLICT (pair) DO UPDATE
         SET kind = excluded.kind, status = excluded.status,
             tick_size = excluded.tick_size, price_band_upper = excluded.price_band_upper",
    )
    .bind(&record.pair)
    .bind(&record.kind)
    .bind(&record.status)
    .bind(record.tick_size)
    .bind(&record.price_band_upper)
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_pool;

    fn record(pair: &str, tick_size: f64) -> TradingPairRecord {
        TradingPairRecord {
            pair: pair.to_string(),
            kind: "perpetual".to_string(),
            status: "active".to_string(),
            tick_size,
            price_band_upper: "70000".to_string(),
        }
    }

    #[tokio::test]
    async fn list_is_ordered_and_limited() {
        let store = PairStore::new(memory_pool().await);
        let mut tx = store.begin().await.unwrap();
        for pair in ["SOLUSDT", "BTCUSDT", "ETHUSDT"] {
            upsert(&mut tx, &record(pair, 0.1)).await.unwrap();
        }
        tx.commit().await.unwrap();

        let pairs: Vec<_> = store.list(2).await.unwrap().into_iter().map(|r| r.pair).collect();
        assert_eq!(pairs, vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[tokio::test]
    async fn upsert_overwrites_same_pair() {
        let store = PairStore::new(memory_pool().await);
        let mut tx = store.begin().await.unwrap();
        upsert(&mut tx, &record("BTCUSDT", 0.1)).await.unwrap();
        upsert(&mut tx, &record("BTCUSDT", 0.5)).await.unwrap();
        tx.commit().await.unwrap();

        let rows = store.list(20).await.unwrap();
        assert_eq!(rows, vec![record("BTCUSDT", 0.5)]);
    }

    #[tokio::test]
    async fn rollback_keeps_previous_rows() {
        let store = PairStore::new(memory_pool().await);
        let mut tx = store.begin().await.unwrap();
        upsert(&mut tx, &record("BTCUSDT", 0.1)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(delete_all(&mut tx).await.unwrap(), 1);
        tx.rollback().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }
}
