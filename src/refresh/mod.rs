use crate::errors::RefreshError;
use crate::exchanges::FuturesData;
use crate::models::{PairDetails, RefreshResult, TradingPairRecord, value_text};
use crate::store::{PairStore, pairs};
use serde_json::Value;
use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;

/// Rebuilds the `futures_pairs` table from live exchange data.
///
/// The delete, every insert and the commit share one transaction: a fatal
/// error anywhere rolls all of it back, while a pair whose details can't be
/// fetched is only logged and left out.
pub struct RefreshOrchestrator {
    exchange: Arc<dyn FuturesData>,
    store: PairStore,
}

impl RefreshOrchestrator {
    pub fn new(exchange: Arc<dyn FuturesData>, store: PairStore) -> Self {
        Self { exchange, store }
    }

    pub async fn refresh(&self) -> Result<RefreshResult, RefreshError> {
        metrics::counter!("refresh_runs_total").increment(1);

        let outcome = self.run().await;
        match &outcome {
            Ok(result) => {
                metrics::counter!("refresh_pairs_processed_total").increment(result.pairs_processed as u64);
                metrics::counter!("refresh_pairs_failed_total").increment(result.pairs_failed as u64);
                tracing::info!(
                    "[refresh] committed {} pairs, skipped {}, {} with default tick size",
                    result.pairs_processed,
                    result.pairs_failed,
                    result.tick_size_defaulted
                );
            }
            Err(e) => {
                metrics::counter!("refresh_failures_total").increment(1);
                tracing::error!("[refresh] error refreshing data: {e}");
            }
        }
        outcome
    }

    async fn run(&self) -> Result<RefreshResult, RefreshError> {
        let mut tx = self.store.begin().await?;

        match self.replace_pairs(&mut tx).await {
            Ok(result) => {
                tx.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!("[refresh] rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    async fn replace_pairs(&self, conn: &mut SqliteConnection) -> Result<RefreshResult, RefreshError> {
        let removed = pairs::delete_all(&mut *conn).await?;
        tracing::debug!("[refresh] cleared {removed} existing rows");

        let active = self
            .exchange
            .fetch_active_pairs()
            .await
            .map_err(RefreshError::UpstreamUnavailable)?;
        tracing::info!("[{}] retrieved {} active pairs", self.exchange.name(), active.len());

        let mut result = RefreshResult::default();
        // upsert folds repeated names into one row, count each row once
        let mut staged = HashSet::new();

        for (position, descriptor) in active.iter().enumerate() {
            let Some(pair) = descriptor.pair_name() else {
                tracing::warn!("[refresh] active pair #{position} has no name: {descriptor:?}");
                result.skip("", format!("active pair #{position} has no pair name"));
                continue;
            };

            let details = match self.exchange.fetch_pair_details(&pair).await {
                Ok(details) => details,
                Err(e) => {
                    tracing::error!("[refresh] error processing pair {pair}: {e}");
                    result.skip(pair, e.to_string());
                    continue;
                }
            };

            let tick_size = parse_tick_size(details.get("tick_size")).unwrap_or_else(|| {
                tracing::warn!("[refresh] invalid tick_size for pair {pair}, using default");
                result.tick_size_defaulted += 1;
                0.0
            });

            let record = TradingPairRecord {
                kind: text_field(&details, "kind"),
                status: text_field(&details, "status"),
                tick_size,
                price_band_upper: text_field(&details, "price_band_upper"),
                pair,
            };

            pairs::upsert(&mut *conn, &record).await?;
            if staged.insert(record.pair.clone()) {
                result.pairs_processed += 1;
            } else {
                tracing::warn!("[refresh] pair {} listed more than once, keeping latest details", record.pair);
            }
            tracing::debug!("[refresh] staged pair: {}", record.pair);
        }

        Ok(result)
    }
}

fn text_field(details: &PairDetails, key: &str) -> String {
    details.get(key).map(value_text).unwrap_or_default()
}

/// Numbers are taken as-is, strings are parsed. Anything else, or a
/// non-finite result, is `None`.
fn parse_tick_size(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}
