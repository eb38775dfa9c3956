use crate::errors::ExchangeError;
use crate::models::{PairDescriptor, PairDetails, value_text};
use async_trait::async_trait;

pub mod coindcx;

/// Read side of an exchange's futures-data API.
#[async_trait]
pub trait FuturesData: Send + Sync {
    fn name(&self) -> &'static str;

    /// All pairs currently open for trading, normalized to descriptors.
    async fn fetch_active_pairs(&self) -> Result<Vec<PairDescriptor>, ExchangeError>;

    /// Instrument details for a single pair.
    async fn fetch_pair_details(&self, pair: &str) -> Result<PairDetails, ExchangeError>;

    /// Active pairs quoted in USDT.
    async fn fetch_usdt_pairs(&self) -> Result<Vec<PairDescriptor>, ExchangeError> {
        let pairs = self.fetch_active_pairs().await?;
        Ok(pairs.into_iter().filter(is_usdt_pair).collect())
    }
}

/// Uses `quote_currency` when the upstream sends one, otherwise the symbol suffix.
fn is_usdt_pair(descriptor: &PairDescriptor) -> bool {
    match descriptor.field("quote_currency").filter(|v| !v.is_null()) {
        Some(quote) => value_text(quote).eq_ignore_ascii_case("USDT"),
        None => descriptor
            .pair_name()
            .is_some_and(|name| name.to_ascii_uppercase().ends_with("USDT")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(Vec<PairDescriptor>);

    #[async_trait]
    impl FuturesData for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_active_pairs(&self) -> Result<Vec<PairDescriptor>, ExchangeError> {
            Ok(self.0.clone())
        }

        async fn fetch_pair_details(&self, pair: &str) -> Result<PairDetails, ExchangeError> {
            Err(ExchangeError::UnexpectedFormat(pair.to_string()))
        }
    }

    fn object(value: serde_json::Value) -> PairDescriptor {
        match value {
            serde_json::Value::Object(map) => PairDescriptor::Object(map),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn usdt_filter_prefers_quote_currency() {
        let source = Fixed(vec![
            object(json!({"pair": "B-BTC_USDT", "quote_currency": "usdt"})),
            object(json!({"pair": "B-ETH_INR", "quote_currency": "INR"})),
            // suffix says USDT but the quote currency wins
            object(json!({"pair": "ODDUSDT", "quote_currency": "INR"})),
            PairDescriptor::wrap("SOLUSDT"),
            PairDescriptor::Named("XRPINR".into()),
        ]);

        let names: Vec<_> = source
            .fetch_usdt_pairs()
            .await
            .unwrap()
            .iter()
            .filter_map(PairDescriptor::pair_name)
            .collect();

        assert_eq!(names, vec!["B-BTC_USDT", "SOLUSDT"]);
    }
}
