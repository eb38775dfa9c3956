use super::FuturesData;
use crate::errors::ExchangeError;
use crate::models::{PairDescriptor, PairDetails, pair_object, value_text};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://api.coindcx.com/exchange/v1/derivatives/futures/data";

/// CoinDCX futures-data client. One instance lives for the whole process
/// and shares its connection pool across requests.
pub struct CoinDcx {
    client: reqwest::Client,
    base_url: Url,
}

impl CoinDcx {
    /// `base_url` must be a hierarchical URL (config validates this).
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, name: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value, ExchangeError> {
        let url = self.endpoint(endpoint, params);

        let body = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ExchangeError::RequestFailed)
            .inspect_err(|e| tracing::error!("[{}] {e}", self.name()))?
            .bytes()
            .await?;

        let data: Value = serde_json::from_slice(&body)
            .map_err(ExchangeError::MalformedResponse)
            .inspect_err(|e| tracing::error!("[{}] {endpoint}: {e}", self.name()))?;

        tracing::debug!(
            "[{}] {endpoint} response type: {}, preview: {:.200}",
            self.name(),
            json_type(&data),
            data.to_string()
        );

        Ok(data)
    }
}

#[async_trait]
impl FuturesData for CoinDcx {
    fn name(&self) -> &'static str {
        "coindcx"
    }

    async fn fetch_active_pairs(&self) -> Result<Vec<PairDescriptor>, ExchangeError> {
        tracing::info!("[{}] fetching active futures pairs", self.name());
        let response = self.get_json("active_instruments", &[]).await?;
        normalize_active_pairs(response)
            .inspect_err(|e| tracing::error!("[{}] active_instruments: {e}", self.name()))
    }

    async fn fetch_pair_details(&self, pair: &str) -> Result<PairDetails, ExchangeError> {
        tracing::info!("[{}] fetching details for pair: {pair}", self.name());
        let response = self.get_json("instrument", &[("pair", pair)]).await?;
        normalize_pair_details(pair, response)
    }
}

/// JSON type name used in format errors.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The list is either all names or all objects, judged by the first entry.
/// Stray non-objects in an object list are kept as `Named`.
pub fn normalize_active_pairs(response: Value) -> Result<Vec<PairDescriptor>, ExchangeError> {
    let items = match response {
        Value::Array(items) => items,
        other => {
            return Err(ExchangeError::UnexpectedFormat(format!(
                "expected array of active pairs, got {}",
                json_type(&other)
            )));
        }
    };

    let names_only = items.first().is_some_and(|first| !first.is_object());
    if names_only {
        tracing::info!("received list of pair names, wrapping into pair objects");
        return Ok(items
            .iter()
            .enumerate()
            .map(|(position, item)| {
                let name = value_text(item);
                if name.is_empty() {
                    tracing::warn!("active pair #{position} has no usable name: {item}");
                }
                PairDescriptor::wrap(name)
            })
            .collect());
    }

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => PairDescriptor::Object(map),
            other => PairDescriptor::Named(value_text(&other)),
        })
        .collect())
}

pub fn normalize_pair_details(pair: &str, response: Value) -> Result<PairDetails, ExchangeError> {
    let as_details = |value: Value| match value {
        Value::Object(map) => map,
        other => pair_object(value_text(&other)),
    };

    match response {
        Value::Array(items) if !items.is_empty() => {
            tracing::info!("received list response for pair {pair}, using first item");
            Ok(items.into_iter().next().map(as_details).unwrap_or_default())
        }
        Value::Object(map) => Ok(map),
        Value::String(s) => {
            tracing::info!("received string response for pair {pair}");
            Ok(as_details(Value::String(s)))
        }
        other => Err(ExchangeError::UnexpectedFormat(format!(
            "pair {pair}: got {} {}",
            json_type(&other),
            other
        ))),
    }
}
