use serde_json::{Map, Value};

/// One row of the `futures_pairs` table.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingPairRecord {
    pub pair: String,
    pub kind: String,
    pub status: String,
    pub tick_size: f64,
    // kept as the upstream text, never parsed
    pub price_band_upper: String,
}

/// Details object for a single pair, already normalized by the client.
pub type PairDetails = Map<String, Value>;

/// An entry of the active-pairs list. The upstream sends either bare pair
/// names or full objects; the client resolves which one right after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PairDescriptor {
    Named(String),
    Object(Map<String, Value>),
}

impl PairDescriptor {
    /// Wraps a bare name as `{"pair": name}`.
    pub fn wrap(name: impl Into<String>) -> Self {
        Self::Object(pair_object(name))
    }

    /// The pair symbol, or `None` when missing or empty.
    pub fn pair_name(&self) -> Option<String> {
        let name = match self {
            Self::Named(name) => name.clone(),
            Self::Object(map) => map.get("pair").map(value_text)?,
        };
        (!name.is_empty()).then_some(name)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Named(_) => None,
            Self::Object(map) => map.get(key),
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }
}

pub fn pair_object(name: impl Into<String>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("pair".to_string(), Value::String(name.into()));
    map
}

/// Text form of a JSON value: strings as-is, `null` as empty,
/// everything else as its JSON encoding.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Live pair metadata shown on `/active` and `/usdt`. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePairSummary {
    pub pair: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub last_price: String,
    pub volume_24h: String,
    pub high_24h: String,
    pub low_24h: String,
}

impl ActivePairSummary {
    pub fn from_descriptor(descriptor: &PairDescriptor) -> Self {
        let text = |key: &str, default: &str| {
            descriptor
                .field(key)
                .filter(|v| !v.is_null())
                .map(value_text)
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            pair: descriptor.pair_name().unwrap_or_default(),
            base_currency: text("base_currency", ""),
            quote_currency: text("quote_currency", ""),
            last_price: text("last_price", "0"),
            volume_24h: text("volume_24h", "0"),
            high_24h: text("high_24h", "0"),
            low_24h: text("low_24h", "0"),
        }
    }
}

/// A pair that was left out of a refresh, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct PairSkip {
    pub pair: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshResult {
    pub pairs_processed: usize,
    pub pairs_failed: usize,
    pub tick_size_defaulted: usize,
    pub skipped: Vec<PairSkip>,
}

impl RefreshResult {
    pub fn skip(&mut self, pair: impl Into<String>, reason: impl Into<String>) {
        self.pairs_failed += 1;
        self.skipped.push(PairSkip {
            pair: pair.into(),
            reason: reason.into(),
        });
    }
}
