use std::fmt::Formatter;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{TickerSymbol, UtcDateTime};

/// One daily price row. Only `date` and `close` drive the charts; the rest is
/// carried so the response mirrors what the provider reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: UtcDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl HistoryPoint {
    pub fn new(date: UtcDateTime, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }

    /// `YYYY-MM-DD` label used on chart axes.
    pub fn calendar_label(&self) -> String {
        self.date.date().to_string()
    }
}

/// Provider numeric value with its display form, e.g. `{"raw": 1.2e11, "fmt": "120.5B"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmt: Option<String>,
}

impl FormattedValue {
    pub fn new(raw: f64, fmt: impl Into<String>) -> Self {
        Self {
            raw: Some(raw),
            fmt: Some(fmt.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyStatistics {
    #[serde(
        rename = "forwardPE",
        default,
        deserialize_with = "number_or_raw",
        skip_serializing_if = "Option::is_none"
    )]
    pub forward_pe: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<FormattedValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyEarnings {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<FormattedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<FormattedValue>,
}

impl QuarterlyEarnings {
    pub fn actual_eps(&self) -> Option<f64> {
        self.actual.as_ref().and_then(|value| value.raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarningsChart {
    #[serde(default)]
    pub quarterly: Vec<QuarterlyEarnings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings_chart: Option<EarningsChart>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Summary modules returned for one ticker. Every module is optional and
/// absence means "not available".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_detail: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_key_statistics: Option<KeyStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_data: Option<FinancialData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings: Option<Earnings>,
}

impl SummaryStats {
    pub fn forward_pe(&self) -> Option<f64> {
        self.default_key_statistics
            .as_ref()
            .and_then(|stats| stats.forward_pe)
    }

    pub fn ebitda_display(&self) -> Option<&str> {
        self.financial_data
            .as_ref()
            .and_then(|data| data.ebitda.as_ref())
            .and_then(|ebitda| ebitda.fmt.as_deref())
    }

    pub fn quarterly_earnings(&self) -> &[QuarterlyEarnings] {
        self.earnings
            .as_ref()
            .and_then(|earnings| earnings.earnings_chart.as_ref())
            .map(|chart| chart.quarterly.as_slice())
            .unwrap_or(&[])
    }
}

/// Price history plus summary statistics for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub history: Vec<HistoryPoint>,
    pub summary: SummaryStats,
}

/// Per-ticker records in request order.
///
/// Serialized as a JSON object whose key order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockResultSet {
    entries: Vec<(TickerSymbol, StockRecord)>,
}

impl StockResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A repeated ticker keeps its first position.
    pub fn insert(&mut self, ticker: TickerSymbol, record: StockRecord) {
        match self.entries.iter_mut().find(|(key, _)| *key == ticker) {
            Some((_, existing)) => *existing = record,
            None => self.entries.push((ticker, record)),
        }
    }

    pub fn first(&self) -> Option<(&TickerSymbol, &StockRecord)> {
        self.entries.first().map(|(key, record)| (key, record))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TickerSymbol, &StockRecord)> {
        self.entries.iter().map(|(key, record)| (key, record))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &TickerSymbol> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(TickerSymbol, StockRecord)> for StockResultSet {
    fn from_iter<I: IntoIterator<Item = (TickerSymbol, StockRecord)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (ticker, record) in iter {
            set.insert(ticker, record);
        }
        set
    }
}

impl Serialize for StockResultSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ticker, record) in &self.entries {
            map.serialize_entry(ticker, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StockResultSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ResultSetVisitor;

        impl<'de> Visitor<'de> for ResultSetVisitor {
            type Value = StockResultSet;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("an object keyed by ticker symbol")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut set = StockResultSet::new();
                while let Some((ticker, record)) =
                    access.next_entry::<TickerSymbol, StockRecord>()?
                {
                    set.insert(ticker, record);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ResultSetVisitor)
    }
}

/// Yahoo sends either a bare number or a `{raw, fmt}` wrapper. Anything else
/// (strings such as "Infinity", empty objects) reads as not available.
fn number_or_raw<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::Object(object) => object.get("raw").and_then(Value::as_f64),
        _ => None,
    }))
}
