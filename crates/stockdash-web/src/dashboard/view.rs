//! Chart and table view models derived from a [`StockResultSet`].
//!
//! Each chart renders to a Chart.js configuration object; the page embeds it
//! verbatim and the browser does the drawing.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{json, Value};
use stockdash_core::StockResultSet;

/// Series colors, cycled by ticker position.
pub const SERIES_COLORS: [&str; 5] = ["blue", "red", "green", "orange", "purple"];

/// Placeholder for a metric the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub color: &'static str,
}

/// Closing-price line chart, one dataset per ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl LineChart {
    /// The x-axis is the sorted union of every ticker's trading dates. A
    /// ticker with no close on a date gets a gap there.
    pub fn from_results(results: &StockResultSet) -> Self {
        let labels: Vec<String> = results
            .iter()
            .flat_map(|(_, record)| record.history.iter().map(|point| point.calendar_label()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let datasets = results
            .iter()
            .enumerate()
            .map(|(index, (ticker, record))| {
                let closes: BTreeMap<String, f64> = record
                    .history
                    .iter()
                    .map(|point| (point.calendar_label(), point.close))
                    .collect();
                Dataset {
                    label: ticker.to_string(),
                    data: labels.iter().map(|label| closes.get(label).copied()).collect(),
                    color: series_color(index),
                }
            })
            .collect();

        Self { labels, datasets }
    }

    pub fn to_config(&self) -> Value {
        let datasets: Vec<Value> = self
            .datasets
            .iter()
            .map(|dataset| {
                json!({
                    "label": dataset.label,
                    "data": dataset.data,
                    "borderColor": dataset.color,
                    "fill": false,
                    "spanGaps": false,
                    "pointRadius": 0,
                })
            })
            .collect();

        json!({
            "type": "line",
            "data": { "labels": self.labels, "datasets": datasets },
            "options": {
                "responsive": true,
                "plugins": { "title": { "display": true, "text": "Closing Price" } },
            },
        })
    }
}

/// Reported quarterly EPS as grouped bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsChart {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl EpsChart {
    pub const TITLE: &'static str = "Quarterly EPS (Reported)";

    /// Quarters come from the first ticker; every other ticker is lined up
    /// against them by quarter label. A quarter a ticker did not report, or
    /// reported without an actual figure, is `None`.
    pub fn from_results(results: &StockResultSet) -> Self {
        let labels: Vec<String> = results
            .first()
            .map(|(_, record)| {
                record
                    .summary
                    .quarterly_earnings()
                    .iter()
                    .map(|quarter| quarter.date.clone())
                    .collect()
            })
            .unwrap_or_default();

        let datasets = results
            .iter()
            .enumerate()
            .map(|(index, (ticker, record))| {
                let actuals: BTreeMap<&str, Option<f64>> = record
                    .summary
                    .quarterly_earnings()
                    .iter()
                    .map(|quarter| (quarter.date.as_str(), quarter.actual_eps()))
                    .collect();
                Dataset {
                    label: format!("{ticker} EPS"),
                    data: labels
                        .iter()
                        .map(|label| actuals.get(label.as_str()).copied().flatten())
                        .collect(),
                    color: series_color(index),
                }
            })
            .collect();

        Self { labels, datasets }
    }

    pub fn to_config(&self) -> Value {
        let datasets: Vec<Value> = self
            .datasets
            .iter()
            .map(|dataset| {
                json!({
                    "label": dataset.label,
                    "data": dataset.data,
                    "backgroundColor": dataset.color,
                })
            })
            .collect();

        json!({
            "type": "bar",
            "data": { "labels": self.labels, "datasets": datasets },
            "options": {
                "responsive": true,
                "plugins": { "title": { "display": true, "text": Self::TITLE } },
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsRow {
    pub ticker: String,
    pub pe_ratio: String,
    pub ebitda: String,
}

/// `Ticker | P/E Ratio | EBITDA` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsTable {
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    pub const HEADERS: [&'static str; 3] = ["Ticker", "P/E Ratio", "EBITDA"];

    pub fn from_results(results: &StockResultSet) -> Self {
        let rows = results
            .iter()
            .map(|(ticker, record)| MetricsRow {
                ticker: ticker.to_string(),
                pe_ratio: record
                    .summary
                    .forward_pe()
                    .map(|pe| pe.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
                ebitda: record
                    .summary
                    .ebitda_display()
                    .unwrap_or(NOT_AVAILABLE)
                    .to_owned(),
            })
            .collect();

        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockdash_core::{
        Earnings, EarningsChart, FinancialData, FormattedValue, HistoryPoint, KeyStatistics,
        QuarterlyEarnings, StockRecord, SummaryStats, TickerSymbol, UtcDateTime,
    };

    fn ticker(raw: &str) -> TickerSymbol {
        TickerSymbol::parse(raw).expect("valid ticker")
    }

    fn day(offset: i64) -> UtcDateTime {
        // 2024-01-02T14:30:00Z plus whole days
        UtcDateTime::from_unix_timestamp(1_704_205_800 + offset * 86_400).expect("timestamp")
    }

    fn history(days: impl IntoIterator<Item = i64>) -> Vec<HistoryPoint> {
        days.into_iter()
            .map(|offset| HistoryPoint::new(day(offset), 100.0 + offset as f64))
            .collect()
    }

    fn quarters(entries: &[(&str, Option<f64>)]) -> SummaryStats {
        SummaryStats {
            earnings: Some(Earnings {
                earnings_chart: Some(EarningsChart {
                    quarterly: entries
                        .iter()
                        .map(|(date, actual)| QuarterlyEarnings {
                            date: (*date).to_owned(),
                            actual: actual.map(|raw| FormattedValue::new(raw, raw.to_string())),
                            estimate: None,
                        })
                        .collect(),
                    ..EarningsChart::default()
                }),
                ..Earnings::default()
            }),
            ..SummaryStats::default()
        }
    }

    #[test]
    fn shared_calendar_gives_one_label_per_point() {
        let results: StockResultSet = ["AAPL", "MSFT"]
            .into_iter()
            .map(|raw| {
                (
                    ticker(raw),
                    StockRecord {
                        history: history(0..252),
                        summary: SummaryStats::default(),
                    },
                )
            })
            .collect();

        let chart = LineChart::from_results(&results);
        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.labels.len(), 252);
        assert!(chart
            .datasets
            .iter()
            .all(|dataset| dataset.data.iter().all(Option::is_some)));
        assert_eq!(chart.datasets[0].color, "blue");
        assert_eq!(chart.datasets[1].color, "red");
    }

    #[test]
    fn mismatched_calendars_leave_gaps() {
        let results: StockResultSet = [
            (
                ticker("AAPL"),
                StockRecord {
                    history: history([0, 1, 2]),
                    summary: SummaryStats::default(),
                },
            ),
            (
                ticker("SAP.DE"),
                StockRecord {
                    history: history([1, 3]),
                    summary: SummaryStats::default(),
                },
            ),
        ]
        .into_iter()
        .collect();

        let chart = LineChart::from_results(&results);
        assert_eq!(
            chart.labels,
            vec!["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
        );
        assert_eq!(
            chart.datasets[1].data,
            vec![None, Some(101.0), None, Some(103.0)]
        );

        let config = chart.to_config();
        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["datasets"][1]["data"][0], Value::Null);
        assert_eq!(config["data"]["datasets"][0]["fill"], false);
    }

    #[test]
    fn colors_cycle_after_five_series() {
        assert_eq!(series_color(5), "blue");
        assert_eq!(series_color(7), "green");
    }

    #[test]
    fn eps_aligns_on_first_ticker_quarters_and_keeps_missing_as_null() {
        let results: StockResultSet = [
            (
                ticker("AAPL"),
                StockRecord {
                    history: Vec::new(),
                    summary: quarters(&[("1Q2024", Some(1.53)), ("2Q2024", Some(1.40))]),
                },
            ),
            (
                ticker("MSFT"),
                StockRecord {
                    history: Vec::new(),
                    summary: quarters(&[("2Q2024", Some(2.94)), ("3Q2024", Some(3.30))]),
                },
            ),
        ]
        .into_iter()
        .collect();

        let chart = EpsChart::from_results(&results);
        assert_eq!(chart.labels, vec!["1Q2024", "2Q2024"]);
        assert_eq!(chart.datasets[0].label, "AAPL EPS");
        assert_eq!(chart.datasets[1].data, vec![None, Some(2.94)]);

        let config = chart.to_config();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["options"]["plugins"]["title"]["text"], EpsChart::TITLE);
    }

    #[test]
    fn quarter_without_actual_is_null_not_zero() {
        let results: StockResultSet = [(
            ticker("AAPL"),
            StockRecord {
                history: Vec::new(),
                summary: quarters(&[("1Q2024", None)]),
            },
        )]
        .into_iter()
        .collect();

        assert_eq!(EpsChart::from_results(&results).datasets[0].data, vec![None]);
    }

    #[test]
    fn metrics_fall_back_to_not_available() {
        let reported = SummaryStats {
            default_key_statistics: Some(KeyStatistics {
                forward_pe: Some(28.5),
                ..KeyStatistics::default()
            }),
            financial_data: Some(FinancialData {
                ebitda: Some(FormattedValue::new(1.3e11, "130.5B")),
                ..FinancialData::default()
            }),
            ..SummaryStats::default()
        };
        let results: StockResultSet = [
            (
                ticker("AAPL"),
                StockRecord {
                    history: Vec::new(),
                    summary: reported,
                },
            ),
            (ticker("NEWCO"), StockRecord::default()),
        ]
        .into_iter()
        .collect();

        let table = MetricsTable::from_results(&results);
        assert_eq!(
            table.rows,
            vec![
                MetricsRow {
                    ticker: "AAPL".into(),
                    pe_ratio: "28.5".into(),
                    ebitda: "130.5B".into(),
                },
                MetricsRow {
                    ticker: "NEWCO".into(),
                    pe_ratio: NOT_AVAILABLE.into(),
                    ebitda: NOT_AVAILABLE.into(),
                },
            ]
        );
    }
}
