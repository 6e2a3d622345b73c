use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

use crate::ValidationError;

/// Lookback period selector for historical prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RangeToken {
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[default]
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
}

impl RangeToken {
    /// Display order of the range selector.
    pub const ALL: [RangeToken; 4] = [
        Self::OneMonth,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMonth => "1M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }

    /// Lenient parse for query strings: absent or unknown tokens fall back to `1Y`.
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    const fn months_back(self) -> i32 {
        match self {
            Self::OneMonth => 1,
            Self::SixMonths => 6,
            Self::OneYear => 12,
            Self::FiveYears => 60,
        }
    }

    /// First calendar day of the lookback window ending at `now`.
    ///
    /// Days missing from the target month clamp to its last day, so
    /// 2024-03-31 minus one month is 2024-02-29.
    pub fn start_date(self, now: OffsetDateTime) -> Result<Date, ValidationError> {
        subtract_months(now.date(), self.months_back())
    }
}

impl Display for RangeToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeToken {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "1M" => Ok(Self::OneMonth),
            "6M" => Ok(Self::SixMonths),
            "1Y" => Ok(Self::OneYear),
            "5Y" => Ok(Self::FiveYears),
            other => Err(ValidationError::InvalidRange {
                value: other.to_owned(),
            }),
        }
    }
}

/// Resolve an optional raw token against `now`.
pub fn resolve(token: Option<&str>, now: OffsetDateTime) -> Result<Date, ValidationError> {
    RangeToken::from_query(token).start_date(now)
}

fn subtract_months(date: Date, months: i32) -> Result<Date, ValidationError> {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months;
    let year = index.div_euclid(12);
    let month_number = (index.rem_euclid(12) + 1) as u8;

    let out_of_range = || ValidationError::DateOutOfRange {
        value: date.to_string(),
    };
    let month = Month::try_from(month_number).map_err(|_| out_of_range())?;
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).map_err(|_| out_of_range())
}
