//! 周期值对象（某月的第一天）

use std::fmt;
use std::str::FromStr;

use bodyback_errors::ApiError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 周期，总是归一到当月 1 日，序列化为 `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    /// 由年月构造，月份范围 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self, ApiError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| ApiError::validation(format!("invalid period {year}-{month:02}")))
    }

    /// 任意日期归一到当月 1 日
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// 下一个月
    pub fn next(&self) -> Self {
        if self.month() == 12 {
            Self::from_date(NaiveDate::from_ymd_opt(self.year() + 1, 1, 1).unwrap_or(self.0))
        } else {
            Self::from_date(NaiveDate::from_ymd_opt(self.year(), self.month() + 1, 1).unwrap_or(self.0))
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Period {
    type Err = ApiError;

    /// 接受 `YYYY-MM-DD` 或 `YYYY-MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ApiError::validation(format!("invalid period '{s}', expected YYYY-MM-DD")))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
