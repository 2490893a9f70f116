// ==========================================
// 铸造模具监控系统 - 领域类型定义
// ==========================================
// 职责: 标识符、月份周期、临界等级
// 约定: 所有时间序列按自然月 (Period) 聚合
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 标识符
// ==========================================

/// 客户号（源表 `Kunde` 列，非负整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u32);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 产品号（源表 `Produktnummer` 列，非负整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 模具号（如 "F1"）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ==========================================
// Period - 自然月周期
// ==========================================
// 排序: 先年后月（派生 Ord 依赖字段顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// 展示格式（与源数据看板一致，如 "Jan 19"）
    pub const DISPLAY_FORMAT: &'static str = "%b %y";

    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 日期所在月份
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 当月第一天
    pub fn first_day(&self) -> NaiveDate {
        // year/month 由构造函数校验，月初日期必然存在
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 解析周期标签
    ///
    /// # 支持格式
    /// - `Jan-19` / `Jan 19`（源表列头）
    /// - `Jan-2019`
    /// - `2019-01` / `2019-01-01`
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }

        let dashed = trimmed.replace(' ', "-");
        let candidates = [
            (format!("01-{}", dashed), "%d-%b-%y"),
            (format!("01-{}", dashed), "%d-%b-%Y"),
            (format!("{}-01", dashed), "%Y-%m-%d"),
            (dashed.clone(), "%Y-%m-%d"),
        ];

        candidates
            .iter()
            .find_map(|(value, fmt)| NaiveDate::parse_from_str(value, fmt).ok())
            .map(Self::from_date)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format(Self::DISPLAY_FORMAT))
    }
}

// ==========================================
// 临界等级 (Criticality Tier)
// ==========================================
// 依据距下次维护的月数划分: <3 红, <6 黄, 其余绿
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriticalityTier {
    Critical = 0, // 红
    Warning = 1,  // 黄
    Ok = 2,       // 绿
}

impl CriticalityTier {
    /// 数值等级 (0/1/2)，供展示层取颜色
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn color(self) -> &'static str {
        match self {
            CriticalityTier::Critical => "red",
            CriticalityTier::Warning => "yellow",
            CriticalityTier::Ok => "green",
        }
    }
}

impl fmt::Display for CriticalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalityTier::Critical => write!(f, "CRITICAL"),
            CriticalityTier::Warning => write!(f, "WARNING"),
            CriticalityTier::Ok => write!(f, "OK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse_source_headers() {
        assert_eq!(Period::parse("Jan-19"), Period::new(2019, 1));
        assert_eq!(Period::parse("Dec 20"), Period::new(2020, 12));
        assert_eq!(Period::parse("2021-03"), Period::new(2021, 3));
        assert_eq!(Period::parse("2021-03-01"), Period::new(2021, 3));
        assert_eq!(Period::parse("Gesamt"), None);
        assert_eq!(Period::parse(""), None);
    }

    #[test]
    fn test_period_order_is_chronological() {
        let mut periods = vec![
            Period::parse("Feb-20").unwrap(),
            Period::parse("Dec-19").unwrap(),
            Period::parse("Jan-20").unwrap(),
        ];
        periods.sort();
        let labels: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
        assert_eq!(labels, vec!["Dec 19", "Jan 20", "Feb 20"]);
    }

    #[test]
    fn test_criticality_tier_color() {
        assert_eq!(CriticalityTier::Critical.color(), "red");
        assert_eq!(CriticalityTier::Warning.color(), "yellow");
        assert_eq!(CriticalityTier::Ok.color(), "green");
    }

    #[test]
    fn test_criticality_tier_index() {
        assert_eq!(CriticalityTier::Critical.index(), 0);
        assert_eq!(CriticalityTier::Warning.index(), 1);
        assert_eq!(CriticalityTier::Ok.index(), 2);
        assert!(CriticalityTier::Critical < CriticalityTier::Ok);
    }
}
