// ==========================================
// 铸造模具监控系统 - 临界等级判定
// ==========================================
// 规则: 距下次维护 < 3 个月 → 红; < 6 个月 → 黄; 其余 → 绿
// 月差按实数计算（天数 / 平均公历月长），不做整月截断
// ==========================================

use crate::domain::{CriticalityTier, Period};
use chrono::NaiveDate;

/// 平均公历月长（天）
pub const DAYS_PER_MONTH: f64 = 365.2425 / 12.0;

/// 实数月差: 维护周期月初 − 今天
pub fn months_until(maintenance: Period, today: NaiveDate) -> f64 {
    let days = (maintenance.first_day() - today).num_days() as f64;
    days / DAYS_PER_MONTH
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalityClassifier {
    pub critical_months: f64,
    pub warning_months: f64,
}

impl Default for CriticalityClassifier {
    fn default() -> Self {
        Self {
            critical_months: 3.0,
            warning_months: 6.0,
        }
    }
}

impl CriticalityClassifier {
    pub fn new(critical_months: f64, warning_months: f64) -> Self {
        Self {
            critical_months,
            warning_months,
        }
    }

    /// 维护是否落在 N 个月内
    pub fn within_months(&self, maintenance: Period, today: NaiveDate, months: f64) -> bool {
        months_until(maintenance, today) < months
    }

    pub fn classify(&self, maintenance: Period, today: NaiveDate) -> CriticalityTier {
        if self.within_months(maintenance, today, self.critical_months) {
            CriticalityTier::Critical
        } else if self.within_months(maintenance, today, self.warning_months) {
            CriticalityTier::Warning
        } else {
            CriticalityTier::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_months_until_is_real_valued() {
        let gap = months_until(Period::new(2020, 4).unwrap(), d(2020, 1, 16));
        // 76 天 ≈ 2.497 个月
        assert!((gap - 76.0 / DAYS_PER_MONTH).abs() < 1e-9);
        assert!(gap < 3.0 && gap > 2.0);
    }

    #[test]
    fn test_past_maintenance_is_critical() {
        let classifier = CriticalityClassifier::default();
        let tier = classifier.classify(Period::new(2020, 1).unwrap(), d(2020, 1, 20));
        assert_eq!(tier, CriticalityTier::Critical);
    }

    #[test]
    fn test_tier_boundaries() {
        let classifier = CriticalityClassifier::default();
        let today = d(2020, 1, 1);

        // 3 个月整（91 天 ≈ 2.99 月）仍为红
        assert_eq!(
            classifier.classify(Period::new(2020, 4).unwrap(), today),
            CriticalityTier::Critical
        );
        // 2020-05-01: 121 天 ≈ 3.98 月
        assert_eq!(
            classifier.classify(Period::new(2020, 5).unwrap(), today),
            CriticalityTier::Warning
        );
        // 2020-08-01: 213 天 ≈ 7.0 月
        assert_eq!(
            classifier.classify(Period::new(2020, 8).unwrap(), today),
            CriticalityTier::Ok
        );
    }
}
