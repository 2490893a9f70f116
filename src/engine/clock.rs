// ==========================================
// 铸造模具监控系统 - 进程时钟
// ==========================================
// 职责: 提供"今天"（决定当前周期与缓存分区）
// 测试使用 FixedClock 保证确定性
// ==========================================

use chrono::{Local, NaiveDate};
use std::sync::RwLock;

/// 时钟接口
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// 系统本地时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// 可手动拨动的固定时钟
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        match self.today.write() {
            Ok(mut guard) => *guard = today,
            Err(poisoned) => *poisoned.into_inner() = today,
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.today.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_can_be_moved() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2020, 3, 16).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2020, 3, 16).unwrap());
    }
}
