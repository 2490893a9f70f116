// ==========================================
// 铸造模具监控系统 - 订单领域模型
// ==========================================
// 职责: 长表订单行 (客户, 产品, 周期, 数量)
// 唯一性: 每个 (客户, 产品, 周期) 至多一行
// ==========================================

use crate::domain::types::{CustomerId, Period, ProductId};
use serde::{Deserialize, Serialize};

/// 单行订货量上限（源表按 32 位无符号整数存储）
pub const MAX_ORDER_QUANTITY: u64 = u32::MAX as u64;

/// 订单唯一键
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderKey {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub period: Period,
}

// ==========================================
// Order - 订单行
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub period: Period,
    pub quantity: u64, // 订货量（不小于 0）
}

impl Order {
    pub fn new(customer_id: CustomerId, product_id: ProductId, period: Period, quantity: u64) -> Self {
        Self {
            customer_id,
            product_id,
            period,
            quantity,
        }
    }

    pub fn key(&self) -> OrderKey {
        OrderKey {
            customer_id: self.customer_id,
            product_id: self.product_id,
            period: self.period,
        }
    }

    /// 叠加带符号增量，结果截断到 [0, MAX_ORDER_QUANTITY]
    pub fn apply_delta(&mut self, delta: i64) {
        let next = self.quantity as i128 + delta as i128;
        self.quantity = next.clamp(0, MAX_ORDER_QUANTITY as i128) as u64;
    }
}

/// 表格展示行（附带该行造成的模具磨损总量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub period: Period,
    pub quantity: u64,
    pub total_attrition: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_delta_clamps_to_zero() {
        let period = Period::new(2020, 1).unwrap();
        let mut order = Order::new(CustomerId(1), ProductId(7), period, 10);

        order.apply_delta(5);
        assert_eq!(order.quantity, 15);

        order.apply_delta(-1_000_000);
        assert_eq!(order.quantity, 0);
    }

    #[test]
    fn test_apply_delta_saturates_at_quantity_cap() {
        let period = Period::new(2020, 1).unwrap();
        let mut order = Order::new(CustomerId(1), ProductId(7), period, 10);

        order.apply_delta(i64::MAX);
        order.apply_delta(i64::MAX);
        assert_eq!(order.quantity, MAX_ORDER_QUANTITY);
    }
}
