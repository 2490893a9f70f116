// ==========================================
// 铸造模具监控系统 - 订单簿
// ==========================================
// 职责: 规范化长表订单 + (客户, 产品, 周期) 唯一索引
// 红线: 每个三元组至多一行；数量永不为负
// ==========================================

use crate::domain::{CustomerId, Order, OrderKey, Period};
use std::collections::{HashMap, HashSet};

/// 合并统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub inserted: usize,
    pub replaced: usize,
}

// ==========================================
// OrderBook
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    rows: Vec<Order>,
    index: HashMap<OrderKey, usize>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由订单序列构造（重复三元组后写覆盖）
    pub fn from_orders<I: IntoIterator<Item = Order>>(orders: I) -> Self {
        let mut book = Self::new();
        book.merge(orders);
        book
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.rows.iter()
    }

    pub fn get(&self, key: &OrderKey) -> Option<&Order> {
        self.index.get(key).map(|&idx| &self.rows[idx])
    }

    pub fn quantity(&self, key: &OrderKey) -> Option<u64> {
        self.get(key).map(|o| o.quantity)
    }

    /// 合并订单：已存在的三元组整体替换数量（非累加）
    pub fn merge<I: IntoIterator<Item = Order>>(&mut self, orders: I) -> MergeStats {
        let mut stats = MergeStats::default();
        for order in orders {
            let key = order.key();
            match self.index.get(&key) {
                Some(&idx) => {
                    self.rows[idx].quantity = order.quantity;
                    stats.replaced += 1;
                }
                None => {
                    self.index.insert(key, self.rows.len());
                    self.rows.push(order);
                    stats.inserted += 1;
                }
            }
        }
        stats
    }

    /// 确保行存在（不存在时补 0 数量行）
    ///
    /// # 返回
    /// 是否新建
    pub fn ensure_row(&mut self, key: OrderKey) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.rows.len());
        self.rows
            .push(Order::new(key.customer_id, key.product_id, key.period, 0));
        true
    }

    /// 对指定行叠加增量，结果截断到 0
    ///
    /// # 返回
    /// 命中的行数
    pub fn apply_delta(&mut self, keys: &[OrderKey], delta: i64) -> usize {
        let mut matched = 0;
        for key in keys {
            if let Some(&idx) = self.index.get(key) {
                self.rows[idx].apply_delta(delta);
                matched += 1;
            }
        }
        matched
    }

    pub fn contains_period(&self, period: Period) -> bool {
        self.rows.iter().any(|o| o.period == period)
    }

    /// 客户号（首次出现顺序）
    pub fn customers(&self) -> Vec<CustomerId> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter(|o| seen.insert(o.customer_id))
            .map(|o| o.customer_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;

    fn p(month: u32) -> Period {
        Period::new(2020, month).unwrap()
    }

    fn order(c: u32, prod: u32, month: u32, q: u64) -> Order {
        Order::new(CustomerId(c), ProductId(prod), p(month), q)
    }

    #[test]
    fn test_merge_replaces_existing_triple() {
        let mut book = OrderBook::from_orders(vec![order(1, 10, 1, 5), order(2, 10, 1, 3)]);

        let stats = book.merge(vec![order(1, 10, 1, 9), order(1, 10, 2, 1)]);
        assert_eq!(stats, MergeStats { inserted: 1, replaced: 1 });
        assert_eq!(book.len(), 3);
        assert_eq!(book.quantity(&order(1, 10, 1, 0).key()), Some(9));
    }

    #[test]
    fn test_from_orders_last_write_wins() {
        let book = OrderBook::from_orders(vec![order(1, 10, 1, 5), order(1, 10, 1, 8)]);
        assert_eq!(book.len(), 1);
        assert_eq!(book.quantity(&order(1, 10, 1, 0).key()), Some(8));
    }

    #[test]
    fn test_ensure_row_and_apply_delta() {
        let mut book = OrderBook::new();
        let key = order(1, 10, 3, 0).key();

        assert!(book.ensure_row(key));
        assert!(!book.ensure_row(key));

        assert_eq!(book.apply_delta(&[key], 4), 1);
        assert_eq!(book.quantity(&key), Some(4));

        book.apply_delta(&[key], -10);
        assert_eq!(book.quantity(&key), Some(0));
    }

    #[test]
    fn test_listing_helpers() {
        let book = OrderBook::from_orders(vec![
            order(2, 11, 3, 1),
            order(1, 10, 1, 1),
            order(2, 10, 2, 1),
        ]);

        assert_eq!(book.customers(), vec![CustomerId(2), CustomerId(1)]);
        assert!(book.contains_period(p(2)));
        assert!(!book.contains_period(p(4)));
    }
}
