// ==========================================
// 铸造模具监控系统 - 订单时间序列聚合
// ==========================================
// 订单量: 按客户集合过滤 → (周期, 产品) 求和 → 按周期升序透视
// 铸造单元需求: 订单量 × 产品铸造单元系数
// 只保留当前周期及以后的周期
// ==========================================

use crate::domain::{CustomerId, Period, ProductId};
use crate::engine::order_book::OrderBook;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 单个周期行: 产品 → 值（无订单的产品不出现）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRow<T> {
    pub period: Period,
    pub values: BTreeMap<ProductId, T>,
}

/// 透视表: 每个产品一条序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable<T> {
    /// 过滤后出现过的产品（升序，含仅出现在历史周期的产品）
    pub products: Vec<ProductId>,
    /// 周期升序
    pub rows: Vec<PeriodRow<T>>,
}

impl<T> Default for TimeSeriesTable<T> {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<T: Copy> TimeSeriesTable<T> {
    pub fn value(&self, period: Period, product: ProductId) -> Option<T> {
        self.rows
            .iter()
            .find(|r| r.period == period)
            .and_then(|r| r.values.get(&product).copied())
    }

    pub fn periods(&self) -> Vec<Period> {
        self.rows.iter().map(|r| r.period).collect()
    }
}

pub type OrdersOverTime = TimeSeriesTable<u64>;
pub type CastingDemandOverTime = TimeSeriesTable<f64>;

/// 按客户集合汇总订单量
pub fn orders_over_time(
    book: &OrderBook,
    customers: &BTreeSet<CustomerId>,
    from: Period,
) -> OrdersOverTime {
    let mut products = BTreeSet::new();
    let mut grid: BTreeMap<Period, BTreeMap<ProductId, u64>> = BTreeMap::new();

    for order in book.iter().filter(|o| customers.contains(&o.customer_id)) {
        products.insert(order.product_id);
        if order.period < from {
            continue;
        }
        let total = grid
            .entry(order.period)
            .or_default()
            .entry(order.product_id)
            .or_insert(0);
        *total = total.saturating_add(order.quantity);
    }

    TimeSeriesTable {
        products: products.into_iter().collect(),
        rows: grid
            .into_iter()
            .map(|(period, values)| PeriodRow { period, values })
            .collect(),
    }
}

/// 订单量加权为铸造单元需求（无需求矩阵的产品系数为 0）
pub fn casting_cell_demand(
    orders: &OrdersOverTime,
    cost_by_product: &HashMap<ProductId, f64>,
) -> CastingDemandOverTime {
    TimeSeriesTable {
        products: orders.products.clone(),
        rows: orders
            .rows
            .iter()
            .map(|row| PeriodRow {
                period: row.period,
                values: row
                    .values
                    .iter()
                    .map(|(product, qty)| {
                        let factor = cost_by_product.get(product).copied().unwrap_or(0.0);
                        (*product, *qty as f64 * factor)
                    })
                    .collect(),
            })
            .collect(),
    }
}
