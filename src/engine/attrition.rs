// ==========================================
// 铸造模具监控系统 - 磨损派生特征引擎
// ==========================================
// 职责: 由订单簿整体重算全部派生聚合（无增量）
// 输入: 参考数据 + 订单簿 + 当前周期
// 输出: 产品磨损系数 / 模具逐月磨损 / 下次维护周期
// ==========================================

use crate::domain::{Form, FormBudget, FormId, Order, Period, ProductId};
use crate::engine::order_book::OrderBook;
use crate::importer::ReferenceData;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

// ==========================================
// FormAttritionTable - 模具逐月磨损表
// ==========================================
// wear[period_idx][form_idx]，列序与模具表一致
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAttritionTable {
    pub forms: Vec<FormId>,
    pub periods: Vec<Period>, // 升序
    pub wear: Vec<Vec<u64>>,
}

impl FormAttritionTable {
    /// 单个模具的时间序列
    pub fn series(&self, form_idx: usize) -> Vec<(Period, u64)> {
        self.periods
            .iter()
            .zip(self.wear.iter())
            .map(|(period, row)| (*period, row.get(form_idx).copied().unwrap_or(0)))
            .collect()
    }

    /// 从指定周期起的行位置
    pub fn horizon_start(&self, from: Period) -> usize {
        self.periods.partition_point(|p| *p < from)
    }
}

// ==========================================
// DerivedFeatures - 派生聚合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// 每单位产品造成的磨损总量（需求次数之和）
    pub attrition_by_product: HashMap<ProductId, u64>,
    /// 每单位产品的铸造单元需求（Σ 需求次数 × 模具系数）
    pub casting_cost_by_product: HashMap<ProductId, f64>,
    pub form_attrition: FormAttritionTable,
    /// 下次维护周期（与模具表同序；无前瞻周期时为 None）
    pub next_maintenance: Vec<Option<Period>>,
    /// 计算所依据的当前周期
    pub computed_for: Option<Period>,
}

impl DerivedFeatures {
    /// 订单行的磨损总量（数量 × 产品磨损系数）
    pub fn order_attrition(&self, order: &Order) -> u64 {
        let per_unit = self
            .attrition_by_product
            .get(&order.product_id)
            .copied()
            .unwrap_or(0);
        order.quantity.saturating_mul(per_unit)
    }
}

// ==========================================
// AttritionEngine
// ==========================================
/// 无状态引擎：每次写入后整体重算
pub struct AttritionEngine;

impl AttritionEngine {
    /// 重算全部派生聚合（唯一入口）
    #[instrument(skip(self, reference, book), fields(orders = book.len(), forms = reference.forms.len()))]
    pub fn compute(
        &self,
        reference: &ReferenceData,
        book: &OrderBook,
        current: Period,
    ) -> DerivedFeatures {
        let form_index: HashMap<&FormId, usize> = reference
            .forms
            .iter()
            .enumerate()
            .map(|(idx, f)| (&f.form_id, idx))
            .collect();

        // 1. 产品 → [(模具位置, 每单位需求次数)]
        let mut product_forms: HashMap<ProductId, Vec<(usize, u64)>> = HashMap::new();
        let mut attrition_by_product: HashMap<ProductId, u64> = HashMap::new();
        let mut casting_cost_by_product: HashMap<ProductId, f64> = HashMap::new();
        for product in &reference.products {
            attrition_by_product.insert(*product, 0);
            casting_cost_by_product.insert(*product, 0.0);
        }
        for req in &reference.requirements {
            let Some(&form_idx) = form_index.get(&req.form_id) else {
                continue;
            };
            let per_unit = req.casts_per_unit as u64;
            product_forms
                .entry(req.product_id)
                .or_default()
                .push((form_idx, per_unit));
            *attrition_by_product.entry(req.product_id).or_insert(0) += per_unit;
            *casting_cost_by_product.entry(req.product_id).or_insert(0.0) +=
                req.casts_per_unit as f64 * reference.forms[form_idx].cost_factor;
        }

        // 2. 模具逐月磨损（Σ 数量 × 需求次数）
        let form_attrition = self.form_attrition_over_time(&reference.forms, book, &product_forms);

        // 3. 下次维护周期
        let next_maintenance = reference
            .forms
            .iter()
            .enumerate()
            .map(|(idx, form)| self.next_maintenance_period(form, idx, &form_attrition, current))
            .collect();

        tracing::debug!(
            periods = form_attrition.periods.len(),
            current = %current,
            "派生特征重算完成"
        );

        DerivedFeatures {
            attrition_by_product,
            casting_cost_by_product,
            form_attrition,
            next_maintenance,
            computed_for: Some(current),
        }
    }

    fn form_attrition_over_time(
        &self,
        forms: &[Form],
        book: &OrderBook,
        product_forms: &HashMap<ProductId, Vec<(usize, u64)>>,
    ) -> FormAttritionTable {
        let mut by_period: BTreeMap<Period, Vec<u64>> = BTreeMap::new();
        for order in book.iter() {
            let row = by_period
                .entry(order.period)
                .or_insert_with(|| vec![0; forms.len()]);
            if let Some(reqs) = product_forms.get(&order.product_id) {
                for (form_idx, per_unit) in reqs {
                    row[*form_idx] =
                        row[*form_idx].saturating_add(order.quantity.saturating_mul(*per_unit));
                }
            }
        }

        let (periods, wear) = by_period.into_iter().unzip();
        FormAttritionTable {
            forms: forms.iter().map(|f| f.form_id.clone()).collect(),
            periods,
            wear,
        }
    }

    /// 下次维护周期
    ///
    /// # 规则
    /// 1. 前瞻区间: 当前周期起至已知最后周期
    /// 2. 逐月累加磨损，统计累计磨损仍严格低于剩余次数的周期数 k
    /// 3. 取前瞻区间第 min(k, len-1) 个周期（从未越过阈值时落在最后周期）
    pub fn next_maintenance_period(
        &self,
        form: &Form,
        form_idx: usize,
        table: &FormAttritionTable,
        current: Period,
    ) -> Option<Period> {
        let start = table.horizon_start(current);
        let horizon = &table.periods[start..];
        if horizon.is_empty() {
            return None;
        }

        let budget = form.remaining_casts();
        let mut cumulative: u64 = 0;
        let mut below_budget = 0usize;
        for row in &table.wear[start..] {
            cumulative = cumulative.saturating_add(row.get(form_idx).copied().unwrap_or(0));
            if cumulative < budget {
                below_budget += 1;
            }
        }

        Some(horizon[below_budget.min(horizon.len() - 1)])
    }
}
