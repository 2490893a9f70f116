// ==========================================
// 铸造模具监控系统 - 生产数据 API
// ==========================================
// 职责: 持有全部表格状态（参考数据 + 订单簿 + 派生聚合 + 查询缓存），
//       对展示层提供查询/写入接口
// 一致性: 写入在返回前完成整体重算与缓存清空，之后的查询必然可见
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::{
    CriticalityTier, CustomerId, Form, FormBudget, FormId, OrderKey, OrderRow, Period, ProductId,
};
use crate::engine::{
    aggregation, AttritionEngine, CacheKey, CacheStats, CastingDemandOverTime, Clock,
    CriticalityClassifier, DerivedFeatures, OrderBook, OrdersOverTime, QueryCache,
};
use crate::importer::{LoadedData, NormalizedOrders, OrderImporter, ReferenceData, ReferenceLoader};
use crate::perf::PerfGuard;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;
use uuid::Uuid;

// ==========================================
// 响应类型
// ==========================================

/// 模具状态视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormStatus {
    pub form_id: FormId,
    pub cost_factor: f64,
    pub max_casts: u64,
    pub used_casts: u64,
    pub remaining_casts: u64,
    pub relative_attrition: f64,
    pub next_maintenance: Option<Period>,
    pub criticality: Option<CriticalityTier>,
}

/// 手工调整结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub rows_created: usize, // 补建的 0 数量行
    pub rows_updated: usize, // 叠加增量的行
}

/// 上传导入结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub batch_id: Uuid,
    pub filename: String,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub orders_parsed: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// ProductionDataApi
// ==========================================
pub struct ProductionDataApi {
    reference: ReferenceData,
    book: OrderBook,
    derived: DerivedFeatures,
    orders_cache: Mutex<QueryCache<OrdersOverTime>>,
    clock: Arc<dyn Clock>,
    classifier: CriticalityClassifier,
    attrition_engine: AttritionEngine,
    importer: OrderImporter,
}

impl ProductionDataApi {
    /// 由已加载数据构造（立即完成一次派生特征计算）
    pub fn new(data: LoadedData, clock: Arc<dyn Clock>, classifier: CriticalityClassifier) -> Self {
        let mut api = Self {
            reference: data.reference,
            book: OrderBook::from_orders(data.orders),
            derived: DerivedFeatures::default(),
            orders_cache: Mutex::new(QueryCache::new()),
            clock,
            classifier,
            attrition_engine: AttritionEngine,
            importer: OrderImporter::new(),
        };
        api.recalculate();
        api
    }

    /// 按配置从数据目录加载
    ///
    /// 加载期任何错误均为致命（无法构造有效状态）
    pub fn from_config(config: &EngineConfig, clock: Arc<dyn Clock>) -> ApiResult<Self> {
        let _perf = PerfGuard::new("load_reference_data");
        config.validate()?;
        let data = ReferenceLoader::new().load_from_paths(
            &config.forms_path(),
            &config.requirements_path(),
            &config.order_paths(),
        )?;
        Ok(Self::new(data, clock, config.classifier()))
    }

    // ==========================================
    // 时钟
    // ==========================================

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn current_period(&self) -> Period {
        Period::from_date(self.today())
    }

    /// 派生聚合是否基于过期的当前周期（跨月后需重算）
    pub fn is_stale(&self) -> bool {
        self.derived.computed_for != Some(self.current_period())
    }

    // ==========================================
    // 派生特征重算
    // ==========================================

    /// 整体重算派生聚合并清空查询缓存
    #[instrument(skip(self), fields(orders = self.book.len()))]
    pub fn recalculate(&mut self) {
        let _perf = PerfGuard::new("recalculate");
        let current = self.current_period();
        self.derived = self
            .attrition_engine
            .compute(&self.reference, &self.book, current);
        self.invalidate_cache();
    }

    fn invalidate_cache(&mut self) {
        match self.orders_cache.get_mut() {
            Ok(cache) => cache.invalidate(),
            Err(poisoned) => poisoned.into_inner().invalidate(),
        }
    }

    fn lock_cache(&self) -> ApiResult<MutexGuard<'_, QueryCache<OrdersOverTime>>> {
        self.orders_cache
            .lock()
            .map_err(|e| ApiError::Internal(format!("缓存锁获取失败: {}", e)))
    }

    // ==========================================
    // 列表查询
    // ==========================================

    /// 模具号（源表顺序）
    pub fn list_forms(&self) -> Vec<FormId> {
        self.reference
            .forms
            .iter()
            .map(|f| f.form_id.clone())
            .collect()
    }

    /// 产品号（需求矩阵中的产品，升序）
    pub fn list_products(&self) -> Vec<ProductId> {
        let products: BTreeSet<ProductId> = self.reference.products.iter().copied().collect();
        products.into_iter().collect()
    }

    /// 客户号（订单首次出现顺序）
    pub fn list_customers(&self) -> Vec<CustomerId> {
        self.book.customers()
    }

    // ==========================================
    // 模具磨损与维护
    // ==========================================

    fn find_form(&self, form_id: &FormId) -> ApiResult<(usize, &Form)> {
        self.reference
            .forms
            .iter()
            .enumerate()
            .find(|(_, f)| &f.form_id == form_id)
            .ok_or_else(|| ApiError::DataIntegrity(format!("模具 {} 不存在", form_id)))
    }

    /// 相对剩余寿命 (max - used) / max
    pub fn relative_attrition(&self, form_id: &FormId) -> ApiResult<f64> {
        let (_, form) = self.find_form(form_id)?;
        Ok(form.relative_attrition())
    }

    /// 全部模具相对剩余寿命均值（无模具时为 0）
    pub fn average_relative_attrition(&self) -> f64 {
        let forms = &self.reference.forms;
        if forms.is_empty() {
            return 0.0;
        }
        forms.iter().map(|f| f.relative_attrition()).sum::<f64>() / forms.len() as f64
    }

    /// 下次维护周期
    pub fn next_maintenance(&self, form_id: &FormId) -> ApiResult<Period> {
        let (idx, _) = self.find_form(form_id)?;
        self.derived
            .next_maintenance
            .get(idx)
            .copied()
            .flatten()
            .ok_or_else(|| {
                ApiError::DataIntegrity(format!(
                    "模具 {} 无前瞻订单周期（当前周期 {} 之后无订单），无法预测维护",
                    form_id,
                    self.current_period()
                ))
            })
    }

    /// 即将到来的维护（按周期升序，同周期保持模具表顺序）
    pub fn upcoming_maintenances(&self, limit: usize) -> Vec<(FormId, Period)> {
        let mut upcoming: Vec<(FormId, Period)> = self
            .reference
            .forms
            .iter()
            .zip(self.derived.next_maintenance.iter())
            .filter_map(|(form, period)| period.map(|p| (form.form_id.clone(), p)))
            .collect();
        upcoming.sort_by_key(|(_, period)| *period);
        upcoming.truncate(limit);
        upcoming
    }

    /// 临界等级
    pub fn criticality_tier(&self, form_id: &FormId) -> ApiResult<CriticalityTier> {
        let maintenance = self.next_maintenance(form_id)?;
        Ok(self.classifier.classify(maintenance, self.today()))
    }

    /// 模具状态视图
    pub fn form_status(&self, form_id: &FormId) -> ApiResult<FormStatus> {
        let (idx, form) = self.find_form(form_id)?;
        let next_maintenance = self.derived.next_maintenance.get(idx).copied().flatten();
        Ok(FormStatus {
            form_id: form.form_id.clone(),
            cost_factor: form.cost_factor,
            max_casts: form.max_casts,
            used_casts: form.used_casts,
            remaining_casts: form.remaining_casts(),
            relative_attrition: form.relative_attrition(),
            next_maintenance,
            criticality: next_maintenance.map(|p| self.classifier.classify(p, self.today())),
        })
    }

    /// 模具逐月磨损序列（全部已知周期）
    pub fn form_attrition_over_time(&self, form_id: &FormId) -> ApiResult<Vec<(Period, u64)>> {
        let (idx, _) = self.find_form(form_id)?;
        Ok(self.derived.form_attrition.series(idx))
    }

    // ==========================================
    // 时间序列查询（带缓存）
    // ==========================================

    /// 按客户集合汇总订单量（当前周期起）
    pub fn orders_over_time(&self, customers: &[CustomerId]) -> ApiResult<Arc<OrdersOverTime>> {
        let today = self.today();
        let key = CacheKey {
            day: today,
            customers: customers.iter().copied().collect(),
        };
        let from = Period::from_date(today);

        let mut cache = self.lock_cache()?;
        Ok(cache.get_or_compute(key.clone(), || {
            tracing::debug!(customers = key.customers.len(), from = %from, "订单时间序列缓存未命中");
            aggregation::orders_over_time(&self.book, &key.customers, from)
        }))
    }

    /// 按客户集合汇总铸造单元需求
    pub fn casting_cell_demand_over_time(
        &self,
        customers: &[CustomerId],
    ) -> ApiResult<CastingDemandOverTime> {
        let orders = self.orders_over_time(customers)?;
        Ok(aggregation::casting_cell_demand(
            &orders,
            &self.derived.casting_cost_by_product,
        ))
    }

    pub fn cache_stats(&self) -> ApiResult<CacheStats> {
        Ok(self.lock_cache()?.stats())
    }

    // ==========================================
    // 表格展示
    // ==========================================

    /// 订单明细（过滤条件为空表示不过滤）
    pub fn filtered_order_rows(
        &self,
        customers: Option<&[CustomerId]>,
        products: Option<&[ProductId]>,
        period: Option<Period>,
    ) -> Vec<OrderRow> {
        let customers = customers.filter(|c| !c.is_empty());
        let products = products.filter(|p| !p.is_empty());

        self.book
            .iter()
            .filter(|o| customers.map_or(true, |c| c.contains(&o.customer_id)))
            .filter(|o| products.map_or(true, |p| p.contains(&o.product_id)))
            .filter(|o| period.map_or(true, |p| o.period == p))
            .map(|o| OrderRow {
                customer_id: o.customer_id,
                product_id: o.product_id,
                period: o.period,
                quantity: o.quantity,
                total_attrition: self.derived.order_attrition(o),
            })
            .collect()
    }

    // ==========================================
    // 写入: 手工调整
    // ==========================================

    /// 对 (客户 × 产品 × 周期) 叠加带符号增量
    ///
    /// # 规则
    /// 1. 客户、产品均至少选择一个，否则 Selection 错误且状态不变
    /// 2. 缺失的行先补 0 数量行，保证增量落在已有行上
    /// 3. 叠加后数量截断到 0
    /// 4. 整体重算派生聚合，清空缓存
    #[instrument(skip(self, customers, products, period), fields(customers = customers.len(), products = products.len(), period = %period))]
    pub fn update_orders(
        &mut self,
        customers: &[CustomerId],
        products: &[ProductId],
        period: Period,
        delta: i64,
    ) -> ApiResult<UpdateReport> {
        if customers.is_empty() {
            return Err(ApiError::Selection("客户".to_string()));
        }
        if products.is_empty() {
            return Err(ApiError::Selection("产品".to_string()));
        }

        let customers: BTreeSet<CustomerId> = customers.iter().copied().collect();
        let products: BTreeSet<ProductId> = products.iter().copied().collect();

        if !self.book.contains_period(period) {
            tracing::info!(period = %period, "新增订单周期");
        }

        let keys: Vec<OrderKey> = customers
            .iter()
            .flat_map(|c| {
                products.iter().map(move |p| OrderKey {
                    customer_id: *c,
                    product_id: *p,
                    period,
                })
            })
            .collect();

        let rows_created = keys.iter().filter(|k| self.book.ensure_row(**k)).count();
        let rows_updated = self.book.apply_delta(&keys, delta);

        tracing::info!(rows_created, rows_updated, delta, "订单手工调整完成");

        self.recalculate();
        Ok(UpdateReport {
            rows_created,
            rows_updated,
        })
    }

    // ==========================================
    // 写入: 文件上传
    // ==========================================

    /// 上传订单宽表（.csv / .xlsx / .xls）
    ///
    /// 先完整解析，成功后整体合并（已存在的三元组以上传值替换）；
    /// 任一错误均返回 Format 且不改变状态
    pub fn ingest_file(&mut self, bytes: &[u8], filename: &str) -> ApiResult<IngestReport> {
        let perf = PerfGuard::new("ingest_file");
        let parsed = self
            .importer
            .parse_upload(bytes, filename)
            .map_err(|e| self.reject_upload(filename, e))?;
        Ok(self.merge_upload(parsed, filename, perf.elapsed_ms()))
    }

    /// 上传浏览器 data URL 内容
    pub fn ingest_data_url(&mut self, contents: &str, filename: &str) -> ApiResult<IngestReport> {
        let perf = PerfGuard::new("ingest_data_url");
        let parsed = self
            .importer
            .parse_data_url(contents, filename)
            .map_err(|e| self.reject_upload(filename, e))?;
        Ok(self.merge_upload(parsed, filename, perf.elapsed_ms()))
    }

    fn reject_upload(&self, filename: &str, err: crate::importer::ImportError) -> ApiError {
        tracing::warn!(filename, error = %err, "上传文件被拒绝，订单状态未改变");
        ApiError::format(err)
    }

    fn merge_upload(
        &mut self,
        parsed: NormalizedOrders,
        filename: &str,
        parse_ms: u64,
    ) -> IngestReport {
        let orders_parsed = parsed.orders.len();
        let stats = self.book.merge(parsed.orders);
        self.recalculate();

        let report = IngestReport {
            batch_id: Uuid::new_v4(),
            filename: filename.to_string(),
            rows_read: parsed.rows_read,
            rows_dropped: parsed.rows_dropped,
            orders_parsed,
            inserted: stats.inserted,
            replaced: stats.replaced,
            elapsed_ms: parse_ms,
        };

        tracing::info!(
            batch_id = %report.batch_id,
            filename,
            inserted = report.inserted,
            replaced = report.replaced,
            rows_dropped = report.rows_dropped,
            "订单上传合并完成"
        );
        report
    }
}
