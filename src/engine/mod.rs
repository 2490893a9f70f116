// ==========================================
// 铸造模具监控系统 - 引擎层
// ==========================================
// 职责: 订单簿、派生特征重算、临界等级、时间序列聚合、查询缓存
// 红线: 引擎不做文件解析；派生聚合只能整体重算
// ==========================================

pub mod aggregation;
pub mod attrition;
pub mod clock;
pub mod criticality;
pub mod order_book;
pub mod query_cache;

// 重导出核心引擎
pub use aggregation::{
    casting_cell_demand, orders_over_time, CastingDemandOverTime, OrdersOverTime, PeriodRow,
    TimeSeriesTable,
};
pub use attrition::{AttritionEngine, DerivedFeatures, FormAttritionTable};
pub use clock::{Clock, FixedClock, SystemClock};
pub use criticality::{months_until, CriticalityClassifier, DAYS_PER_MONTH};
pub use order_book::{MergeStats, OrderBook};
pub use query_cache::{CacheKey, CacheStats, QueryCache};
