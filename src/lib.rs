// ==========================================
// 铸造模具监控系统 - 核心库
// ==========================================
// 职责: 模具磨损跟踪、维护预测、订单聚合与订单导入
// 系统定位: 规划看板的数据引擎（展示层不在本库内）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部数据
pub mod importer;

// 引擎层 - 派生计算
pub mod engine;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - 共享状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CriticalityTier, CustomerId, Form, FormId, FormRequirement, Order, OrderRow, Period, ProductId,
};

// 引擎
pub use engine::{AttritionEngine, CriticalityClassifier, OrderBook, QueryCache};

// API
pub use api::{ApiError, ApiResult, ProductionDataApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "铸造模具监控系统";
