// ==========================================
// 铸造模具监控系统 - API 层
// ==========================================
// 职责: 对展示层提供查询与写入接口
// ==========================================

pub mod error;
pub mod production_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use production_api::{FormStatus, IngestReport, ProductionDataApi, UpdateReport};
