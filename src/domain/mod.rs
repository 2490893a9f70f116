// ==========================================
// 铸造模具监控系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含文件解析逻辑,不含引擎逻辑
// ==========================================

pub mod form;
pub mod order;
pub mod types;

// 重导出核心类型
pub use form::{Form, FormBudget, FormRequirement};
pub use order::{Order, OrderKey, OrderRow, MAX_ORDER_QUANTITY};
pub use types::{CriticalityTier, CustomerId, FormId, Period, ProductId};
