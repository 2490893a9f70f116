// ==========================================
// 铸造模具监控系统 - 应用层
// ==========================================
// 职责: 进程级共享状态，连接展示层与 API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
