// ==========================================
// 铸造模具监控系统 - 配置层
// ==========================================
// 职责: 数据文件位置与维护等级阈值
// 存储: JSON 配置文件（可选）+ 环境变量覆写
// ==========================================

pub mod engine_config;

// 重导出核心配置
pub use engine_config::{
    default_config_path, ConfigError, EngineConfig, CONFIG_PATH_ENV, DATA_DIR_ENV,
};
