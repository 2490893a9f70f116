// ==========================================
// 铸造模具监控系统 - 引擎配置
// ==========================================
// 来源优先级: 显式路径 → 环境变量 CASTING_FORM_CONFIG
//            → 用户配置目录/casting-form-monitor/config.json → 默认值
// 覆写: CASTING_FORM_DATA_DIR 覆盖数据目录
// ==========================================

use crate::engine::CriticalityClassifier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "CASTING_FORM_CONFIG";
pub const DATA_DIR_ENV: &str = "CASTING_FORM_DATA_DIR";
const APP_DIR_NAME: &str = "casting-form-monitor";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Read { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("配置值无效 ({key}): {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// EngineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 参考数据目录
    pub data_dir: PathBuf,

    /// 模具表文件名（相对 data_dir）
    pub forms_file: String,

    /// 产品-模具需求矩阵文件名
    pub requirements_file: String,

    /// 历史订单宽表（按年，按顺序拼接）
    pub order_files: Vec<String>,

    /// 即将维护列表默认条数
    pub upcoming_limit: usize,

    /// 红色等级阈值（月）
    pub critical_months: f64,

    /// 黄色等级阈值（月）
    pub warning_months: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            forms_file: "formen_und_giesszellenbedarf_2019.csv".to_string(),
            requirements_file: "zuweisung_produkte_und_formen.csv".to_string(),
            order_files: vec![
                "bestellungen_2019.csv".to_string(),
                "bestellungen_2020.csv".to_string(),
            ],
            upcoming_limit: 6,
            critical_months: 3.0,
            warning_months: 6.0,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 文件加载（缺省字段取默认值）
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: EngineConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 按优先级解析配置
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(explicit) {
            Some(path) => {
                tracing::info!(path = %path.display(), "加载配置文件");
                Self::from_file(&path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                config.data_dir = PathBuf::from(trimmed);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验阈值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.critical_months.is_finite() && self.critical_months > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "critical_months".to_string(),
                message: format!("必须为正数，实际 {}", self.critical_months),
            });
        }
        if !(self.warning_months.is_finite() && self.warning_months >= self.critical_months) {
            return Err(ConfigError::InvalidValue {
                key: "warning_months".to_string(),
                message: format!(
                    "必须不小于 critical_months ({})，实际 {}",
                    self.critical_months, self.warning_months
                ),
            });
        }
        Ok(())
    }

    pub fn forms_path(&self) -> PathBuf {
        self.data_dir.join(&self.forms_file)
    }

    pub fn requirements_path(&self) -> PathBuf {
        self.data_dir.join(&self.requirements_file)
    }

    pub fn order_paths(&self) -> Vec<PathBuf> {
        self.order_files
            .iter()
            .map(|f| self.data_dir.join(f))
            .collect()
    }

    pub fn classifier(&self) -> CriticalityClassifier {
        CriticalityClassifier::new(self.critical_months, self.warning_months)
    }
}

/// 获取默认配置文件路径（用户配置目录）
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    default_config_path().filter(|p| p.exists())
}
