// ==========================================
// 铸造模具监控系统 - API层错误类型
// ==========================================
// 职责: 定义调用方可见的错误分类，转换导入层错误
// 分类: Selection / Format / DataIntegrity / Value
// ==========================================

use crate::config::ConfigError;
use crate::importer::error::ImportError;
use crate::importer::order_normalizer::EXPECTED_ORDER_LAYOUT;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 可恢复错误（展示层提示用户）
    // ==========================================
    /// 写操作缺少客户/产品选择
    #[error("请选择至少一个{0}")]
    Selection(String),

    /// 上传文件扩展名不支持或表结构无法解析（状态保持不变）
    #[error("文件格式错误: {message}。{expected_layout}")]
    Format {
        message: String,
        expected_layout: String,
    },

    /// 预期至少匹配一行的查找没有匹配
    #[error("数据完整性错误: {0}")]
    DataIntegrity(String),

    // ==========================================
    // 加载期致命错误
    // ==========================================
    /// 数值强制转换失败（非整数/负数）
    #[error("数值错误: {0}")]
    Value(String),

    #[error("配置错误: {0}")]
    Config(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 上传链路的错误一律视为格式错误
    pub fn format(err: ImportError) -> Self {
        ApiError::Format {
            message: err.to_string(),
            expected_layout: EXPECTED_ORDER_LAYOUT.to_string(),
        }
    }

    /// 是否可由调用方恢复（无需终止进程）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::Selection(_) | ApiError::Format { .. } | ApiError::DataIntegrity(_)
        )
    }
}

// ==========================================
// 从 ImportError 转换（加载链路）
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_value_error() {
            ApiError::Value(err.to_string())
        } else {
            ApiError::format(err)
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_conversion() {
        let err: ApiError = ImportError::TypeConversionError {
            row: 2,
            field: "Jan-19".to_string(),
            message: "不允许负数: -1".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Value(_)));
        assert!(!err.is_recoverable());

        let err: ApiError = ImportError::UnsupportedFormat("txt".to_string()).into();
        match &err {
            ApiError::Format { message, expected_layout } => {
                assert!(message.contains("txt"));
                assert!(expected_layout.contains("Produktnummer"));
            }
            other => panic!("Expected Format, got {:?}", other),
        }
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_selection_error_message() {
        let err = ApiError::Selection("客户".to_string());
        assert_eq!(err.to_string(), "请选择至少一个客户");
    }
}
