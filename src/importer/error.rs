// ==========================================
// 铸造模具监控系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 结构/格式错误 与 数值转换错误 分开，供 API 层映射
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv/.xlsx/.xls）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("文件编码错误: {0}（CSV 需为 UTF-8）")]
    EncodingError(String),

    #[error("上传内容解码失败: {0}")]
    PayloadDecodeError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("表 {table} 缺少列: {column}")]
    MissingColumn { table: String, column: String },

    #[error("表结构错误 ({table}): {message}")]
    MalformedTable { table: String, message: String },

    #[error("无法识别的周期列头: {label}（期望 Mon-YY，如 Jan-19）")]
    InvalidPeriodLabel { label: String },

    // ===== 数值/数据质量错误 =====
    #[error("类型转换失败 (行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("数据质量错误 (行 {row}): {message}")]
    DataQualityError { row: usize, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为数值转换类错误（加载期视为致命的 Value 错误）
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            ImportError::TypeConversionError { .. } | ImportError::DataQualityError { .. }
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<base64::DecodeError>
impl From<base64::DecodeError> for ImportError {
    fn from(err: base64::DecodeError) -> Self {
        ImportError::PayloadDecodeError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
