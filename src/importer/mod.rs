// ==========================================
// 铸造模具监控系统 - 导入层
// ==========================================
// 职责: 外部表格读取、字段映射、清洗、宽表归一化
// 支持: CSV, Excel (.xlsx/.xls), data URL 上传内容
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod order_importer;
pub mod order_normalizer;
pub mod reference_loader;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, StandardField};
pub use file_parser::{CsvParser, ExcelKind, ExcelParser, FileParser, RawTable, UniversalFileParser};
pub use order_importer::{decode_data_url, OrderImporter};
pub use order_normalizer::{NormalizedOrders, OrderNormalizer, EXPECTED_ORDER_LAYOUT};
pub use reference_loader::{LoadedData, ReferenceData, ReferenceLoader};
