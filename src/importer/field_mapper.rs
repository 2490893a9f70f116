// ==========================================
// 铸造模具监控系统 - 字段映射器实现
// ==========================================
// 职责: 源列名（含别名）→ 标准字段的列位置
// 源数据列头为德文，同时兼容英文别名
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTable;

/// 标准字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardField {
    FormId,
    CostFactor,
    MaxCasts,
    UsedCasts,
    ProductId,
    CustomerId,
}

impl StandardField {
    /// 标准列名（用于错误提示）
    pub fn canonical_name(self) -> &'static str {
        match self {
            StandardField::FormId => "Form",
            StandardField::CostFactor => "Gießzellenbedarf",
            StandardField::MaxCasts => "Anzahl maximaler Gießvorgänge",
            StandardField::UsedCasts => "Anzahl bisheriger Gießvorgänge",
            StandardField::ProductId => "Produktnummer",
            StandardField::CustomerId => "Kunde",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            StandardField::FormId => &["Form", "form", "form_id"],
            StandardField::CostFactor => &[
                "Gießzellenbedarf",
                "Giesszellenbedarf",
                "cost_factor",
                "casting_cell_demand",
            ],
            StandardField::MaxCasts => &[
                "Anzahl maximaler Gießvorgänge",
                "Anzahl maximaler Giessvorgaenge",
                "max_casts",
            ],
            StandardField::UsedCasts => &[
                "Anzahl bisheriger Gießvorgänge",
                "Anzahl bisheriger Giessvorgaenge",
                "used_casts",
            ],
            StandardField::ProductId => &["Produktnummer", "Produkt", "product", "product_id"],
            StandardField::CustomerId => &["Kunde", "customer", "customer_id"],
        }
    }
}

/// 合计列名（宽表尾列，归一化时丢弃）
const TOTAL_COLUMN_ALIASES: &[&str] = &["gesamt", "total", "summe", "sum"];

pub struct FieldMapper;

impl FieldMapper {
    /// 查找字段列位置（大小写不敏感）
    pub fn find_column(&self, headers: &[String], field: StandardField) -> Option<usize> {
        field.aliases().iter().find_map(|alias| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    /// 查找字段列位置，缺失时报错
    pub fn require_column(
        &self,
        table: &RawTable,
        table_name: &str,
        field: StandardField,
    ) -> ImportResult<usize> {
        self.find_column(&table.headers, field)
            .ok_or_else(|| ImportError::MissingColumn {
                table: table_name.to_string(),
                column: field.canonical_name().to_string(),
            })
    }

    /// 是否为合计列
    pub fn is_total_column(&self, header: &str) -> bool {
        let lowered = header.trim().to_lowercase();
        TOTAL_COLUMN_ALIASES.contains(&lowered.as_str())
    }
}
