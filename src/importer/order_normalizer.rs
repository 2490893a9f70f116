// ==========================================
// 铸造模具监控系统 - 订单宽表归一化
// ==========================================
// 输入: 宽表（客户, 产品, 每月一列, 合计列）
// 输出: 长表订单行 (客户, 产品, 周期, 数量)
// 顺序: 按源表行序，行内按列序展开
// ==========================================

use crate::domain::{CustomerId, Order, Period, ProductId};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::RawTable;
use serde::{Deserialize, Serialize};

/// 期望的订单表布局（用于错误提示）
pub const EXPECTED_ORDER_LAYOUT: &str =
    "期望列布局: Kunde, Produktnummer, <Mon-YY>..., Gesamt（每月一列，数值为非负整数）";

/// 归一化结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrders {
    pub orders: Vec<Order>,
    pub rows_read: usize,    // 源表数据行数
    pub rows_dropped: usize, // 因缺失值丢弃的行数
}

pub struct OrderNormalizer {
    cleaner: DataCleaner,
    mapper: FieldMapper,
}

impl Default for OrderNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderNormalizer {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
            mapper: FieldMapper,
        }
    }

    /// 宽表 → 长表
    ///
    /// # 规则
    /// 1. 含缺失值的行整行丢弃（含合计列）
    /// 2. 全部单元格强制转换为非负整数
    /// 3. 前两列为客户号/产品号，合计列丢弃，其余列头解析为周期
    pub fn normalize(&self, table: RawTable, table_name: &str) -> ImportResult<NormalizedOrders> {
        if table.column_count() < 3 {
            return Err(ImportError::MalformedTable {
                table: table_name.to_string(),
                message: format!(
                    "列数不足（{} 列）。{}",
                    table.column_count(),
                    EXPECTED_ORDER_LAYOUT
                ),
            });
        }

        // 1. 解析周期列（前两列之后、非合计列）
        let mut period_columns: Vec<(usize, Period)> = Vec::new();
        for (idx, header) in table.headers.iter().enumerate().skip(2) {
            if self.mapper.is_total_column(header) {
                continue;
            }
            let period = Period::parse(header).ok_or_else(|| ImportError::InvalidPeriodLabel {
                label: header.clone(),
            })?;
            if period_columns.iter().any(|(_, p)| *p == period) {
                return Err(ImportError::MalformedTable {
                    table: table_name.to_string(),
                    message: format!("周期列重复: {}", header),
                });
            }
            period_columns.push((idx, period));
        }

        if period_columns.is_empty() {
            return Err(ImportError::MalformedTable {
                table: table_name.to_string(),
                message: format!("未找到周期列。{}", EXPECTED_ORDER_LAYOUT),
            });
        }

        // 2. 丢弃不完整行
        let rows_read = table.row_count();
        let (table, rows_dropped) = self.cleaner.drop_incomplete_rows(table);
        if rows_dropped > 0 {
            tracing::warn!(
                table = table_name,
                rows_dropped,
                "订单表存在缺失值，已丢弃对应行"
            );
        }

        // 3. 强制转换 + 展开
        let mut orders = Vec::with_capacity(table.row_count() * period_columns.len());
        for (row_idx, row) in table.rows.iter().enumerate() {
            // 行号按 1 起始（不含表头）
            let row_number = row_idx + 1;

            let customer_id =
                CustomerId(self.cleaner.parse_u32(&row[0], row_number, &table.headers[0])?);
            let product_id =
                ProductId(self.cleaner.parse_u32(&row[1], row_number, &table.headers[1])?);

            // 合计列同样须满足非负整数
            for (idx, header) in table.headers.iter().enumerate().skip(2) {
                if self.mapper.is_total_column(header) {
                    self.cleaner
                        .parse_non_negative_int(&row[idx], row_number, header)?;
                }
            }

            for (idx, period) in &period_columns {
                let quantity = self.cleaner.parse_quantity(
                    &row[*idx],
                    row_number,
                    &table.headers[*idx],
                )?;
                orders.push(Order::new(customer_id, product_id, *period, quantity));
            }
        }

        tracing::debug!(
            table = table_name,
            rows_read,
            rows_dropped,
            orders = orders.len(),
            "订单宽表归一化完成"
        );

        Ok(NormalizedOrders {
            orders,
            rows_read,
            rows_dropped,
        })
    }
}
