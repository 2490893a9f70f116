// ==========================================
// 铸造模具监控系统 - 数据清洗器实现
// ==========================================
// 职责: 缺失值识别 / 丢弃不完整行 / 非负整数强制转换
// 策略: 缺失值所在行直接丢弃（不修补）；数值非法直接报错
// ==========================================

use crate::domain::MAX_ORDER_QUANTITY;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawTable;

pub struct DataCleaner;

impl DataCleaner {
    /// 是否为缺失值（空串 / NaN / NA / null）
    pub fn is_missing(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || matches!(
                trimmed.to_lowercase().as_str(),
                "nan" | "na" | "n/a" | "null" | "none" | "#n/a"
            )
    }

    /// 丢弃含缺失值的行
    ///
    /// # 返回
    /// (清洗后的表, 丢弃行数)
    pub fn drop_incomplete_rows(&self, table: RawTable) -> (RawTable, usize) {
        let before = table.rows.len();
        let rows: Vec<Vec<String>> = table
            .rows
            .into_iter()
            .filter(|row| !row.iter().any(|v| self.is_missing(v)))
            .collect();
        let dropped = before - rows.len();

        (
            RawTable {
                headers: table.headers,
                rows,
            },
            dropped,
        )
    }

    /// 强制转换为非负整数
    ///
    /// 允许整数值浮点（如 "3.0"，电子表格单元格常见），
    /// 小数、负数、非数字一律报错
    pub fn parse_non_negative_int(&self, value: &str, row: usize, field: &str) -> ImportResult<u64> {
        let trimmed = value.trim();

        if let Ok(v) = trimmed.parse::<u64>() {
            return Ok(v);
        }

        let conversion_error = |message: String| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message,
        };

        let parsed = trimmed
            .parse::<f64>()
            .map_err(|_| conversion_error(format!("无法解析为非负整数: {}", trimmed)))?;

        if !parsed.is_finite() {
            return Err(conversion_error(format!("非有限数值: {}", trimmed)));
        }
        if parsed < 0.0 {
            return Err(conversion_error(format!("不允许负数: {}", trimmed)));
        }
        if parsed.fract() != 0.0 {
            return Err(conversion_error(format!("不允许小数: {}", trimmed)));
        }
        if parsed > u64::MAX as f64 {
            return Err(conversion_error(format!("数值溢出: {}", trimmed)));
        }

        Ok(parsed as u64)
    }

    /// 强制转换为订货量（非负整数，不超过 MAX_ORDER_QUANTITY）
    pub fn parse_quantity(&self, value: &str, row: usize, field: &str) -> ImportResult<u64> {
        let v = self.parse_non_negative_int(value, row, field)?;
        if v > MAX_ORDER_QUANTITY {
            return Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("订货量超出上限 {}: {}", MAX_ORDER_QUANTITY, v),
            });
        }
        Ok(v)
    }

    /// 强制转换为 u32 标识（客户号/产品号/需求次数）
    pub fn parse_u32(&self, value: &str, row: usize, field: &str) -> ImportResult<u32> {
        let v = self.parse_non_negative_int(value, row, field)?;
        u32::try_from(v).map_err(|_| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("超出 u32 范围: {}", v),
        })
    }

    /// 解析非负浮点（铸造单元需求系数）
    pub fn parse_non_negative_f64(&self, value: &str, row: usize, field: &str) -> ImportResult<f64> {
        let trimmed = value.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
            _ => Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("无法解析为非负数值: {}", trimmed),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_missing() {
        let cleaner = DataCleaner;
        assert!(cleaner.is_missing(""));
        assert!(cleaner.is_missing("  "));
        assert!(cleaner.is_missing("NaN"));
        assert!(cleaner.is_missing("NA"));
        assert!(!cleaner.is_missing("0"));
        assert!(!cleaner.is_missing("F1"));
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let cleaner = DataCleaner;
        let table = RawTable {
            headers: vec!["a".into(), "b".into()],
            rows: vec![
                vec!["1".into(), "2".into()],
                vec!["1".into(), "".into()],
                vec!["nan".into(), "2".into()],
            ],
        };

        let (cleaned, dropped) = cleaner.drop_incomplete_rows(table);
        assert_eq!(dropped, 2);
        assert_eq!(cleaned.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_parse_non_negative_int() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_non_negative_int("42", 1, "q").unwrap(), 42);
        assert_eq!(cleaner.parse_non_negative_int("3.0", 1, "q").unwrap(), 3);
        assert_eq!(cleaner.parse_non_negative_int(" 0 ", 1, "q").unwrap(), 0);

        assert!(cleaner.parse_non_negative_int("-1", 1, "q").is_err());
        assert!(cleaner.parse_non_negative_int("1.5", 1, "q").is_err());
        assert!(cleaner.parse_non_negative_int("abc", 1, "q").is_err());
        assert!(cleaner.parse_non_negative_int("inf", 1, "q").is_err());
    }

    #[test]
    fn test_parse_quantity_rejects_above_cap() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_quantity("4294967295", 1, "Jan-20").unwrap(), MAX_ORDER_QUANTITY);

        let err = cleaner
            .parse_quantity("18446744073709551615", 2, "Jan-20")
            .unwrap_err();
        assert!(err.is_value_error());
        assert!(cleaner.parse_quantity("4294967296", 2, "Jan-20").is_err());
    }

    #[test]
    fn test_parse_u32_overflow() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_u32("7", 1, "Kunde").unwrap(), 7);
        assert!(cleaner.parse_u32("4294967296", 1, "Kunde").is_err());
    }

    #[test]
    fn test_parse_non_negative_f64() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_non_negative_f64("2.5", 1, "c").unwrap(), 2.5);
        assert!(cleaner.parse_non_negative_f64("-0.1", 1, "c").is_err());
        assert!(cleaner.parse_non_negative_f64("x", 1, "c").is_err());
    }
}
