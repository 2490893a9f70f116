// ==========================================
// 铸造模具监控系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析 → 按位置保存的原始表
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{Data, DataType, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

// ==========================================
// RawTable - 原始表
// ==========================================
// 宽表依赖列位置（前两列为客户/产品），因此按位置保存
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>, // 每行长度与 headers 一致，缺失值为空串
}

impl RawTable {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn push_row(&mut self, mut row: Vec<String>) {
        // 跳过完全空白的行
        if row.iter().all(|v| v.is_empty()) {
            return;
        }
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
}

// ==========================================
// Trait: FileParser
// ==========================================
pub trait FileParser {
    /// 从内存内容解析
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable>;

    /// 从文件路径解析
    fn parse_path(&self, path: &Path) -> ImportResult<RawTable> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        self.parse_bytes(&bytes)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| ImportError::EncodingError(e.to_string()))?;
        // 去掉 UTF-8 BOM（Excel 导出的 CSV 常带）
        let text = text.trim_start_matches('\u{feff}');

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = RawTable {
            headers,
            rows: Vec::new(),
        };

        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            table.push_row(row);
        }

        Ok(table)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcelKind {
    Xlsx,
    Xls,
}

pub struct ExcelParser {
    pub kind: ExcelKind,
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawTable> {
        let cursor = Cursor::new(bytes.to_vec());
        match self.kind {
            ExcelKind::Xlsx => {
                let workbook: Xlsx<_> = Xlsx::new(cursor)
                    .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_first_sheet::<Cursor<Vec<u8>>, _>(workbook)
            }
            ExcelKind::Xls => {
                let workbook: Xls<_> =
                    Xls::new(cursor).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
                read_first_sheet::<Cursor<Vec<u8>>, _>(workbook)
            }
        }
    }
}

/// 读取第一个工作表（第一行为表头）
fn read_first_sheet<RS, R>(mut workbook: R) -> ImportResult<RawTable>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

    let mut table = RawTable {
        headers: header_row.iter().map(cell_to_string).collect(),
        rows: Vec::new(),
    };

    for data_row in rows {
        table.push_row(data_row.iter().map(cell_to_string).collect());
    }

    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        // Excel 会把 "Jan-19" 这类列头自动识别为日期，按 ISO 日期输出
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => cell.to_string().trim().to_string(),
        },
        other => other.to_string().trim().to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按文件名扩展名选择解析器
    pub fn parser_for(&self, filename: &str) -> ImportResult<Box<dyn FileParser>> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" => Ok(Box::new(ExcelParser {
                kind: ExcelKind::Xlsx,
            })),
            "xls" => Ok(Box::new(ExcelParser {
                kind: ExcelKind::Xls,
            })),
            _ => Err(ImportError::UnsupportedFormat(if ext.is_empty() {
                filename.to_string()
            } else {
                ext
            })),
        }
    }

    pub fn parse_bytes(&self, bytes: &[u8], filename: &str) -> ImportResult<RawTable> {
        self.parser_for(filename)?.parse_bytes(bytes)
    }

    pub fn parse_path<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawTable> {
        let path = file_path.as_ref();
        let filename = path.to_string_lossy();
        self.parser_for(&filename)?.parse_path(path)
    }
}
