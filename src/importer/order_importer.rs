// ==========================================
// 铸造模具监控系统 - 订单上传导入器
// ==========================================
// 流程: 内容解码 → 按扩展名解析 → 宽表归一化
// 说明: 本模块只产出待合并的订单行，不触碰订单簿；
//       合并由引擎层整体完成（全部成功才写入）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::order_normalizer::{NormalizedOrders, OrderNormalizer};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub struct OrderImporter {
    parser: UniversalFileParser,
    normalizer: OrderNormalizer,
}

impl Default for OrderImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            normalizer: OrderNormalizer::new(),
        }
    }

    /// 解析上传文件原始内容
    pub fn parse_upload(&self, bytes: &[u8], filename: &str) -> ImportResult<NormalizedOrders> {
        let table = self.parser.parse_bytes(bytes, filename)?;
        self.normalizer.normalize(table, filename)
    }

    /// 解析浏览器上传内容 (`data:<mime>;base64,<payload>`)
    pub fn parse_data_url(&self, contents: &str, filename: &str) -> ImportResult<NormalizedOrders> {
        let bytes = decode_data_url(contents)?;
        self.parse_upload(&bytes, filename)
    }
}

/// 解码 data URL，返回原始字节
pub fn decode_data_url(contents: &str) -> ImportResult<Vec<u8>> {
    let (header, payload) = contents.split_once(',').ok_or_else(|| {
        ImportError::PayloadDecodeError("缺少 ',' 分隔的内容头".to_string())
    })?;

    if !header.trim_end().ends_with(";base64") {
        return Err(ImportError::PayloadDecodeError(format!(
            "仅支持 base64 编码内容: {}",
            header
        )));
    }

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(cleaned)?)
}
