// ==========================================
// 铸造模具监控系统 - 参考数据加载器
// ==========================================
// 输入: 模具表 / 产品-模具需求矩阵 / 历年订单宽表
// 输出: Form / FormRequirement / Order 内存模型
// 策略: 加载期任何数值错误均为致命错误（无法构造有效状态）
// ==========================================

use crate::domain::{Form, FormId, FormRequirement, Order, ProductId};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapper, StandardField};
use crate::importer::file_parser::{RawTable, UniversalFileParser};
use crate::importer::order_normalizer::OrderNormalizer;
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

/// 参考数据（进程内不可变）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub forms: Vec<Form>,                     // 源表顺序
    pub requirements: Vec<FormRequirement>,   // 矩阵行序 × 列序
    pub products: Vec<ProductId>,             // 矩阵行序
}

/// 启动数据集
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedData {
    pub reference: ReferenceData,
    pub orders: Vec<Order>, // 多张订单表按传入顺序拼接
}

pub struct ReferenceLoader {
    parser: UniversalFileParser,
    cleaner: DataCleaner,
    mapper: FieldMapper,
    normalizer: OrderNormalizer,
}

impl Default for ReferenceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceLoader {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            cleaner: DataCleaner,
            mapper: FieldMapper,
            normalizer: OrderNormalizer::new(),
        }
    }

    // ==========================================
    // 路径入口
    // ==========================================

    /// 从文件加载全部启动数据
    #[instrument(skip(self, order_paths), fields(order_tables = order_paths.len()))]
    pub fn load_from_paths<P: AsRef<Path>>(
        &self,
        forms_path: &Path,
        requirements_path: &Path,
        order_paths: &[P],
    ) -> ImportResult<LoadedData> {
        let forms_table = self.parser.parse_path(forms_path)?;
        let forms = self.load_forms(&forms_table)?;

        let requirements_table = self.parser.parse_path(requirements_path)?;
        let (requirements, products) = self.load_requirements(&requirements_table, &forms)?;

        let mut orders = Vec::new();
        for path in order_paths {
            let path = path.as_ref();
            let table = self.parser.parse_path(path)?;
            let normalized = self
                .normalizer
                .normalize(table, &path.display().to_string())?;
            orders.extend(normalized.orders);
        }

        tracing::info!(
            forms = forms.len(),
            products = products.len(),
            requirements = requirements.len(),
            orders = orders.len(),
            "参考数据加载完成"
        );

        Ok(LoadedData {
            reference: ReferenceData {
                forms,
                requirements,
                products,
            },
            orders,
        })
    }

    // ==========================================
    // 表级解析
    // ==========================================

    /// 解析模具表
    ///
    /// # 校验
    /// - 模具号唯一且非空
    /// - 0 ≤ 已浇铸次数 ≤ 最大浇铸次数
    pub fn load_forms(&self, table: &RawTable) -> ImportResult<Vec<Form>> {
        const TABLE: &str = "forms";
        let id_col = self.mapper.require_column(table, TABLE, StandardField::FormId)?;
        let cost_col = self
            .mapper
            .require_column(table, TABLE, StandardField::CostFactor)?;
        let max_col = self.mapper.require_column(table, TABLE, StandardField::MaxCasts)?;
        let used_col = self
            .mapper
            .require_column(table, TABLE, StandardField::UsedCasts)?;

        let mut seen = HashSet::new();
        let mut forms = Vec::with_capacity(table.row_count());

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_number = row_idx + 1;
            let form_id = row[id_col].trim();
            if self.cleaner.is_missing(form_id) {
                return Err(ImportError::DataQualityError {
                    row: row_number,
                    message: "模具号为空".to_string(),
                });
            }
            if !seen.insert(form_id.to_string()) {
                return Err(ImportError::DataQualityError {
                    row: row_number,
                    message: format!("模具号重复: {}", form_id),
                });
            }

            let cost_factor = self.cleaner.parse_non_negative_f64(
                &row[cost_col],
                row_number,
                &table.headers[cost_col],
            )?;
            let max_casts = self.cleaner.parse_non_negative_int(
                &row[max_col],
                row_number,
                &table.headers[max_col],
            )?;
            let used_casts = self.cleaner.parse_non_negative_int(
                &row[used_col],
                row_number,
                &table.headers[used_col],
            )?;

            if used_casts > max_casts {
                return Err(ImportError::DataQualityError {
                    row: row_number,
                    message: format!(
                        "模具 {} 已浇铸次数 {} 超过最大次数 {}",
                        form_id, used_casts, max_casts
                    ),
                });
            }

            forms.push(Form {
                form_id: FormId::new(form_id),
                cost_factor,
                max_casts,
                used_casts,
            });
        }

        Ok(forms)
    }

    /// 解析产品-模具需求矩阵
    ///
    /// 第一列为产品号，其余列头为模具号；空单元格表示无需求。
    /// 不在模具表中的列忽略（告警）。
    pub fn load_requirements(
        &self,
        table: &RawTable,
        forms: &[Form],
    ) -> ImportResult<(Vec<FormRequirement>, Vec<ProductId>)> {
        const TABLE: &str = "requirements";
        let product_col = self
            .mapper
            .require_column(table, TABLE, StandardField::ProductId)?;

        let known: HashSet<&str> = forms.iter().map(|f| f.form_id.as_str()).collect();
        let mut form_columns: Vec<(usize, FormId)> = Vec::new();
        for (idx, header) in table.headers.iter().enumerate() {
            if idx == product_col {
                continue;
            }
            if known.contains(header.as_str()) {
                form_columns.push((idx, FormId::new(header.clone())));
            } else {
                tracing::warn!(column = %header, "需求矩阵列不在模具表中，已忽略");
            }
        }

        let mut products = Vec::with_capacity(table.row_count());
        let mut requirements = Vec::new();

        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_number = row_idx + 1;
            let product_id = ProductId(self.cleaner.parse_u32(
                &row[product_col],
                row_number,
                &table.headers[product_col],
            )?);
            if products.contains(&product_id) {
                return Err(ImportError::DataQualityError {
                    row: row_number,
                    message: format!("需求矩阵产品号重复: {}", product_id),
                });
            }
            products.push(product_id);

            for (idx, form_id) in &form_columns {
                let cell = &row[*idx];
                if self.cleaner.is_missing(cell) {
                    continue;
                }
                let casts_per_unit = self.cleaner.parse_u32(cell, row_number, form_id.as_str())?;
                requirements.push(FormRequirement {
                    product_id,
                    form_id: form_id.clone(),
                    casts_per_unit,
                });
            }
        }

        Ok((requirements, products))
    }
}
