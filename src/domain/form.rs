// ==========================================
// 铸造模具监控系统 - 模具领域模型
// ==========================================
// 职责: 模具主数据 + 产品/模具需求矩阵
// 生命周期: 启动时从参考表加载，进程内不可变
// ==========================================

use crate::domain::types::{FormId, ProductId};
use serde::{Deserialize, Serialize};

// ==========================================
// Form - 模具
// ==========================================
// 不变量: 0 ≤ used_casts ≤ max_casts（加载时校验）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub form_id: FormId,

    // ===== 参考数据 =====
    pub cost_factor: f64, // 铸造单元需求系数（每次浇铸）
    pub max_casts: u64,   // 最大允许浇铸次数
    pub used_casts: u64,  // 已浇铸次数
}

// ==========================================
// Trait: FormBudget
// ==========================================
// 用途: 维护预测所需的寿命预算接口
pub trait FormBudget {
    /// 剩余可浇铸次数 (max - used)，最小为 0
    fn remaining_casts(&self) -> u64;

    /// 相对剩余寿命 (max - used) / max
    ///
    /// # 返回
    /// 0.0 - 1.0；max 为 0 时返回 0.0
    fn relative_attrition(&self) -> f64;
}

impl FormBudget for Form {
    fn remaining_casts(&self) -> u64 {
        self.max_casts.saturating_sub(self.used_casts)
    }

    fn relative_attrition(&self) -> f64 {
        if self.max_casts == 0 {
            return 0.0;
        }
        self.remaining_casts() as f64 / self.max_casts as f64
    }
}

// ==========================================
// FormRequirement - 产品/模具需求
// ==========================================
// 稀疏映射: (产品, 模具) → 每单位产品所需浇铸次数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRequirement {
    pub product_id: ProductId,
    pub form_id: FormId,
    pub casts_per_unit: u32,
}
