// ==========================================
// 铸造模具监控系统 - 应用状态
// ==========================================
// 职责: 持有唯一的 ProductionDataApi 实例
// 并发: 多读单写（RwLock），写操作在锁内完成重算
// ==========================================

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;

use crate::api::{ApiError, ApiResult, ProductionDataApi};
use crate::config::EngineConfig;
use crate::engine::{Clock, SystemClock};

/// 应用状态
///
/// 展示层各回调共享同一实例
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EngineConfig>,
    api: Arc<RwLock<ProductionDataApi>>,
}

impl AppState {
    /// 按配置加载参考数据（使用系统时钟）
    pub fn load(config: EngineConfig) -> anyhow::Result<Self> {
        Self::load_with_clock(config, Arc::new(SystemClock))
    }

    pub fn load_with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        tracing::info!(data_dir = %config.data_dir.display(), "正在加载参考数据...");

        let api = ProductionDataApi::from_config(&config, clock).with_context(|| {
            format!("无法从 {} 加载参考数据", config.data_dir.display())
        })?;

        tracing::info!(
            forms = api.list_forms().len(),
            customers = api.list_customers().len(),
            "参考数据加载完成"
        );

        Ok(Self::from_api(config, api))
    }

    pub fn from_api(config: EngineConfig, api: ProductionDataApi) -> Self {
        Self {
            config: Arc::new(config),
            api: Arc::new(RwLock::new(api)),
        }
    }

    /// 读访问（跨月后先重算派生聚合）
    pub fn read(&self) -> ApiResult<RwLockReadGuard<'_, ProductionDataApi>> {
        let stale = self.read_guard()?.is_stale();
        if stale {
            let mut api = self.write()?;
            // 可能已被其他写者刷新
            if api.is_stale() {
                tracing::info!(period = %api.current_period(), "当前周期变化，重算派生聚合");
                api.recalculate();
            }
        }
        self.read_guard()
    }

    /// 写访问
    pub fn write(&self) -> ApiResult<RwLockWriteGuard<'_, ProductionDataApi>> {
        self.api
            .write()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {}", e)))
    }

    fn read_guard(&self) -> ApiResult<RwLockReadGuard<'_, ProductionDataApi>> {
        self.api
            .read()
            .map_err(|e| ApiError::Internal(format!("锁获取失败: {}", e)))
    }
}
