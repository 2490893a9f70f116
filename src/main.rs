// ==========================================
// 铸造模具监控系统 - 命令行入口
// ==========================================
// 用法: casting-form-monitor [配置文件路径]
// 输出: 模具剩余寿命与即将到来的维护（日志）
// ==========================================

use std::path::PathBuf;

use anyhow::Context;
use casting_form_monitor::app::AppState;
use casting_form_monitor::config::EngineConfig;
use casting_form_monitor::logging;

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", casting_form_monitor::APP_NAME);
    tracing::info!("系统版本: {}", casting_form_monitor::VERSION);
    tracing::info!("==================================================");

    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = EngineConfig::load(explicit.as_deref()).context("配置加载失败")?;
    let limit = config.upcoming_limit;

    let state = AppState::load(config)?;
    let api = state.read()?;

    tracing::info!(
        average = %format!("{:.1}%", api.average_relative_attrition() * 100.0),
        "模具平均剩余寿命"
    );

    for form_id in api.list_forms() {
        let status = api.form_status(&form_id)?;
        match (status.next_maintenance, status.criticality) {
            (Some(period), Some(tier)) => tracing::info!(
                form = %form_id,
                remaining = status.remaining_casts,
                next_maintenance = %period,
                tier = %tier,
                level = tier.index(),
                color = tier.color(),
                "模具状态"
            ),
            _ => tracing::warn!(form = %form_id, "模具无前瞻订单周期，无法预测维护"),
        }
    }

    for (form_id, period) in api.upcoming_maintenances(limit) {
        tracing::info!(form = %form_id, period = %period, "即将维护");
    }

    Ok(())
}
