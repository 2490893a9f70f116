// ==========================================
// 生产数据引擎集成测试
// ==========================================
// 职责: 从 CSV 加载到查询/手工调整的完整链路
// 场景: 2 个模具、2 个产品、2 个客户，今天 = 2020-01-15
// ==========================================


use casting_form_monitor::api::ApiError;
use casting_form_monitor::domain::{
    CriticalityTier, CustomerId, FormId, Period, ProductId, MAX_ORDER_QUANTITY,
};
use std::sync::Arc;
use test_helpers::create_test_api;

fn p(year: i32, month: u32) -> Period {
    Period::new(year, month).unwrap()
}

// ==========================================
// 列表查询
// ==========================================

#[test]
fn test_lists_follow_source_order() {
    let (_dir, api, _clock) = create_test_api();

    assert_eq!(api.list_forms(), vec![FormId::from("F1"), FormId::from("F2")]);
    assert_eq!(api.list_products(), vec![ProductId(10), ProductId(11)]);
    assert_eq!(api.list_customers(), vec![CustomerId(1), CustomerId(2)]);
}

// ==========================================
// 模具磨损与维护
// ==========================================

#[test]
fn test_relative_attrition_bounds_and_average() {
    let (_dir, api, _clock) = create_test_api();

    let f1 = api.relative_attrition(&FormId::from("F1")).unwrap();
    let f2 = api.relative_attrition(&FormId::from("F2")).unwrap();
    assert!((f1 - 0.1).abs() < 1e-12);
    assert!((f2 - 1.0).abs() < 1e-12);

    for form_id in api.list_forms() {
        let value = api.relative_attrition(&form_id).unwrap();
        assert!((0.0..=1.0).contains(&value));
    }
    assert!((api.average_relative_attrition() - 0.55).abs() < 1e-12);
}

#[test]
fn test_next_maintenance_crosses_threshold_in_second_period() {
    let (_dir, api, _clock) = create_test_api();

    // F1: 剩余 10 次，每月 5 次 → 第二个前瞻周期
    assert_eq!(api.next_maintenance(&FormId::from("F1")).unwrap(), p(2020, 2));
    // F2: 剩余 1000 次远超前瞻磨损 → 最后已知周期
    assert_eq!(api.next_maintenance(&FormId::from("F2")).unwrap(), p(2020, 4));

    assert_eq!(
        api.criticality_tier(&FormId::from("F1")).unwrap(),
        CriticalityTier::Critical
    );
}

#[test]
fn test_upcoming_maintenances_sorted_and_limited() {
    let (_dir, api, _clock) = create_test_api();

    let upcoming = api.upcoming_maintenances(6);
    assert_eq!(
        upcoming,
        vec![(FormId::from("F1"), p(2020, 2)), (FormId::from("F2"), p(2020, 4))]
    );
    assert_eq!(api.upcoming_maintenances(1).len(), 1);
}

#[test]
fn test_form_attrition_over_time_covers_all_periods() {
    let (_dir, api, _clock) = create_test_api();

    let series = api.form_attrition_over_time(&FormId::from("F2")).unwrap();
    assert_eq!(series.len(), 6);
    // Nov-19: 产品 10 × 3 × 2 + 产品 11 × 1 × 3
    assert_eq!(series[0], (p(2019, 11), 9));
    assert_eq!(series[2], (p(2020, 1), 16));
}

#[test]
fn test_unknown_form_is_data_integrity_error() {
    let (_dir, api, _clock) = create_test_api();

    let err = api.criticality_tier(&FormId::from("F404")).unwrap_err();
    assert!(matches!(err, ApiError::DataIntegrity(_)));
    assert!(err.is_recoverable());
}

#[test]
fn test_recalculate_is_idempotent() {
    let (_dir, mut api, _clock) = create_test_api();

    let before: Vec<_> = api
        .list_forms()
        .iter()
        .map(|f| api.form_status(f).unwrap())
        .collect();
    api.recalculate();
    api.recalculate();
    let after: Vec<_> = api
        .list_forms()
        .iter()
        .map(|f| api.form_status(f).unwrap())
        .collect();

    assert_eq!(before, after);
}

// ==========================================
// 时间序列聚合
// ==========================================

#[test]
fn test_orders_over_time_starts_at_current_period() {
    let (_dir, api, _clock) = create_test_api();

    let table = api.orders_over_time(&[CustomerId(1)]).unwrap();
    assert_eq!(table.products, vec![ProductId(10)]);
    assert_eq!(
        table.periods(),
        vec![p(2020, 1), p(2020, 2), p(2020, 3), p(2020, 4)]
    );
    assert_eq!(table.value(p(2020, 1), ProductId(10)), Some(5));

    let table = api.orders_over_time(&[CustomerId(1), CustomerId(2)]).unwrap();
    assert_eq!(table.products, vec![ProductId(10), ProductId(11)]);
    assert_eq!(table.value(p(2020, 1), ProductId(11)), Some(2));
}

#[test]
fn test_casting_cell_demand_weights_by_cost() {
    let (_dir, api, _clock) = create_test_api();

    let demand = api
        .casting_cell_demand_over_time(&[CustomerId(1), CustomerId(2)])
        .unwrap();
    // 产品 10: 1 × 2.0 + 2 × 0.5 = 3.0；产品 11: 3 × 0.5 = 1.5
    let p10 = demand.value(p(2020, 1), ProductId(10)).unwrap();
    let p11 = demand.value(p(2020, 1), ProductId(11)).unwrap();
    assert!((p10 - 15.0).abs() < 1e-9);
    assert!((p11 - 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_key_is_customer_set() {
    let (_dir, api, _clock) = create_test_api();

    let first = api.orders_over_time(&[CustomerId(1), CustomerId(2)]).unwrap();
    let second = api
        .orders_over_time(&[CustomerId(2), CustomerId(1), CustomerId(2)])
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    let stats = api.cache_stats().unwrap();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_cache_resets_when_day_changes() {
    let (_dir, api, clock) = create_test_api();

    let first = api.orders_over_time(&[CustomerId(1)]).unwrap();
    clock.set(chrono::NaiveDate::from_ymd_opt(2020, 1, 16).unwrap());
    let second = api.orders_over_time(&[CustomerId(1)]).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(api.cache_stats().unwrap().misses, 2);
}

// ==========================================
// 手工调整
// ==========================================

#[test]
fn test_update_requires_selection_and_keeps_state() {
    let (_dir, mut api, _clock) = create_test_api();
    let before = api.filtered_order_rows(None, None, None);

    let err = api
        .update_orders(&[], &[ProductId(10)], p(2020, 2), 10)
        .unwrap_err();
    assert!(matches!(err, ApiError::Selection(_)));
    let err = api
        .update_orders(&[CustomerId(1)], &[], p(2020, 2), 10)
        .unwrap_err();
    assert!(matches!(err, ApiError::Selection(_)));

    assert_eq!(api.filtered_order_rows(None, None, None), before);
}

#[test]
fn test_update_clamps_at_zero_and_recomputes() {
    let (_dir, mut api, _clock) = create_test_api();

    let report = api
        .update_orders(&[CustomerId(1)], &[ProductId(10)], p(2020, 2), -1_000_000)
        .unwrap();
    assert_eq!(report.rows_created, 0);
    assert_eq!(report.rows_updated, 1);

    let rows = api.filtered_order_rows(
        Some(&[CustomerId(1)]),
        Some(&[ProductId(10)]),
        Some(p(2020, 2)),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 0);
    assert_eq!(rows[0].total_attrition, 0);

    // F1 前瞻磨损 5, 0, 5, 5 → 第三个周期越过剩余 10 次
    assert_eq!(api.next_maintenance(&FormId::from("F1")).unwrap(), p(2020, 3));
}

#[test]
fn test_repeated_large_deltas_saturate_at_quantity_cap() {
    let (_dir, mut api, _clock) = create_test_api();

    for _ in 0..2 {
        api.update_orders(&[CustomerId(1)], &[ProductId(10)], p(2020, 1), i64::MAX)
            .unwrap();
    }

    let rows = api.filtered_order_rows(
        Some(&[CustomerId(1)]),
        Some(&[ProductId(10)]),
        Some(p(2020, 1)),
    );
    assert_eq!(rows[0].quantity, MAX_ORDER_QUANTITY);
    assert_eq!(rows[0].total_attrition, MAX_ORDER_QUANTITY * 3);
    assert_eq!(api.next_maintenance(&FormId::from("F1")).unwrap(), p(2020, 1));
}

#[test]
fn test_update_synthesizes_missing_rows() {
    let (_dir, mut api, _clock) = create_test_api();

    let report = api
        .update_orders(&[CustomerId(3)], &[ProductId(11)], p(2020, 5), 7)
        .unwrap();
    assert_eq!(report.rows_created, 1);
    assert_eq!(report.rows_updated, 1);

    assert!(api.list_customers().contains(&CustomerId(3)));
    let rows = api.filtered_order_rows(Some(&[CustomerId(3)]), None, None);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 7);
    assert_eq!(rows[0].total_attrition, 21);

    // 新周期延长前瞻区间
    assert_eq!(api.next_maintenance(&FormId::from("F2")).unwrap(), p(2020, 5));
}

#[test]
fn test_update_invalidates_cache() {
    let (_dir, mut api, _clock) = create_test_api();

    let before = api.orders_over_time(&[CustomerId(1), CustomerId(2)]).unwrap();
    assert_eq!(before.value(p(2020, 1), ProductId(10)), Some(5));

    api.update_orders(
        &[CustomerId(1), CustomerId(2)],
        &[ProductId(10)],
        p(2020, 1),
        2,
    )
    .unwrap();

    let after = api.orders_over_time(&[CustomerId(1), CustomerId(2)]).unwrap();
    assert_eq!(after.value(p(2020, 1), ProductId(10)), Some(9));
    assert_eq!(api.cache_stats().unwrap().hits, 0);
}

#[test]
fn test_filtered_rows_carry_total_attrition() {
    let (_dir, api, _clock) = create_test_api();

    let rows = api.filtered_order_rows(None, Some(&[ProductId(10)]), Some(p(2020, 1)));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].customer_id, CustomerId(1));
    // 产品 10 每单位磨损 1 + 2 = 3
    assert_eq!(rows[0].total_attrition, 15);

    // 空过滤条件等同不过滤
    let all = api.filtered_order_rows(Some(&[]), Some(&[]), None);
    assert_eq!(all.len(), api.filtered_order_rows(None, None, None).len());
}
