use chrono::NaiveDate;

use crate::scoring::{
    ComplaintWeight, EvaluationInput, MonthYear, RawComplaintRow, RawFinanceRow, ScoringConfig,
    ScoringEngine, Store, StoreId, StoreTargets, ViolationRecord, WeightTable,
};

pub(super) fn period() -> MonthYear {
    MonthYear::new(2025, 9).expect("valid period")
}

pub(super) fn store(id: &str) -> Store {
    Store {
        id: StoreId(id.to_string()),
        name: format!("Toko {id}"),
        city: "Bandung".to_string(),
        regional: "Jawa Barat".to_string(),
        area: "Area 2".to_string(),
    }
}

pub(super) fn weight_table() -> WeightTable {
    WeightTable::with_neutral_default(vec![
        ComplaintWeight::new("whatsapp", 2.0),
        ComplaintWeight::new("social_media", 1.0),
        ComplaintWeight::new("gmaps", 1.0),
        ComplaintWeight::new("online_order", 3.0),
        ComplaintWeight::new("late_handling", 5.0),
    ])
    .expect("valid weights")
}

pub(super) fn complaints() -> RawComplaintRow {
    RawComplaintRow {
        whatsapp_count: 10,
        social_media_count: 5,
        gmaps_count: 0,
        online_order_count: 2,
        late_handling_count: 1,
    }
}

pub(super) fn finance() -> RawFinanceRow {
    RawFinanceRow {
        cogs_achieved: 61_000_000.0,
        total_sales: 90_000_000.0,
        total_opex: 18_000_000.0,
    }
}

pub(super) fn targets() -> StoreTargets {
    StoreTargets {
        sales_target: 120_000_000.0,
        opex_target_percentage: 20.0,
        avg_customer_units_per_day: 500.0,
    }
}

pub(super) fn violation(employee: &str, day: u32, details: &str) -> ViolationRecord {
    ViolationRecord {
        employee_name: employee.to_string(),
        violation_date: NaiveDate::from_ymd_opt(2025, 9, day).expect("valid date"),
        details: details.to_string(),
    }
}

pub(super) fn input(id: &str) -> EvaluationInput {
    EvaluationInput {
        store: store(id),
        period: period(),
        complaints: Some(complaints()),
        finance: Some(finance()),
        targets: Some(targets()),
        violations: Vec::new(),
        recorded_sanctions: Vec::new(),
    }
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default(), weight_table())
}
