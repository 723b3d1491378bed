use store_kpi::scoring::rules::complaint_rate_score;
use store_kpi::scoring::{
    complaint_rate_kpi, opex_kpi, resolve_weight, sales_kpi, weighted_complaints,
    ComplaintWeight, RawComplaintRow, WeightTable,
};

#[test]
fn sales_attainment_stays_in_range_and_caps_at_target() {
    for target in [1.0, 250.0, 1_000_000.0] {
        let mut previous = 0.0;
        for step in -10..=30 {
            let actual = target * step as f64 / 10.0;
            let score = sales_kpi(actual, target).value();
            assert!((0.0..=4.0).contains(&score), "score {score} out of range");
            assert!(score >= previous, "not monotonic at {actual}/{target}");
            if actual >= target {
                assert_eq!(score, 4.0);
            }
            previous = score;
        }
    }
}

#[test]
fn sales_attainment_without_target_is_zero() {
    for actual in [0.0, 1.0, 10_000.0, -3.0] {
        assert_eq!(sales_kpi(actual, 0.0).value(), 0.0);
    }
}

#[test]
fn opex_attainment_guards_zero_inputs() {
    assert_eq!(opex_kpi(0.0, 1_000.0, 15.0).value(), 0.0);
    assert_eq!(opex_kpi(50_000.0, 1_000.0, 0.0).value(), 0.0);
}

#[test]
fn complaint_rate_thresholds_match_reporting_policy() {
    assert_eq!(complaint_rate_score(0.1).value(), 4.0);
    assert_eq!(complaint_rate_score(0.30000001).value(), 2.0);
    assert_eq!(complaint_rate_score(0.7).value(), 1.0);
    assert_eq!(complaint_rate_score(0.70001).value(), 0.0);
    assert_eq!(complaint_rate_kpi(50.0, 0.0).value(), 0.0);
}

#[test]
fn weight_lookup_is_case_insensitive_with_neutral_fallback() {
    let weights = vec![ComplaintWeight::new("whatsapp", 2.0)];
    assert_eq!(resolve_weight("WhatsApp", &weights, 1.0), 2.0);
    assert_eq!(resolve_weight("unknown_channel", &weights, 1.0), 1.0);
}

#[test]
fn weighted_total_across_channels() {
    let table = WeightTable::with_neutral_default(vec![
        ComplaintWeight::new("whatsapp", 2.0),
        ComplaintWeight::new("social_media", 1.0),
        ComplaintWeight::new("gmaps", 1.0),
        ComplaintWeight::new("online_order", 3.0),
        ComplaintWeight::new("late_handling", 5.0),
    ])
    .expect("valid weights");
    let row = RawComplaintRow {
        whatsapp_count: 10,
        social_media_count: 5,
        gmaps_count: 0,
        online_order_count: 2,
        late_handling_count: 1,
    };

    assert_eq!(weighted_complaints(&row, &table), 36.0);
    assert_eq!(weighted_complaints(&RawComplaintRow::default(), &table), 0.0);
}
