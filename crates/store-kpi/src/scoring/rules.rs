//! Pure scoring rules mapping raw store metrics onto the 0–4 KPI scale.

use super::domain::KpiScore;

/// Days used to scale the daily customer-unit baseline to a monthly volume.
pub const DEFAULT_DAYS_PER_PERIOD: u32 = 30;

/// Complaint-rate buckets, ascending. Each bound is inclusive.
pub const COMPLAINT_RATE_BANDS: [(f64, f64); 4] = [(0.1, 4.0), (0.3, 3.0), (0.5, 2.0), (0.7, 1.0)];

/// Returns `None` when the denominator is zero or either side is not finite.
pub fn safe_divide(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }

    let quotient = numerator / denominator;
    quotient.is_finite().then_some(quotient)
}

/// Linear attainment against target, capped at 4. No target means no signal.
pub fn sales_kpi(actual: f64, target: f64) -> KpiScore {
    if target <= 0.0 {
        return KpiScore::ZERO;
    }

    match safe_divide(actual, target) {
        Some(ratio) => KpiScore::new(ratio * KpiScore::MAX),
        None => KpiScore::ZERO,
    }
}

/// OPEX as a share of sales, as a percentage. `None` when sales are zero.
pub fn opex_percentage(total_sales: f64, actual_opex: f64) -> Option<f64> {
    safe_divide(actual_opex, total_sales).map(|ratio| ratio * 100.0)
}

/// Inverse attainment: spending below the target percentage scores higher.
pub fn opex_kpi(total_sales: f64, actual_opex: f64, target_opex_percentage: f64) -> KpiScore {
    if total_sales == 0.0 || target_opex_percentage == 0.0 {
        return KpiScore::ZERO;
    }

    let Some(actual_percentage) = opex_percentage(total_sales, actual_opex) else {
        return KpiScore::ZERO;
    };

    if actual_percentage == 0.0 {
        // no spend against positive sales: the ratio is unbounded, so it caps
        return KpiScore::PERFECT;
    }

    match safe_divide(target_opex_percentage, actual_percentage) {
        Some(ratio) => KpiScore::new(ratio * KpiScore::MAX),
        None => KpiScore::ZERO,
    }
}

/// Weighted complaints per hundred customer units over the period.
pub fn complaint_percentage(
    total_weighted_complaints: f64,
    avg_customer_units_per_day: f64,
    days_per_period: u32,
) -> Option<f64> {
    let monthly_units = avg_customer_units_per_day * f64::from(days_per_period);
    safe_divide(total_weighted_complaints, monthly_units).map(|ratio| ratio * 100.0)
}

/// Bucket lookup for an already computed complaint percentage.
pub fn complaint_rate_score(percentage: f64) -> KpiScore {
    if percentage.is_nan() {
        return KpiScore::ZERO;
    }

    COMPLAINT_RATE_BANDS
        .iter()
        .find(|(upper, _)| percentage <= *upper)
        .map(|(_, score)| KpiScore::new(*score))
        .unwrap_or(KpiScore::ZERO)
}

/// Complaint-rate KPI over the default 30-day period.
pub fn complaint_rate_kpi(
    total_weighted_complaints: f64,
    avg_customer_units_per_day: f64,
) -> KpiScore {
    complaint_rate_kpi_over(
        total_weighted_complaints,
        avg_customer_units_per_day,
        DEFAULT_DAYS_PER_PERIOD,
    )
}

/// A zero customer baseline scores as the worst case.
pub fn complaint_rate_kpi_over(
    total_weighted_complaints: f64,
    avg_customer_units_per_day: f64,
    days_per_period: u32,
) -> KpiScore {
    complaint_percentage(
        total_weighted_complaints,
        avg_customer_units_per_day,
        days_per_period,
    )
    .map(complaint_rate_score)
    .unwrap_or(KpiScore::ZERO)
}
