use super::domain::{
    ActiveSanction, MonthYear, SanctionTone, SanctionType, StoreId, ViolationRecord,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One rung of the escalation ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionTier {
    pub min_violations: u32,
    pub sanction_type: SanctionType,
}

impl SanctionTier {
    pub fn new(min_violations: u32, sanction_type: SanctionType) -> Self {
        Self {
            min_violations,
            sanction_type,
        }
    }
}

/// Violation-count → tier table supplied by business policy.
///
/// The lookback window counts the evaluated period itself, so a lookback of
/// three months for `2025-09` covers July through September. A lookback of
/// zero behaves like one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SanctionPolicyDocument")]
pub struct SanctionPolicy {
    tiers: Vec<SanctionTier>,
    lookback_months: u32,
}

#[derive(Deserialize)]
struct SanctionPolicyDocument {
    #[serde(default)]
    tiers: Vec<SanctionTier>,
    #[serde(default = "default_lookback_months")]
    lookback_months: u32,
}

impl From<SanctionPolicyDocument> for SanctionPolicy {
    fn from(document: SanctionPolicyDocument) -> Self {
        Self::new(document.tiers, document.lookback_months)
    }
}

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;

fn default_lookback_months() -> u32 {
    DEFAULT_LOOKBACK_MONTHS
}

impl SanctionPolicy {
    /// Tiers requiring zero violations are dropped; the rest are kept sorted.
    pub fn new(mut tiers: Vec<SanctionTier>, lookback_months: u32) -> Self {
        tiers.retain(|tier| tier.min_violations > 0);
        tiers.sort_by_key(|tier| tier.min_violations);
        Self {
            tiers,
            lookback_months,
        }
    }

    /// One written warning, then SP1, then SP2.
    pub fn escalation_ladder(lookback_months: u32) -> Self {
        Self::new(
            vec![
                SanctionTier::new(1, SanctionType::PeringatanTertulis),
                SanctionTier::new(2, SanctionType::Sp1),
                SanctionTier::new(3, SanctionType::Sp2),
            ],
            lookback_months,
        )
    }

    /// Policy that never issues sanctions.
    pub fn disabled() -> Self {
        Self::new(Vec::new(), DEFAULT_LOOKBACK_MONTHS)
    }

    pub fn tiers(&self) -> &[SanctionTier] {
        &self.tiers
    }

    pub fn lookback_months(&self) -> u32 {
        self.lookback_months
    }

    pub fn with_lookback_months(mut self, lookback_months: u32) -> Self {
        self.lookback_months = lookback_months;
        self
    }

    /// Highest tier whose threshold the count reaches.
    pub fn tier_for(&self, violation_count: u32) -> Option<&SanctionTier> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| violation_count >= tier.min_violations)
    }

    /// Inclusive date window ending on the last day of `period`.
    pub fn window(&self, period: MonthYear) -> Option<(NaiveDate, NaiveDate)> {
        let span = self.lookback_months.max(1) - 1;
        let start = period.minus_months(span).first_day()?;
        let end = period.last_day()?;
        Some((start, end))
    }
}

impl Default for SanctionPolicy {
    fn default() -> Self {
        Self::escalation_ladder(DEFAULT_LOOKBACK_MONTHS)
    }
}

/// Issues at most one sanction per employee, in order of first appearance.
pub fn classify_violations(
    store_id: &StoreId,
    period: MonthYear,
    violations: &[ViolationRecord],
    policy: &SanctionPolicy,
) -> Vec<ActiveSanction> {
    let Some((start, end)) = policy.window(period) else {
        return Vec::new();
    };

    // Names match case-insensitively; the first spelling seen is reported.
    let mut by_employee: Vec<(&str, String, Vec<&ViolationRecord>)> = Vec::new();
    for violation in violations
        .iter()
        .filter(|violation| (start..=end).contains(&violation.violation_date))
    {
        let name = violation.employee_name.trim();
        let key = name.to_lowercase();
        match by_employee.iter_mut().find(|(_, seen, _)| *seen == key) {
            Some((_, _, records)) => records.push(violation),
            None => by_employee.push((name, key, vec![violation])),
        }
    }

    by_employee
        .into_iter()
        .filter_map(|(employee, _, mut records)| {
            let count = u32::try_from(records.len()).unwrap_or(u32::MAX);
            let tier = policy.tier_for(count)?;
            records.sort_by_key(|record| record.violation_date);
            let latest = records.last()?.violation_date;
            let violation_details = records
                .iter()
                .map(|record| format!("{}: {}", record.violation_date, record.details.trim()))
                .collect::<Vec<_>>()
                .join("; ");

            Some(ActiveSanction {
                id: sanction_id(store_id, period, employee),
                employee_name: employee.to_string(),
                sanction_type: tier.sanction_type.clone(),
                sanction_date: latest,
                violation_details,
            })
        })
        .collect()
}

/// Recorded sanctions dated inside `period`, input order preserved.
pub fn active_in_period(records: &[ActiveSanction], period: MonthYear) -> Vec<ActiveSanction> {
    records
        .iter()
        .filter(|record| period.contains(record.sanction_date))
        .cloned()
        .collect()
}

fn sanction_id(store_id: &StoreId, period: MonthYear, employee: &str) -> String {
    let slug: String = employee
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("{}-{}-{}", store_id, period, slug)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanctionEntry {
    #[serde(flatten)]
    pub sanction: ActiveSanction,
    pub tone: SanctionTone,
    pub tone_label: &'static str,
}

/// Sanctions for one store/period with an explicit empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SanctionListing {
    #[serde(rename = "no_sanctions")]
    Clear,
    Active { sanctions: Vec<SanctionEntry> },
}

impl SanctionListing {
    pub fn from_sanctions(sanctions: Vec<ActiveSanction>) -> Self {
        if sanctions.is_empty() {
            return Self::Clear;
        }

        let sanctions = sanctions
            .into_iter()
            .map(|sanction| {
                let tone = sanction.sanction_type.tone();
                SanctionEntry {
                    sanction,
                    tone,
                    tone_label: tone.label(),
                }
            })
            .collect();
        Self::Active { sanctions }
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    pub fn entries(&self) -> &[SanctionEntry] {
        match self {
            Self::Clear => &[],
            Self::Active { sanctions } => sanctions,
        }
    }

    pub fn highest(&self) -> Option<&SanctionType> {
        self.entries()
            .iter()
            .map(|entry| &entry.sanction.sanction_type)
            .max_by_key(|sanction_type| sanction_type.rank())
    }

    pub fn summary(&self) -> String {
        match self.highest() {
            None => "no active sanctions".to_string(),
            Some(highest) => format!(
                "{} active sanction(s), highest {}",
                self.entries().len(),
                highest
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> MonthYear {
        MonthYear::new(2025, 9).expect("valid period")
    }

    fn store() -> StoreId {
        StoreId("JKT-001".to_string())
    }

    fn violation(employee: &str, y: i32, m: u32, d: u32, details: &str) -> ViolationRecord {
        ViolationRecord {
            employee_name: employee.to_string(),
            violation_date: NaiveDate::from_ymd_opt(y, m, d).expect("valid date"),
            details: details.to_string(),
        }
    }

    #[test]
    fn escalates_by_violation_count() {
        let violations = vec![
            violation("Budi", 2025, 9, 2, "late opening"),
            violation("Sari", 2025, 8, 14, "cash variance"),
            violation("Budi", 2025, 8, 20, "missing stock count"),
            violation("Sari", 2025, 9, 3, "cash variance"),
            violation("Sari", 2025, 9, 18, "uniform"),
            violation("Andi", 2025, 9, 10, "rude to customer"),
        ];

        let sanctions =
            classify_violations(&store(), period(), &violations, &SanctionPolicy::default());

        assert_eq!(sanctions.len(), 3);
        assert_eq!(sanctions[0].employee_name, "Budi");
        assert_eq!(sanctions[0].sanction_type, SanctionType::Sp1);
        assert_eq!(
            sanctions[0].sanction_date,
            NaiveDate::from_ymd_opt(2025, 9, 2).expect("valid")
        );
        assert_eq!(
            sanctions[0].violation_details,
            "2025-08-20: missing stock count; 2025-09-02: late opening"
        );
        assert_eq!(sanctions[1].employee_name, "Sari");
        assert_eq!(sanctions[1].sanction_type, SanctionType::Sp2);
        assert_eq!(sanctions[2].sanction_type, SanctionType::PeringatanTertulis);
        assert_eq!(sanctions[2].id, "JKT-001-2025-09-andi");
    }

    #[test]
    fn ignores_violations_outside_lookback_window() {
        let violations = vec![
            violation("Budi", 2025, 6, 30, "old"),
            violation("Budi", 2025, 10, 1, "future"),
            violation("Budi", 2025, 7, 1, "in window"),
        ];

        let sanctions =
            classify_violations(&store(), period(), &violations, &SanctionPolicy::default());
        assert_eq!(sanctions.len(), 1);
        assert_eq!(sanctions[0].sanction_type, SanctionType::PeringatanTertulis);

        let current_only = SanctionPolicy::default().with_lookback_months(0);
        assert!(classify_violations(&store(), period(), &violations, &current_only).is_empty());
    }

    #[test]
    fn groups_employee_names_ignoring_case() {
        let violations = vec![
            violation("Budi", 2025, 9, 2, "late opening"),
            violation("budi", 2025, 9, 9, "cash variance"),
            violation(" BUDI ", 2025, 9, 16, "uniform"),
        ];

        let sanctions =
            classify_violations(&store(), period(), &violations, &SanctionPolicy::default());

        assert_eq!(sanctions.len(), 1);
        assert_eq!(sanctions[0].employee_name, "Budi");
        assert_eq!(sanctions[0].sanction_type, SanctionType::Sp2);
        assert_eq!(sanctions[0].id, "JKT-001-2025-09-budi");
    }

    #[test]
    fn disabled_policy_issues_nothing() {
        let violations = vec![violation("Budi", 2025, 9, 2, "late opening")];
        assert!(
            classify_violations(&store(), period(), &violations, &SanctionPolicy::disabled())
                .is_empty()
        );
    }

    #[test]
    fn custom_thresholds_are_sorted_and_zero_tiers_dropped() {
        let policy = SanctionPolicy::new(
            vec![
                SanctionTier::new(5, SanctionType::Sp2),
                SanctionTier::new(0, SanctionType::Other("Teguran".to_string())),
                SanctionTier::new(2, SanctionType::PeringatanTertulis),
            ],
            1,
        );

        assert_eq!(policy.tiers().len(), 2);
        assert!(policy.tier_for(1).is_none());
        assert_eq!(
            policy.tier_for(4).map(|tier| &tier.sanction_type),
            Some(&SanctionType::PeringatanTertulis)
        );
        assert_eq!(
            policy.tier_for(9).map(|tier| &tier.sanction_type),
            Some(&SanctionType::Sp2)
        );
    }

    #[test]
    fn policy_document_deserializes_through_constructor() {
        let policy: SanctionPolicy = serde_json::from_str(
            r#"{"tiers":[{"min_violations":3,"sanction_type":"SP1"},{"min_violations":1,"sanction_type":"Peringatan Tertulis"}]}"#,
        )
        .expect("valid policy");

        assert_eq!(policy.lookback_months(), DEFAULT_LOOKBACK_MONTHS);
        assert_eq!(policy.tiers()[0].min_violations, 1);
    }

    #[test]
    fn recorded_sanctions_filtered_to_period_in_order() {
        let record = |id: &str, m: u32| ActiveSanction {
            id: id.to_string(),
            employee_name: "Rina".to_string(),
            sanction_type: SanctionType::Sp1,
            sanction_date: NaiveDate::from_ymd_opt(2025, m, 15).expect("valid"),
            violation_details: "stock loss".to_string(),
        };
        let records = vec![record("b", 9), record("x", 8), record("a", 9)];

        let active = active_in_period(&records, period());
        let ids: Vec<&str> = active.iter().map(|sanction| sanction.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn empty_listing_is_explicit() {
        let listing = SanctionListing::from_sanctions(Vec::new());
        assert!(listing.is_clear());
        assert_eq!(listing.summary(), "no active sanctions");
        assert_eq!(
            serde_json::to_value(&listing).expect("serializes"),
            serde_json::json!({ "state": "no_sanctions" })
        );
    }

    #[test]
    fn active_listing_serializes_with_tone() {
        let listing = SanctionListing::from_sanctions(vec![ActiveSanction {
            id: "s-1".to_string(),
            employee_name: "Rina".to_string(),
            sanction_type: SanctionType::Sp2,
            sanction_date: NaiveDate::from_ymd_opt(2025, 9, 15).expect("valid"),
            violation_details: "repeat cash variance".to_string(),
        }]);

        let value = serde_json::to_value(&listing).expect("serializes");
        assert_eq!(value["state"], "active");
        assert_eq!(value["sanctions"][0]["sanction_type"], "SP2");
        assert_eq!(value["sanctions"][0]["tone"], "critical");
        assert_eq!(value["sanctions"][0]["sanction_date"], "2025-09-15");
        assert_eq!(listing.summary(), "1 active sanction(s), highest SP2");
    }
}
