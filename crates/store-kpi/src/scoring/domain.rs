use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised when raw metrics fail boundary validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number (found {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must not be negative (found {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("complaint weight for channel '{channel}' must be finite and non-negative (found {weight})")]
    InvalidWeight { channel: String, weight: f64 },
    #[error("month must be between 1 and 12 (found {0})")]
    InvalidMonth(u32),
    #[error("period '{0}' is not formatted as YYYY-MM")]
    MalformedPeriod(String),
    #[error("year {0} is outside the supported calendar range")]
    YearOutOfRange(i32),
    #[error("days per period must be positive (found {0})")]
    InvalidDaysPerPeriod(u32),
    #[error("overall score weights must be finite, non-negative and not all zero")]
    InvalidOverallWeights,
}

pub(crate) fn ensure_amount(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub String);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry for a store. Owned by the external catalog; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub regional: String,
    #[serde(default)]
    pub area: String,
}

/// Reporting period. Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    /// The last calendar year is excluded so `next()` and `last_day()` always resolve.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::InvalidMonth(month));
        }
        if !(NaiveDate::MIN.year()..NaiveDate::MAX.year()).contains(&year) {
            return Err(ValidationError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn month(self) -> u32 {
        self.month
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        self.next().first_day().and_then(|date| date.pred_opt())
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Steps back `months` periods.
    pub fn minus_months(self, months: u32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) - months as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthYear {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let malformed = || ValidationError::MalformedPeriod(raw.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for MonthYear {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthYear> for String {
    fn from(value: MonthYear) -> Self {
        value.to_string()
    }
}

/// The fixed complaint channels captured on every complaint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintChannel {
    Whatsapp,
    SocialMedia,
    Gmaps,
    OnlineOrder,
    LateHandling,
}

impl ComplaintChannel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Whatsapp,
            Self::SocialMedia,
            Self::Gmaps,
            Self::OnlineOrder,
            Self::LateHandling,
        ]
    }

    /// Key used to look the channel up in the weight configuration.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Whatsapp => "whatsapp",
            Self::SocialMedia => "social_media",
            Self::Gmaps => "gmaps",
            Self::OnlineOrder => "online_order",
            Self::LateHandling => "late_handling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Whatsapp => "WhatsApp",
            Self::SocialMedia => "Social Media",
            Self::Gmaps => "Google Maps",
            Self::OnlineOrder => "Online Order",
            Self::LateHandling => "Late Handling",
        }
    }
}

/// Per-store, per-period complaint counts. Unknown fields and negative counts
/// are rejected when deserializing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawComplaintRow {
    pub whatsapp_count: u32,
    pub social_media_count: u32,
    pub gmaps_count: u32,
    pub online_order_count: u32,
    pub late_handling_count: u32,
}

impl RawComplaintRow {
    pub const fn count(&self, channel: ComplaintChannel) -> u32 {
        match channel {
            ComplaintChannel::Whatsapp => self.whatsapp_count,
            ComplaintChannel::SocialMedia => self.social_media_count,
            ComplaintChannel::Gmaps => self.gmaps_count,
            ComplaintChannel::OnlineOrder => self.online_order_count,
            ComplaintChannel::LateHandling => self.late_handling_count,
        }
    }

    pub fn total_count(&self) -> u64 {
        ComplaintChannel::ordered()
            .into_iter()
            .map(|channel| u64::from(self.count(channel)))
            .sum()
    }
}

/// Per-store, per-period financial figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFinanceRow {
    pub cogs_achieved: f64,
    pub total_sales: f64,
    pub total_opex: f64,
}

impl RawFinanceRow {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_amount("cogs_achieved", self.cogs_achieved)?;
        ensure_amount("total_sales", self.total_sales)?;
        ensure_amount("total_opex", self.total_opex)?;
        Ok(())
    }
}

/// Externally configured targets and traffic baseline for a store/period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreTargets {
    pub sales_target: f64,
    pub opex_target_percentage: f64,
    pub avg_customer_units_per_day: f64,
}

impl StoreTargets {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_amount("sales_target", self.sales_target)?;
        ensure_amount("opex_target_percentage", self.opex_target_percentage)?;
        ensure_amount(
            "avg_customer_units_per_day",
            self.avg_customer_units_per_day,
        )?;
        Ok(())
    }
}

/// Normalized KPI score, always within `[0, 4]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct KpiScore(f64);

impl KpiScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 4.0;
    pub const ZERO: Self = Self(0.0);
    pub const PERFECT: Self = Self(Self::MAX);

    /// Clamps into the score domain; NaN collapses to zero.
    pub fn new(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::ZERO;
        }
        Self(raw.clamp(Self::MIN, Self::MAX))
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for KpiScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Disciplinary tiers, lowest to highest. Unrecognized labels are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SanctionType {
    PeringatanTertulis,
    Sp1,
    Sp2,
    Other(String),
}

impl SanctionType {
    pub fn label(&self) -> &str {
        match self {
            Self::PeringatanTertulis => "Peringatan Tertulis",
            Self::Sp1 => "SP1",
            Self::Sp2 => "SP2",
            Self::Other(label) => label,
        }
    }

    /// Escalation rank; unrecognized tiers rank below every known tier.
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Other(_) => 0,
            Self::PeringatanTertulis => 1,
            Self::Sp1 => 2,
            Self::Sp2 => 3,
        }
    }

    pub const fn tone(&self) -> SanctionTone {
        match self {
            Self::PeringatanTertulis => SanctionTone::Warning,
            Self::Sp1 => SanctionTone::Danger,
            Self::Sp2 => SanctionTone::Critical,
            Self::Other(_) => SanctionTone::Neutral,
        }
    }
}

impl From<String> for SanctionType {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("peringatan tertulis") {
            Self::PeringatanTertulis
        } else if trimmed.eq_ignore_ascii_case("sp1") {
            Self::Sp1
        } else if trimmed.eq_ignore_ascii_case("sp2") {
            Self::Sp2
        } else {
            Self::Other(value)
        }
    }
}

impl From<SanctionType> for String {
    fn from(value: SanctionType) -> Self {
        match value {
            SanctionType::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for SanctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Presentation hint consumed by the list renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanctionTone {
    Warning,
    Danger,
    Critical,
    Neutral,
}

impl SanctionTone {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Danger => "Danger",
            Self::Critical => "Critical",
            Self::Neutral => "Neutral",
        }
    }
}

/// A single recorded violation attributed to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub employee_name: String,
    pub violation_date: NaiveDate,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSanction {
    pub id: String,
    pub employee_name: String,
    pub sanction_type: SanctionType,
    pub sanction_date: NaiveDate,
    pub violation_details: String,
}
