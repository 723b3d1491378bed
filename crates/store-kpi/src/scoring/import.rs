use super::domain::{SanctionType, ValidationError};
use super::sanctions::{SanctionPolicy, SanctionTier};
use super::weights::{ComplaintWeight, WeightTable};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// Failure while loading weight or sanction-policy tables.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read configuration table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct WeightRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    channel: Option<String>,
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct TierRow {
    min_violations: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    sanction_type: Option<String>,
}

/// Reads a `channel,weight` table. Rows with a blank channel are skipped.
pub fn weight_table_from_reader<R: Read>(
    reader: R,
    default_weight: f64,
) -> Result<WeightTable, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut weights = Vec::new();

    for record in csv_reader.deserialize::<WeightRow>() {
        let row = record?;
        if let Some(channel) = row.channel {
            weights.push(ComplaintWeight::new(channel, row.weight));
        }
    }

    Ok(WeightTable::new(weights, default_weight)?)
}

pub fn weight_table_from_path<P: AsRef<Path>>(
    path: P,
    default_weight: f64,
) -> Result<WeightTable, ImportError> {
    let file = std::fs::File::open(path)?;
    weight_table_from_reader(file, default_weight)
}

/// Reads a `min_violations,sanction_type` table.
pub fn sanction_policy_from_reader<R: Read>(
    reader: R,
    lookback_months: u32,
) -> Result<SanctionPolicy, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut tiers = Vec::new();

    for record in csv_reader.deserialize::<TierRow>() {
        let row = record?;
        if let Some(label) = row.sanction_type {
            tiers.push(SanctionTier::new(
                row.min_violations,
                SanctionType::from(label),
            ));
        }
    }

    Ok(SanctionPolicy::new(tiers, lookback_months))
}

pub fn sanction_policy_from_path<P: AsRef<Path>>(
    path: P,
    lookback_months: u32,
) -> Result<SanctionPolicy, ImportError> {
    let file = std::fs::File::open(path)?;
    sanction_policy_from_reader(file, lookback_months)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_weight_table_from_csv() {
        let csv = "channel,weight\nWhatsApp,2\n social_media , 1.5\n,9\nlate_handling,5\n";
        let table = weight_table_from_reader(Cursor::new(csv), 1.0).expect("table loads");

        assert_eq!(table.weights().len(), 3);
        assert_eq!(table.resolve("whatsapp"), 2.0);
        assert_eq!(table.resolve("social_media"), 1.5);
        assert_eq!(table.resolve("gmaps"), 1.0);
    }

    #[test]
    fn rejects_malformed_weight_values() {
        let csv = "channel,weight\nwhatsapp,heavy\n";
        assert!(matches!(
            weight_table_from_reader(Cursor::new(csv), 1.0),
            Err(ImportError::Csv(_))
        ));

        let negative = "channel,weight\nwhatsapp,-2\n";
        assert!(matches!(
            weight_table_from_reader(Cursor::new(negative), 1.0),
            Err(ImportError::Invalid(ValidationError::InvalidWeight { .. }))
        ));
    }

    #[test]
    fn loads_sanction_policy_from_csv() {
        let csv = "min_violations,sanction_type\n4,SP2\n1,Peringatan Tertulis\n2,SP1\n";
        let policy = sanction_policy_from_reader(Cursor::new(csv), 6).expect("policy loads");

        assert_eq!(policy.lookback_months(), 6);
        let ladder: Vec<(u32, &str)> = policy
            .tiers()
            .iter()
            .map(|tier| (tier.min_violations, tier.sanction_type.label()))
            .collect();
        assert_eq!(
            ladder,
            vec![(1, "Peringatan Tertulis"), (2, "SP1"), (4, "SP2")]
        );
    }

    #[test]
    fn missing_file_surfaces_io_error() {
        let result = weight_table_from_path("/nonexistent/weights.csv", 1.0);
        assert!(matches!(result, Err(ImportError::Io(_))));
    }
}
