use super::domain::{ComplaintChannel, RawComplaintRow};
use super::weights::WeightTable;
use serde::Serialize;

/// Weighted contribution of one channel, kept for audit output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelContribution {
    pub channel: ComplaintChannel,
    pub channel_label: &'static str,
    pub count: u32,
    pub weight: f64,
    pub weighted: f64,
}

/// Per-channel breakdown in the fixed channel order.
pub fn channel_breakdown(row: &RawComplaintRow, weights: &WeightTable) -> Vec<ChannelContribution> {
    ComplaintChannel::ordered()
        .into_iter()
        .map(|channel| {
            let count = row.count(channel);
            let weight = weights.resolve(channel.key());
            ChannelContribution {
                channel,
                channel_label: channel.label(),
                count,
                weight,
                weighted: f64::from(count) * weight,
            }
        })
        .collect()
}

/// Σ count × weight over the five fixed channels.
pub fn weighted_complaints(row: &RawComplaintRow, weights: &WeightTable) -> f64 {
    ComplaintChannel::ordered()
        .into_iter()
        .map(|channel| f64::from(row.count(channel)) * weights.resolve(channel.key()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::weights::ComplaintWeight;

    fn weights() -> WeightTable {
        WeightTable::with_neutral_default(vec![
            ComplaintWeight::new("whatsapp", 2.0),
            ComplaintWeight::new("social_media", 1.0),
            ComplaintWeight::new("gmaps", 1.0),
            ComplaintWeight::new("online_order", 3.0),
            ComplaintWeight::new("late_handling", 5.0),
        ])
        .expect("valid weights")
    }

    #[test]
    fn sums_weighted_channel_counts() {
        let row = RawComplaintRow {
            whatsapp_count: 10,
            social_media_count: 5,
            gmaps_count: 0,
            online_order_count: 2,
            late_handling_count: 1,
        };

        assert_eq!(weighted_complaints(&row, &weights()), 36.0);
    }

    #[test]
    fn empty_row_totals_zero() {
        assert_eq!(weighted_complaints(&RawComplaintRow::default(), &weights()), 0.0);
    }

    #[test]
    fn unconfigured_channels_use_default_weight() {
        let table = WeightTable::with_neutral_default(vec![ComplaintWeight::new("WhatsApp", 2.0)])
            .expect("valid weights");
        let row = RawComplaintRow {
            whatsapp_count: 3,
            late_handling_count: 4,
            ..RawComplaintRow::default()
        };

        assert_eq!(weighted_complaints(&row, &table), 10.0);
    }

    #[test]
    fn breakdown_matches_total() {
        let row = RawComplaintRow {
            whatsapp_count: 10,
            social_media_count: 5,
            gmaps_count: 0,
            online_order_count: 2,
            late_handling_count: 1,
        };
        let table = weights();
        let breakdown = channel_breakdown(&row, &table);

        assert_eq!(breakdown.len(), 5);
        assert_eq!(breakdown[3].channel, ComplaintChannel::OnlineOrder);
        assert_eq!(breakdown[3].weighted, 6.0);
        let total: f64 = breakdown.iter().map(|entry| entry.weighted).sum();
        assert_eq!(total, weighted_complaints(&row, &table));
    }
}
