//! Volume, sentiment, and entity anomaly detection
//!
//! Grounded on `intelligence/anomalies.py::AnomalyDetector`. The volume
//! spike check intentionally double-counts the trailing 6h window inside
//! the 7-day average — this is preserved from the original rather than
//! fixed, per the design note against quietly diverging from validated
//! baseline behavior.

use amonhen_core_types::Result;
use amonhen_models::NarrativeCluster;
use amonhen_store::MetaStore;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyRecord {
    VolumeSpike {
        cluster_id: String,
        cluster_label: String,
        recent_6h_count: usize,
        avg_hourly_7d: f64,
        spike_ratio: f64,
    },
    SentimentShift {
        cluster_id: String,
        cluster_label: String,
        sentiment_before: f64,
        sentiment_after: f64,
        shift: f64,
    },
    EntitySurge {
        entity_name: String,
        count_6h: usize,
    },
}

impl AnomalyRecord {
    pub fn description(&self) -> String {
        match self {
            AnomalyRecord::VolumeSpike {
                cluster_label,
                recent_6h_count,
                avg_hourly_7d,
                ..
            } => format!(
                "Volume spike in '{cluster_label}': {recent_6h_count} items in 6h vs {avg_hourly_7d:.1}/h avg"
            ),
            AnomalyRecord::SentimentShift {
                cluster_label,
                sentiment_before,
                sentiment_after,
                shift,
                ..
            } => format!(
                "Sentiment shift in '{cluster_label}': {sentiment_before:.2} -> {sentiment_after:.2} ({}{shift:.2})",
                if *shift > 0.0 { "+" } else { "" }
            ),
            AnomalyRecord::EntitySurge { entity_name, count_6h } => {
                format!("Entity surge: '{entity_name}' in {count_6h} items in 6h")
            }
        }
    }
}

pub struct AnomalyDetector;

impl AnomalyDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect_volume_spikes(
        &self,
        clusters: &[NarrativeCluster],
        store: &MetaStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnomalyRecord>> {
        let six_hours_ago = now - Duration::hours(6);
        let seven_days_ago = now - Duration::days(7);
        let mut anomalies = Vec::new();

        for cluster in clusters {
            let items = store.get_items_by_cluster(&cluster.id)?;
            if items.is_empty() {
                continue;
            }

            let recent_count = items.iter().filter(|i| i.published_at >= six_hours_ago).count();
            let week_count = items.iter().filter(|i| i.published_at >= seven_days_ago).count();
            let avg_hourly = if week_count > 0 {
                week_count as f64 / (7.0 * 24.0)
            } else {
                0.0
            };
            let six_hour_rate = recent_count as f64 / 6.0;

            if avg_hourly > 0.0 && six_hour_rate > 3.0 * avg_hourly {
                anomalies.push(AnomalyRecord::VolumeSpike {
                    cluster_id: cluster.id.clone(),
                    cluster_label: cluster.label.clone(),
                    recent_6h_count: recent_count,
                    avg_hourly_7d: round2(avg_hourly),
                    spike_ratio: round2(six_hour_rate / avg_hourly),
                });
            }
        }
        Ok(anomalies)
    }

    pub fn detect_sentiment_shifts(
        &self,
        clusters: &[NarrativeCluster],
        store: &MetaStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnomalyRecord>> {
        let one_day_ago = now - Duration::hours(24);
        let two_days_ago = now - Duration::hours(48);
        let mut anomalies = Vec::new();

        for cluster in clusters {
            let items = store.get_items_by_cluster(&cluster.id)?;
            if items.is_empty() {
                continue;
            }

            let recent: Vec<f64> = items
                .iter()
                .filter(|i| i.published_at >= one_day_ago)
                .map(|i| i.sentiment)
                .collect();
            let older: Vec<f64> = items
                .iter()
                .filter(|i| i.published_at >= two_days_ago && i.published_at < one_day_ago)
                .map(|i| i.sentiment)
                .collect();

            if recent.is_empty() || older.is_empty() {
                continue;
            }

            let avg_recent = recent.iter().sum::<f64>() / recent.len() as f64;
            let avg_older = older.iter().sum::<f64>() / older.len() as f64;
            let shift = avg_recent - avg_older;

            if shift.abs() > 0.5 {
                anomalies.push(AnomalyRecord::SentimentShift {
                    cluster_id: cluster.id.clone(),
                    cluster_label: cluster.label.clone(),
                    sentiment_before: round3(avg_older),
                    sentiment_after: round3(avg_recent),
                    shift: round3(shift),
                });
            }
        }
        Ok(anomalies)
    }

    pub fn detect_entity_surges(&self, store: &MetaStore, now: DateTime<Utc>) -> Result<Vec<AnomalyRecord>> {
        let six_hours_ago = now - Duration::hours(6);
        let recent_items = store.get_items(Some(six_hours_ago), 1000, None)?;

        let mut entity_counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for item in &recent_items {
            for entity in &item.entities {
                *entity_counts.entry(entity.name.clone()).or_insert(0) += 1;
            }
        }

        Ok(entity_counts
            .into_iter()
            .filter(|(_, count)| *count > 10)
            .map(|(entity_name, count_6h)| AnomalyRecord::EntitySurge { entity_name, count_6h })
            .collect())
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_spike_description_matches_format() {
        let record = AnomalyRecord::VolumeSpike {
            cluster_id: "c1".to_string(),
            cluster_label: "Flood Response".to_string(),
            recent_6h_count: 42,
            avg_hourly_7d: 2.5,
            spike_ratio: 16.8,
        };
        assert_eq!(
            record.description(),
            "Volume spike in 'Flood Response': 42 items in 6h vs 2.5/h avg"
        );
    }

    #[test]
    fn sentiment_shift_description_includes_sign() {
        let record = AnomalyRecord::SentimentShift {
            cluster_id: "c1".to_string(),
            cluster_label: "Election Coverage".to_string(),
            sentiment_before: -0.2,
            sentiment_after: 0.4,
            shift: 0.6,
        };
        assert_eq!(
            record.description(),
            "Sentiment shift in 'Election Coverage': -0.20 -> 0.40 (+0.60)"
        );
    }

    #[test]
    fn entity_surge_description_matches_format() {
        let record = AnomalyRecord::EntitySurge {
            entity_name: "Acme Corp".to_string(),
            count_6h: 15,
        };
        assert_eq!(record.description(), "Entity surge: 'Acme Corp' in 15 items in 6h");
    }
}
