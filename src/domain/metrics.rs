//! Metrics - Plant Telemetry Snapshots

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// One observation of plant telemetry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct MetricsSnapshot {
    /// Source timestamp (ISO-8601), if the producer supplied one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// CO₂ emissions in tons
    pub co2_emissions: f64,
    /// Waste level in percent
    pub waste_level: f64,
    /// Energy usage in kWh
    pub energy_usage: f64,
}

/// Wire form: numeric fields may be absent or null and default to zero.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    co2_emissions: Option<f64>,
    #[serde(default)]
    waste_level: Option<f64>,
    #[serde(default)]
    energy_usage: Option<f64>,
}

impl From<RawSnapshot> for MetricsSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        if raw.co2_emissions.is_none() || raw.waste_level.is_none() || raw.energy_usage.is_none() {
            tracing::debug!("Snapshot missing numeric fields, defaulting to 0");
        }
        Self {
            timestamp: raw.timestamp,
            co2_emissions: raw.co2_emissions.unwrap_or_default(),
            waste_level: raw.waste_level.unwrap_or_default(),
            energy_usage: raw.energy_usage.unwrap_or_default(),
        }
    }
}

impl MetricsSnapshot {
    pub fn new(co2_emissions: f64, waste_level: f64, energy_usage: f64) -> Self {
        Self {
            timestamp: None,
            co2_emissions,
            waste_level,
            energy_usage,
        }
    }

    /// Decode one feed payload
    ///
    /// The payload must be a JSON object. Missing or null metrics become `0`;
    /// values of the wrong type are rejected.
    pub fn decode(payload: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(payload.trim()).map_err(|e| Error::Decode {
                message: format!("invalid metrics payload: {e}"),
            })?;
        if !value.is_object() {
            return Err(Error::Decode {
                message: "metrics payload is not a JSON object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| Error::Decode {
            message: format!("invalid metrics payload: {e}"),
        })
    }

    /// Value of a single metric
    pub fn value(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::Co2Emissions => self.co2_emissions,
            MetricKind::WasteLevel => self.waste_level,
            MetricKind::EnergyUsage => self.energy_usage,
        }
    }
}

/// The three tracked metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Co2Emissions,
    WasteLevel,
    EnergyUsage,
}

impl MetricKind {
    pub fn all() -> &'static [MetricKind] {
        &[
            MetricKind::Co2Emissions,
            MetricKind::WasteLevel,
            MetricKind::EnergyUsage,
        ]
    }

    /// Card label shown next to the value
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Co2Emissions => "CO₂ Emissions (tons)",
            MetricKind::WasteLevel => "Waste Level (%)",
            MetricKind::EnergyUsage => "Energy Usage (kWh)",
        }
    }

    /// Threshold pair `(medium, high)`
    pub fn thresholds(&self) -> (f64, f64) {
        match self {
            MetricKind::Co2Emissions => (130.0, 150.0),
            MetricKind::WasteLevel => (40.0, 50.0),
            MetricKind::EnergyUsage => (15000.0, 17000.0),
        }
    }
}

/// Severity band of a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Normal,
    Elevated,
    High,
}

impl Level {
    pub fn of(kind: MetricKind, value: f64) -> Self {
        let (medium, high) = kind.thresholds();
        if value >= high {
            Level::High
        } else if value >= medium {
            Level::Elevated
        } else {
            Level::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Normal => "normal",
            Level::Elevated => "elevated",
            Level::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let snapshot = MetricsSnapshot::decode(
            r#"{"timestamp":"2025-10-01 12:00:00","co2_emissions":105,"waste_level":75,"energy_usage":13500}"#,
        )
        .expect("decode");
        assert_eq!(snapshot.co2_emissions, 105.0);
        assert_eq!(snapshot.waste_level, 75.0);
        assert_eq!(snapshot.energy_usage, 13500.0);
        assert_eq!(snapshot.timestamp.as_deref(), Some("2025-10-01 12:00:00"));
    }

    #[test]
    fn test_decode_defaults_each_missing_field() {
        let payloads = [
            (r#"{"waste_level":75,"energy_usage":13500}"#, MetricKind::Co2Emissions),
            (r#"{"co2_emissions":105,"energy_usage":13500}"#, MetricKind::WasteLevel),
            (r#"{"co2_emissions":105,"waste_level":75}"#, MetricKind::EnergyUsage),
            (r#"{"co2_emissions":105,"waste_level":75,"energy_usage":null}"#, MetricKind::EnergyUsage),
        ];
        for (payload, missing) in payloads {
            let snapshot = MetricsSnapshot::decode(payload).expect("decode");
            assert_eq!(snapshot.value(missing), 0.0, "{payload}");
        }
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        assert!(MetricsSnapshot::decode("not json").is_err());
        assert!(MetricsSnapshot::decode("[1,2,3]").is_err());
        assert!(MetricsSnapshot::decode(r#"{"co2_emissions":"high"}"#).is_err());
    }

    #[test]
    fn test_serialize_omits_missing_timestamp() {
        let json = serde_json::to_value(MetricsSnapshot::new(1.0, 2.0, 3.0)).expect("json");
        assert!(json.get("timestamp").is_none());
        assert_eq!(json["energy_usage"], 3.0);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Level::of(MetricKind::Co2Emissions, 105.0), Level::Normal);
        assert_eq!(Level::of(MetricKind::Co2Emissions, 130.0), Level::Elevated);
        assert_eq!(Level::of(MetricKind::WasteLevel, 75.0), Level::High);
        assert_eq!(Level::of(MetricKind::EnergyUsage, 16999.9), Level::Elevated);
    }
}
