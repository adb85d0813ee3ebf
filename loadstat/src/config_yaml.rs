use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use loadstat_core::{Thresholds, ThresholdsConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ConfigYaml {
    #[serde(default)]
    pub thresholds: ThresholdsYaml,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct ThresholdsYaml {
    pub min_success_rate_percent: Option<f64>,
    pub max_average_response_time_ms: Option<YamlMillis>,
    pub max_p90_ms: Option<YamlMillis>,
    pub max_p95_ms: Option<YamlMillis>,
    pub max_p99_ms: Option<YamlMillis>,
    pub min_throughput_per_second: Option<f64>,
    pub max_error_count: Option<u64>,
}

impl From<ThresholdsYaml> for ThresholdsConfig {
    fn from(y: ThresholdsYaml) -> Self {
        let ms = |v: Option<YamlMillis>| v.map(|v| v.0);
        Self {
            min_success_rate_percent: y.min_success_rate_percent,
            max_average_response_time_ms: ms(y.max_average_response_time_ms),
            max_p90_ms: ms(y.max_p90_ms),
            max_p95_ms: ms(y.max_p95_ms),
            max_p99_ms: ms(y.max_p99_ms),
            min_throughput_per_second: y.min_throughput_per_second,
            max_error_count: y.max_error_count,
        }
    }
}

/// Milliseconds given as a number (`250`) or a duration string (`250ms`, `1s 500ms`).
/// Range checks happen in [`Thresholds::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct YamlMillis(f64);

impl<'de> Deserialize<'de> for YamlMillis {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;

        impl serde::de::Visitor<'_> for V {
            type Value = YamlMillis;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("milliseconds as a number (e.g. 250) or a duration string (e.g. 250ms)")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlMillis(v as f64))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlMillis(v as f64))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(YamlMillis(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let d: Duration = humantime::parse_duration(v.trim()).map_err(E::custom)?;
                Ok(YamlMillis(d.as_secs_f64() * 1000.0))
            }
        }

        deserializer.deserialize_any(V)
    }
}

pub(crate) fn parse_thresholds(text: &str) -> anyhow::Result<Thresholds> {
    let cfg: ConfigYaml = serde_yaml::from_str(text).context("invalid config YAML")?;
    Ok(Thresholds::new(cfg.thresholds.into())?)
}

pub(crate) fn load_thresholds(path: &Path) -> anyhow::Result<Thresholds> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_thresholds(&text).with_context(|| format!("config: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadstat_core::{MetricsSnapshot, ThresholdMetric};

    #[test]
    fn parses_numbers_and_duration_strings() {
        let y: ConfigYaml = serde_yaml::from_str(
            "thresholds:\n  minSuccessRatePercent: 99.5\n  maxP95Ms: 500\n  maxP99Ms: 1s 500ms\n  maxAverageResponseTimeMs: 250ms\n",
        )
        .unwrap_or_else(|e| panic!("{e}"));

        let cfg = ThresholdsConfig::from(y.thresholds);
        assert_eq!(cfg.min_success_rate_percent, Some(99.5));
        assert_eq!(cfg.max_p95_ms, Some(500.0));
        assert_eq!(cfg.max_p99_ms, Some(1_500.0));
        assert_eq!(cfg.max_average_response_time_ms, Some(250.0));
        assert_eq!(cfg.max_p90_ms, None);
    }

    #[test]
    fn thresholds_are_validated_once_parsed() {
        let err = match parse_thresholds("thresholds:\n  minSuccessRatePercent: 150\n") {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(format!("{err:#}").contains("success_rate_percent"));
    }

    #[test]
    fn out_of_range_latency_limits_are_rejected() {
        for doc in [
            "thresholds:\n  maxP95Ms: -5\n",
            "thresholds:\n  maxP90Ms: .nan\n",
            "thresholds:\n  maxP99Ms: .inf\n",
            "thresholds:\n  maxAverageResponseTimeMs: -5\n",
        ] {
            let err = match parse_thresholds(doc) {
                Ok(_) => panic!("accepted {doc:?}"),
                Err(e) => e,
            };
            assert!(format!("{err:#}").contains("invalid threshold"), "{err:#}");
        }
    }

    #[test]
    fn fractional_latency_limits_are_kept() {
        let t = parse_thresholds("thresholds:\n  maxP95Ms: 450.5\n")
            .unwrap_or_else(|e| panic!("{e}"));
        let s = MetricsSnapshot {
            p95: 450,
            ..MetricsSnapshot::default()
        };
        assert!(t.evaluate(&s).is_empty());

        let s = MetricsSnapshot { p95: 451, ..s };
        assert_eq!(t.evaluate(&s).len(), 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_thresholds("thresholds:\n  maxP50Ms: 10\n").is_err());
        assert!(parse_thresholds("limits: {}\n").is_err());
    }

    #[test]
    fn empty_document_means_no_thresholds() {
        let t = parse_thresholds("{}").unwrap_or_else(|e| panic!("{e}"));
        assert!(t.is_empty());

        let t = parse_thresholds("thresholds:\n  maxErrorCount: 0\n")
            .unwrap_or_else(|e| panic!("{e}"));
        let s = MetricsSnapshot {
            error_count: 1,
            ..MetricsSnapshot::default()
        };
        let v = t.evaluate(&s);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].metric, ThresholdMetric::ErrorCount);
    }
}
