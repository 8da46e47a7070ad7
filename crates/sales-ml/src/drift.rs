use crate::severity::{combined_severity, severity_from_accuracy_drop, severity_from_psi, DriftSeverity};
use crate::stats::{ks_p_value, ks_statistic, population_stability_index};

/// Drift comparison result for one model over one rolling window (§3's
/// data model). Immutable once produced; keyed for persistence by
/// `(model_id, generated_at)` (spec.md:225).
#[derive(Debug, Clone)]
pub struct DriftReport {
    pub model_id: String,
    pub ks_statistic: f64,
    pub p_value: f64,
    pub psi: f64,
    pub accuracy_drop_pp: f64,
    pub affected_features: Vec<String>,
    pub severity: DriftSeverity,
    pub generated_at: String,
}

impl DriftReport {
    pub fn requires_retraining(&self) -> bool {
        self.severity.requires_retraining()
    }
}

/// One model's baseline distribution, established at deployment (§4.10).
/// `feature_name` identifies which tracked feature (or `"output"` for the
/// model's output distribution) this baseline covers.
#[derive(Debug, Clone)]
pub struct BaselineDistribution {
    pub model_id: String,
    pub feature_name: String,
    pub feature_samples: Vec<f64>,
    pub accuracy: f64,
}

/// Compares a model's current window against its deployment baseline
/// (§4.10). Pure function — the rolling-window aggregation itself is the
/// caller's responsibility (orchestrator telemetry → aggregator).
pub struct DriftDetector {
    pub psi_threshold: f64,
    pub accuracy_drop_threshold_pp: f64,
}

impl DriftDetector {
    pub fn new(psi_threshold: f64, accuracy_drop_threshold_pp: f64) -> Self {
        Self { psi_threshold, accuracy_drop_threshold_pp }
    }

    pub fn evaluate(
        &self,
        baseline: &BaselineDistribution,
        current_samples: &[f64],
        current_accuracy: f64,
        generated_at: &str,
    ) -> DriftReport {
        let ks = ks_statistic(&baseline.feature_samples, current_samples);
        let p_value = ks_p_value(&baseline.feature_samples, current_samples, ks);
        let psi = population_stability_index(&baseline.feature_samples, current_samples, 10);
        let accuracy_drop_pp = ((baseline.accuracy - current_accuracy) * 100.0).max(0.0);
        let severity = combined_severity(psi, accuracy_drop_pp, self.psi_threshold, self.accuracy_drop_threshold_pp);

        let mut affected_features = Vec::new();
        if severity_from_psi(psi, self.psi_threshold) > DriftSeverity::None {
            affected_features.push(baseline.feature_name.clone());
        }
        if severity_from_accuracy_drop(accuracy_drop_pp, self.accuracy_drop_threshold_pp) > DriftSeverity::None {
            affected_features.push("realized_accuracy".to_string());
        }

        DriftReport {
            model_id: baseline.model_id.clone(),
            ks_statistic: ks,
            p_value,
            psi,
            accuracy_drop_pp,
            affected_features,
            severity,
            generated_at: generated_at.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_model_has_no_drift() {
        let detector = DriftDetector::new(0.25, 10.0);
        let baseline = BaselineDistribution {
            model_id: "conversion-v1".to_string(),
            feature_name: "confidence".to_string(),
            feature_samples: vec![0.4, 0.5, 0.6, 0.5, 0.4, 0.6],
            accuracy: 0.8,
        };
        let report = detector.evaluate(&baseline, &[0.45, 0.5, 0.55, 0.5, 0.45, 0.55], 0.79, "2026-01-01T00:00:00Z");
        assert_eq!(report.severity, DriftSeverity::None);
        assert!(!report.requires_retraining());
        assert!(report.affected_features.is_empty());
        assert_eq!(report.generated_at, "2026-01-01T00:00:00Z");
    }

    #[test]
    fn severe_accuracy_drop_requires_retraining() {
        let detector = DriftDetector::new(0.25, 10.0);
        let baseline = BaselineDistribution {
            model_id: "conversion-v1".to_string(),
            feature_name: "confidence".to_string(),
            feature_samples: vec![0.5; 20],
            accuracy: 0.85,
        };
        let report = detector.evaluate(&baseline, &vec![0.5; 20], 0.60, "2026-01-01T00:00:00Z");
        assert!(report.requires_retraining());
        assert!(report.affected_features.contains(&"realized_accuracy".to_string()));
    }

    #[test]
    fn p_value_is_well_formed_probability() {
        let detector = DriftDetector::new(0.25, 10.0);
        let baseline = BaselineDistribution {
            model_id: "conversion-v1".to_string(),
            feature_name: "confidence".to_string(),
            feature_samples: vec![0.1, 0.2, 0.3, 0.4, 0.5],
            accuracy: 0.8,
        };
        let report = detector.evaluate(&baseline, &[0.6, 0.7, 0.8, 0.9, 1.0], 0.8, "2026-01-01T00:00:00Z");
        assert!((0.0..=1.0).contains(&report.p_value));
    }
}
