/// Drift severity classification (§4.10): "any one sufficient" — the
/// worse of the PSI-derived and accuracy-derived severities wins. Five
/// levels per §3's `DriftReport` data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DriftSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl DriftSeverity {
    pub fn requires_retraining(self) -> bool {
        matches!(self, DriftSeverity::High | DriftSeverity::Critical)
    }
}

pub(crate) fn severity_from_psi(psi: f64, critical_threshold: f64) -> DriftSeverity {
    if psi >= critical_threshold {
        DriftSeverity::Critical
    } else if psi >= critical_threshold * 0.6 {
        DriftSeverity::High
    } else if psi >= 0.1 {
        DriftSeverity::Medium
    } else if psi > 0.0 {
        DriftSeverity::Low
    } else {
        DriftSeverity::None
    }
}

pub(crate) fn severity_from_accuracy_drop(accuracy_drop_pp: f64, critical_drop_pp: f64) -> DriftSeverity {
    if accuracy_drop_pp >= critical_drop_pp {
        DriftSeverity::Critical
    } else if accuracy_drop_pp >= 5.0 {
        DriftSeverity::High
    } else if accuracy_drop_pp >= 2.0 {
        DriftSeverity::Medium
    } else if accuracy_drop_pp > 0.0 {
        DriftSeverity::Low
    } else {
        DriftSeverity::None
    }
}

/// Combines the PSI-derived and accuracy-derived severities, taking the
/// worse of the two (§4.10: "PSI >= 0.25 or accuracy drop >= 10pp =>
/// critical; PSI >= 0.15 or 5-10pp drop => high; else scaled").
pub fn combined_severity(psi: f64, accuracy_drop_pp: f64, psi_threshold: f64, accuracy_drop_threshold_pp: f64) -> DriftSeverity {
    severity_from_psi(psi, psi_threshold).max(severity_from_accuracy_drop(accuracy_drop_pp, accuracy_drop_threshold_pp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_psi_alone_is_critical() {
        assert_eq!(combined_severity(0.3, 0.0, 0.25, 10.0), DriftSeverity::Critical);
    }

    #[test]
    fn moderate_accuracy_drop_alone_is_high() {
        assert_eq!(combined_severity(0.0, 7.0, 0.25, 10.0), DriftSeverity::High);
    }

    #[test]
    fn no_signal_is_none() {
        assert_eq!(combined_severity(0.0, 0.0, 0.25, 10.0), DriftSeverity::None);
    }

    #[test]
    fn small_nonzero_psi_is_low() {
        assert_eq!(combined_severity(0.02, 0.0, 0.25, 10.0), DriftSeverity::Low);
    }

    #[test]
    fn psi_past_moderate_threshold_is_medium() {
        assert_eq!(combined_severity(0.12, 0.0, 0.25, 10.0), DriftSeverity::Medium);
    }

    #[test]
    fn requires_retraining_only_for_high_and_critical() {
        assert!(!DriftSeverity::None.requires_retraining());
        assert!(!DriftSeverity::Low.requires_retraining());
        assert!(!DriftSeverity::Medium.requires_retraining());
        assert!(DriftSeverity::High.requires_retraining());
        assert!(DriftSeverity::Critical.requires_retraining());
    }
}
