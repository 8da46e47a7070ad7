/// Two-sample Kolmogorov-Smirnov statistic: the maximum gap between the
/// two samples' empirical CDFs (§4.10's "data drift" test). Returns 0.0
/// when either sample is empty.
pub fn ks_statistic(baseline: &[f64], current: &[f64]) -> f64 {
    if baseline.is_empty() || current.is_empty() {
        return 0.0;
    }
    let mut points: Vec<f64> = baseline.iter().chain(current.iter()).copied().collect();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut a = baseline.to_vec();
    let mut b = current.to_vec();
    a.sort_by(|x, y| x.partial_cmp(y).unwrap());
    b.sort_by(|x, y| x.partial_cmp(y).unwrap());

    let cdf_at = |sorted: &[f64], x: f64| -> f64 {
        let count = sorted.iter().filter(|&&v| v <= x).count();
        count as f64 / sorted.len() as f64
    };

    points
        .into_iter()
        .map(|x| (cdf_at(&a, x) - cdf_at(&b, x)).abs())
        .fold(0.0, f64::max)
}

/// Asymptotic two-sample KS p-value for a given `d_statistic` (the
/// Kolmogorov distribution via the Marsaglia-Wang-Jan series). Returns 1.0
/// for empty samples (no evidence of drift).
pub fn ks_p_value(baseline: &[f64], current: &[f64], d_statistic: f64) -> f64 {
    let n1 = baseline.len() as f64;
    let n2 = current.len() as f64;
    if n1 == 0.0 || n2 == 0.0 {
        return 1.0;
    }
    let n_eff = (n1 * n2) / (n1 + n2);
    let lambda = (n_eff.sqrt() + 0.12 + 0.11 / n_eff.sqrt()) * d_statistic;

    let mut sum = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * (k as f64).powi(2) * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Population Stability Index between a baseline and current distribution,
/// binned into `bins` equal-width buckets spanning both samples' range.
/// PSI < 0.1 = no drift, 0.1..0.25 = moderate, >= 0.25 = significant.
pub fn population_stability_index(baseline: &[f64], current: &[f64], bins: usize) -> f64 {
    if baseline.is_empty() || current.is_empty() || bins == 0 {
        return 0.0;
    }
    let all_min = baseline
        .iter()
        .chain(current.iter())
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let all_max = baseline
        .iter()
        .chain(current.iter())
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    if (all_max - all_min).abs() < f64::EPSILON {
        return 0.0;
    }

    let width = (all_max - all_min) / bins as f64;
    let bucket_of = |v: f64| -> usize {
        (((v - all_min) / width) as usize).min(bins - 1)
    };

    let mut baseline_counts = vec![0usize; bins];
    for &v in baseline {
        baseline_counts[bucket_of(v)] += 1;
    }
    let mut current_counts = vec![0usize; bins];
    for &v in current {
        current_counts[bucket_of(v)] += 1;
    }

    let epsilon = 1e-6;
    let mut psi = 0.0;
    for i in 0..bins {
        let base_pct = (baseline_counts[i] as f64 / baseline.len() as f64).max(epsilon);
        let curr_pct = (current_counts[i] as f64 / current.len() as f64).max(epsilon);
        psi += (curr_pct - base_pct) * (curr_pct / base_pct).ln();
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_samples_have_zero_ks_and_psi() {
        let sample = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(ks_statistic(&sample, &sample), 0.0);
        assert!(population_stability_index(&sample, &sample, 5) < 1e-6);
    }

    #[test]
    fn shifted_distribution_has_nonzero_ks() {
        let baseline = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let shifted = vec![5.0, 6.0, 7.0, 8.0, 9.0];
        assert!(ks_statistic(&baseline, &shifted) > 0.5);
    }

    #[test]
    fn large_distribution_shift_has_high_psi() {
        let baseline = vec![1.0; 50];
        let shifted = vec![10.0; 50];
        assert!(population_stability_index(&baseline, &shifted, 10) > 0.25);
    }

    #[test]
    fn identical_samples_have_p_value_near_one() {
        let sample = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let d = ks_statistic(&sample, &sample);
        assert!(ks_p_value(&sample, &sample, d) > 0.99);
    }

    #[test]
    fn large_shift_has_small_p_value() {
        let baseline: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let shifted: Vec<f64> = (0..50).map(|i| i as f64 + 100.0).collect();
        let d = ks_statistic(&baseline, &shifted);
        assert!(ks_p_value(&baseline, &shifted, d) < 0.01);
    }
}
