/// UCB1 score for one arm (§4.6). `impressions == 0` scores `+inf` to
/// force exploration before any statistics exist.
pub fn ucb1_score(mean_reward: f64, impressions: u64, total_impressions: u64) -> f64 {
    if impressions == 0 {
        return f64::INFINITY;
    }
    let exploration = (2.0 * (total_impressions.max(1) as f64).ln() / impressions as f64).sqrt();
    mean_reward + exploration
}

/// Abramowitz & Stegun 7.1.26 approximation of the error function, used to
/// turn a z-score into a one-sided p-value without pulling in a stats crate.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// One-sided two-proportion z-test: is `treatment`'s conversion rate
/// greater than `control`'s? Returns the one-sided p-value (§4.6: "must
/// outperform the control... with p-value below 1 - confidence_level").
/// `None` when either arm has too few impressions to form a pooled
/// estimate.
pub fn one_sided_two_proportion_p_value(
    treatment_successes: f64,
    treatment_n: u64,
    control_successes: f64,
    control_n: u64,
) -> Option<f64> {
    if treatment_n == 0 || control_n == 0 {
        return None;
    }
    let p1 = treatment_successes / treatment_n as f64;
    let p2 = control_successes / control_n as f64;
    let pooled = (treatment_successes + control_successes) / (treatment_n + control_n) as f64;
    let se = (pooled * (1.0 - pooled) * (1.0 / treatment_n as f64 + 1.0 / control_n as f64)).sqrt();
    if se == 0.0 {
        return if p1 > p2 { Some(0.0) } else { Some(1.0) };
    }
    let z = (p1 - p2) / se;
    if z <= 0.0 {
        return Some(1.0);
    }
    Some(1.0 - standard_normal_cdf(z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_impressions_forces_exploration() {
        assert_eq!(ucb1_score(0.0, 0, 10), f64::INFINITY);
    }

    #[test]
    fn more_impressions_shrinks_exploration_bonus() {
        let early = ucb1_score(0.5, 2, 20);
        let late = ucb1_score(0.5, 18, 20);
        assert!(early > late);
    }

    #[test]
    fn clear_winner_has_small_p_value() {
        let p = one_sided_two_proportion_p_value(600.0, 1000, 400.0, 1000).unwrap();
        assert!(p < 0.001);
    }

    #[test]
    fn no_difference_has_large_p_value() {
        let p = one_sided_two_proportion_p_value(500.0, 1000, 500.0, 1000).unwrap();
        assert!(p > 0.4);
    }

    #[test]
    fn worse_treatment_yields_p_value_one() {
        let p = one_sided_two_proportion_p_value(400.0, 1000, 600.0, 1000).unwrap();
        assert_eq!(p, 1.0);
    }
}
