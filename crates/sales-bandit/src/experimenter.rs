use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use sales_core::types::{ExperimentId, VariantId};

use crate::error::{BanditError, Result};
use crate::stats::{one_sided_two_proportion_p_value, ucb1_score};
use crate::types::{ExperimentDefinition, ExperimentStatus, VariantArm};

/// Everything mutated while holding one experiment's lock — grouped so the
/// read-compute-increment triple in §4.6 stays atomic under a single
/// `Mutex` per experiment, rather than one lock shared across all of them.
struct ArmState {
    arms: HashMap<VariantId, VariantArm>,
    status: ExperimentStatus,
    rewarded_sessions: HashSet<String>,
}

/// Runs UCB1 variant assignment and reward tracking for a fixed set of
/// experiments (§4.6). Experiments are defined at construction time and
/// never added afterward, matching §9's "loaded at startup into an
/// immutable map" resolution.
pub struct Experimenter {
    definitions: HashMap<ExperimentId, ExperimentDefinition>,
    states: HashMap<ExperimentId, Mutex<ArmState>>,
    defaults: HashMap<ExperimentId, RwLock<VariantId>>,
}

impl Experimenter {
    pub fn new(definitions: Vec<ExperimentDefinition>) -> Self {
        let mut states = HashMap::new();
        let mut defaults = HashMap::new();
        let mut defs = HashMap::new();
        for def in definitions {
            let arms = def
                .variants
                .iter()
                .map(|v| (v.clone(), VariantArm::new(v.clone())))
                .collect();
            states.insert(
                def.experiment_id.clone(),
                Mutex::new(ArmState {
                    arms,
                    status: ExperimentStatus::Active,
                    rewarded_sessions: HashSet::new(),
                }),
            );
            defaults.insert(def.experiment_id.clone(), RwLock::new(def.control.clone()));
            defs.insert(def.experiment_id.clone(), def);
        }
        Self { definitions: defs, states, defaults }
    }

    /// Pick a variant via UCB1 and record the impression. Callers are
    /// expected to have already checked `ConversationState.experiments_assigned`
    /// for an existing assignment (B1) — this call always produces a fresh
    /// impression, it does not itself dedupe by session.
    pub fn assign_variant(&self, experiment_id: &ExperimentId) -> Result<VariantId> {
        let lock = self
            .states
            .get(experiment_id)
            .ok_or_else(|| BanditError::UnknownExperiment(experiment_id.clone()))?;
        let mut state = lock.lock().expect("arm state poisoned");

        // Completed experiments hand out the promoted default directly —
        // no more exploration once a winner is declared.
        if state.status == ExperimentStatus::Completed {
            let default = self.defaults[experiment_id].read().expect("default lock poisoned");
            let winner = default.clone();
            if let Some(arm) = state.arms.get_mut(&winner) {
                arm.impressions += 1;
            }
            return Ok(winner);
        }

        let total_impressions: u64 = state.arms.values().map(|a| a.impressions).sum();
        let mut ranked: Vec<(VariantId, f64)> = state
            .arms
            .values()
            .map(|arm| {
                (arm.variant_id.clone(), ucb1_score(arm.mean_reward(), arm.impressions, total_impressions))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
        let winner = ranked[0].0.clone();
        state.arms.get_mut(&winner).unwrap().impressions += 1;
        Ok(winner)
    }

    /// Record a reward, dropping duplicates for the same session (B2).
    /// Returns `true` if this call recorded a new reward.
    pub fn record_reward(
        &self,
        session_id: &str,
        experiment_id: &ExperimentId,
        variant_id: &VariantId,
        reward: f64,
    ) -> Result<bool> {
        let lock = self
            .states
            .get(experiment_id)
            .ok_or_else(|| BanditError::UnknownExperiment(experiment_id.clone()))?;
        let mut state = lock.lock().expect("arm state poisoned");
        if !state.rewarded_sessions.insert(session_id.to_string()) {
            return Ok(false);
        }
        let arm = state.arms.get_mut(variant_id).ok_or_else(|| BanditError::UnknownVariant {
            experiment_id: experiment_id.clone(),
            variant_id: variant_id.clone(),
        })?;
        arm.reward_sum += reward;
        Ok(true)
    }

    /// Evaluate B3: promote a winning variant to COMPLETED/default once
    /// enough samples exist and it beats control at `confidence_level`.
    /// Call after every `record_reward`.
    pub fn maybe_auto_deploy(&self, experiment_id: &ExperimentId) -> Result<Option<VariantId>> {
        let def = self
            .definitions
            .get(experiment_id)
            .ok_or_else(|| BanditError::UnknownExperiment(experiment_id.clone()))?;
        let lock = &self.states[experiment_id];
        let mut state = lock.lock().expect("arm state poisoned");
        if state.status == ExperimentStatus::Completed {
            return Ok(None);
        }

        let total: u64 = state.arms.values().map(|a| a.impressions).sum();
        if total < def.min_sample_size {
            return Ok(None);
        }

        let control = state.arms.get(&def.control).cloned();
        let Some(control) = control else { return Ok(None) };
        let alpha = 1.0 - def.confidence_level;

        let mut winner: Option<(VariantId, f64)> = None;
        for variant_id in &def.variants {
            if *variant_id == def.control {
                continue;
            }
            let Some(candidate) = state.arms.get(variant_id) else { continue };
            let Some(p_value) = one_sided_two_proportion_p_value(
                candidate.reward_sum,
                candidate.impressions,
                control.reward_sum,
                control.impressions,
            ) else {
                continue;
            };
            if p_value < alpha && candidate.mean_reward() > control.mean_reward() {
                let better = winner
                    .as_ref()
                    .map(|(_, best_mean)| candidate.mean_reward() > *best_mean)
                    .unwrap_or(true);
                if better {
                    winner = Some((candidate.variant_id.clone(), candidate.mean_reward()));
                }
            }
        }

        if let Some((variant_id, _)) = winner.clone() {
            state.status = ExperimentStatus::Completed;
            *self.defaults[experiment_id].write().expect("default lock poisoned") = variant_id.clone();
        }

        Ok(winner.map(|(v, _)| v))
    }

    pub fn status(&self, experiment_id: &ExperimentId) -> Result<ExperimentStatus> {
        let lock = self
            .states
            .get(experiment_id)
            .ok_or_else(|| BanditError::UnknownExperiment(experiment_id.clone()))?;
        Ok(lock.lock().expect("arm state poisoned").status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn experimenter() -> (Experimenter, ExperimentId) {
        let experiment_id: ExperimentId = "greeting".into();
        let def = ExperimentDefinition {
            experiment_id: experiment_id.clone(),
            control: "A".into(),
            variants: vec!["A".into(), "B".into()],
            min_sample_size: 20,
            confidence_level: 0.95,
        };
        (Experimenter::new(vec![def]), experiment_id)
    }

    #[test]
    fn unseen_arms_are_explored_before_exploitation() {
        let (exp, id) = experimenter();
        let first = exp.assign_variant(&id).unwrap();
        let second = exp.assign_variant(&id).unwrap();
        let mut seen = vec![first, second];
        seen.sort();
        assert_eq!(seen, vec![VariantId::from("A"), VariantId::from("B")]);
    }

    #[test]
    fn reward_is_recorded_once_per_session() {
        let (exp, id) = experimenter();
        let variant: VariantId = "A".into();
        assert!(exp.record_reward("s1", &id, &variant, 1.0).unwrap());
        assert!(!exp.record_reward("s1", &id, &variant, 1.0).unwrap());
    }

    #[test]
    fn auto_deploy_promotes_clear_winner() {
        let (exp, id) = experimenter();
        for _ in 0..100 {
            exp.assign_variant(&id).unwrap();
        }
        for i in 0..40 {
            exp.record_reward(&format!("a{i}"), &id, &"A".into(), if i < 5 { 1.0 } else { 0.0 })
                .unwrap();
        }
        for i in 0..40 {
            exp.record_reward(&format!("b{i}"), &id, &"B".into(), if i < 30 { 1.0 } else { 0.0 })
                .unwrap();
        }
        let winner = exp.maybe_auto_deploy(&id).unwrap();
        assert_eq!(winner, Some(VariantId::from("B")));
        assert_eq!(exp.status(&id).unwrap(), ExperimentStatus::Completed);
    }
}
