use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use sales_analyzers::{EmotionAnalyzer, EmotionalSignal, TierAnalyzer, TierFeatures};
use sales_bandit::Experimenter;
use sales_breaker::{BreakerRegistry, CircuitBreaker};
use sales_cache::CacheLayer;
use sales_core::config::CoreConfig;
use sales_core::error::{CoreError, Result as CoreResult};
use sales_core::types::{ExperimentId, Outcome, Phase, Role, SessionId, Tier, VariantId};
use sales_empathy::{
    enforce_forward_question, enforce_name_once, enforce_no_repetition, score_empathy,
    ComposerInput, PromptComposer, TemplateCatalogue,
};
use sales_llm::{LlmGateway, LlmParams};
use sales_ml::{MessageExchangeEvent, PredictionRecord, TrackingEvent, TrackingSink};
use sales_predictors::{Features, PredictorOutput, PredictorRegistry, PredictorResult};
use sales_sessions::error::SessionError;
use sales_sessions::types::{ConversationState, CustomerProfile, EmotionalSnapshot, PredictionLogEntry};
use sales_sessions::SessionManager;

use crate::admission::AdmissionControl;
use crate::phase::next_phase;
use crate::types::{MlInsights, SendMessageResponse};

const MAX_USER_MESSAGE_CHARS: usize = 4000;
/// Recent customer turns fed to the predictors/emotion analyzer (§4.4/§4.5
/// both describe a "sliding window", exact width left as an implementation
/// choice).
const TRANSCRIPT_WINDOW: usize = 5;

enum PipelineError {
    Conflict,
    Core(CoreError),
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        PipelineError::Core(e)
    }
}

/// The 11-step state machine of §4.9, wired to every collaborating crate.
/// Holds no per-request state; each `handle_message` call owns its own
/// working copy of `ConversationState` until `SessionManager::save` commits
/// it, the same "aggregate root owned by exactly one invocation at a time"
/// discipline as §9's design note.
pub struct Orchestrator {
    sessions: Arc<SessionManager>,
    cache: Arc<CacheLayer>,
    breakers: Arc<BreakerRegistry>,
    predictors: Arc<PredictorRegistry>,
    experimenter: Arc<Experimenter>,
    catalogue: Arc<TemplateCatalogue>,
    llm: Arc<dyn LlmGateway>,
    fallback_llm: Arc<dyn LlmGateway>,
    tracking: Arc<dyn TrackingSink>,
    config: CoreConfig,
    admission: AdmissionControl,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<SessionManager>,
        cache: Arc<CacheLayer>,
        breakers: Arc<BreakerRegistry>,
        predictors: Arc<PredictorRegistry>,
        experimenter: Arc<Experimenter>,
        catalogue: Arc<TemplateCatalogue>,
        llm: Arc<dyn LlmGateway>,
        fallback_llm: Arc<dyn LlmGateway>,
        tracking: Arc<dyn TrackingSink>,
        config: CoreConfig,
    ) -> Self {
        let admission = AdmissionControl::new(config.orchestrator.max_in_flight);
        Self {
            sessions,
            cache,
            breakers,
            predictors,
            experimenter,
            catalogue,
            llm,
            fallback_llm,
            tracking,
            config,
            admission,
        }
    }

    /// `StartConversation(customer_profile) -> session_id` (§6).
    #[instrument(skip(self, profile))]
    pub fn start_conversation(&self, profile: CustomerProfile) -> CoreResult<SessionId> {
        let session_id = SessionId::new();
        let now = now_rfc3339();
        let state = ConversationState::new(session_id.clone(), profile, &now);
        self.persisted_create(&state)?;
        Ok(session_id)
    }

    /// `EndConversation(session_id, outcome?) -> ack` (§6). Also closes the
    /// bandit loop (§4.6 B2/B3): a known outcome rewards every experiment
    /// this session was assigned to, then checks each for auto-deploy.
    #[instrument(skip(self))]
    pub async fn end_conversation(&self, session_id: &SessionId, outcome: Option<Outcome>) -> CoreResult<()> {
        let now = now_rfc3339();
        let mut state = self.persisted_load(session_id)?;
        if let Some(state) = state.as_mut() {
            self.persisted_terminate(state, "explicit_end", &now)?;
        } else {
            return Err(CoreError::NotFound { session_id: session_id.as_str().to_string() });
        }

        if let Some(outcome) = outcome {
            let assignments = state.map(|s| s.experiments_assigned);
            if let Some(assignments) = assignments {
                let reward = reward_for_outcome(outcome);
                for (experiment_id, variant_id) in assignments {
                    match self.experimenter.record_reward(session_id.as_str(), &experiment_id, &variant_id, reward) {
                        Ok(_) => {
                            if let Err(e) = self.experimenter.maybe_auto_deploy(&experiment_id) {
                                warn!(error = %e, experiment_id = %experiment_id, "auto-deploy check failed");
                            }
                        }
                        Err(e) => warn!(error = %e, experiment_id = %experiment_id, "failed to record bandit reward"),
                    }
                }
            }

            let event = TrackingEvent::Outcome(sales_ml::ConversationOutcomeEvent {
                session_id: session_id.as_str().to_string(),
                event_seq: 0,
                outcome,
                metrics: Default::default(),
                ts: now,
            });
            if let Err(e) = self.tracking.record(event).await {
                warn!(error = %e, "failed to record conversation outcome event");
            }
        }
        Ok(())
    }

    /// `GetConversation(session_id) -> ConversationState` (§6), read-only.
    #[instrument(skip(self))]
    pub fn get_conversation(&self, session_id: &SessionId) -> CoreResult<ConversationState> {
        self.persisted_load(session_id)?.ok_or_else(|| CoreError::NotFound {
            session_id: session_id.as_str().to_string(),
        })
    }

    /// `SendMessage(session_id, client_message_id, text) -> ...` (§6),
    /// implementing the §4.9 state machine end to end.
    #[instrument(skip(self, text, cancel), fields(session_id = %session_id, client_message_id))]
    pub async fn handle_message(
        &self,
        session_id: &SessionId,
        client_message_id: &str,
        text: &str,
        cancel: Option<CancellationToken>,
    ) -> CoreResult<SendMessageResponse> {
        if text.trim().is_empty() {
            return Err(CoreError::Validation("message text must not be empty".to_string()));
        }
        let _permit = self
            .admission
            .try_admit()
            .ok_or(CoreError::Overloaded)?;

        let cancel = cancel.unwrap_or_else(CancellationToken::new);
        let deadline = Duration::from_millis(self.config.orchestrator.request_deadline_ms);

        match tokio::time::timeout(deadline, self.handle_message_with_retries(session_id, client_message_id, text, &cancel)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("request deadline exceeded, returning canned fallback");
                self.deadline_fallback_response(session_id).await
            }
        }
    }

    async fn handle_message_with_retries(
        &self,
        session_id: &SessionId,
        client_message_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> CoreResult<SendMessageResponse> {
        let mut attempt = 0;
        loop {
            match self.run_pipeline(session_id, client_message_id, text, cancel).await {
                Ok(resp) => return Ok(resp),
                Err(PipelineError::Conflict) if attempt < self.config.orchestrator.idempotency_retries => {
                    attempt += 1;
                    info!(attempt, "optimistic concurrency conflict, retrying from ingress");
                }
                Err(PipelineError::Conflict) => {
                    return Err(CoreError::Conflict(format!(
                        "exceeded retry budget of {} for session {session_id}",
                        self.config.orchestrator.idempotency_retries
                    )))
                }
                Err(PipelineError::Core(e)) => return Err(e),
            }
        }
    }

    /// One attempt at steps 1-11. Returns `PipelineError::Conflict` when
    /// `Save` loses the optimistic-concurrency race (§4.9 step 9), letting
    /// the caller redo the whole attempt from a freshly loaded session.
    async fn run_pipeline(
        &self,
        session_id: &SessionId,
        client_message_id: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<SendMessageResponse, PipelineError> {
        // Step 1: ingress.
        let mut state = self
            .persisted_load(session_id)?
            .ok_or_else(|| CoreError::NotFound { session_id: session_id.as_str().to_string() })?;

        if let Some(cached_text) = self
            .sessions
            .check_replay(session_id, client_message_id)
            .map_err(session_error)?
        {
            return Ok(replay_response(&state, cached_text));
        }

        let now = now_rfc3339();
        let expected_version = state.version;
        state.last_activity_at = now.clone();
        let text = truncate_message(text);

        // Step 3: concurrent fan-out, fanned in at a single barrier.
        let stage_deadline = Duration::from_millis(self.config.orchestrator.stage_deadline_ms);
        let fanin_barrier = Duration::from_millis(self.config.orchestrator.fanin_barrier_ms);
        let window = transcript_window(&state, &text);
        let features = predictor_features(&state, &window);

        let fan_out = async {
            tokio::join!(
                run_predictor_stage(self.predictors.clone(), &self.config, "objection-v1", features.clone(), stage_deadline),
                run_predictor_stage(self.predictors.clone(), &self.config, "needs-v1", features.clone(), stage_deadline),
                run_predictor_stage(self.predictors.clone(), &self.config, "conversion-v1", features.clone(), stage_deadline),
                run_predictor_stage(self.predictors.clone(), &self.config, "nba-v1", features.clone(), stage_deadline),
            )
        };
        let (objection, needs, conversion, nba) = match tokio::time::timeout(fanin_barrier, fan_out).await {
            Ok(results) => results,
            Err(_) => {
                warn!("fan-in barrier elapsed before all stages completed, degrading remaining stages");
                (
                    self.predictors.get("objection-v1").map(|p| p.fallback(&features)),
                    self.predictors.get("needs-v1").map(|p| p.fallback(&features)),
                    self.predictors.get("conversion-v1").map(|p| p.fallback(&features)),
                    self.predictors.get("nba-v1").map(|p| p.fallback(&features)),
                )
            }
        };

        if cancel.is_cancelled() {
            return Err(PipelineError::Core(CoreError::Transient("request cancelled".to_string())));
        }

        // Emotion and tier analysis are pure, dependency-free functions —
        // they have no failure mode to fall back from, so they run inline
        // rather than through the same timeout/fallback machinery as the
        // predictors (§4.9's fan-out barrier still applies conceptually:
        // both are cheap enough to always land within it).
        let emotion = EmotionAnalyzer::analyze(&window);
        let tier_features = tier_features(&state, &emotion);
        let tier_decision = TierAnalyzer::analyze(&self.config.tier, &tier_features);

        let predicted_objections = predictor_strings(&objection, |o| matches!(o, PredictorOutput::Objections(_)));
        let predicted_needs = predictor_strings(&needs, |o| matches!(o, PredictorOutput::Needs(_)));
        let conversion_probability = conversion
            .as_ref()
            .and_then(|r| match &r.output {
                PredictorOutput::Conversion(p) => Some(*p),
                _ => None,
            })
            .unwrap_or(0.0);
        let any_degraded = [&objection, &needs, &conversion, &nba]
            .iter()
            .any(|r| r.as_ref().map(|r| r.degraded).unwrap_or(true));

        // Step 4: phase transition.
        let turn_count = state.transcript.len() as u32;
        let candidate_phase = next_phase(
            state.phase,
            &emotion,
            &predicted_objections,
            &predicted_needs,
            conversion_probability,
            turn_count,
        );
        state.try_transition_phase(candidate_phase);

        // Step 5: bandit assignment for any experiment relevant to the new phase.
        let mut variant_ids = Vec::new();
        for experiment_id in experiments_for_phase(state.phase) {
            if let Some(existing) = state.experiments_assigned.get(&experiment_id) {
                variant_ids.push(existing.clone());
                continue;
            }
            match self.experimenter.assign_variant(&experiment_id) {
                Ok(variant) => {
                    let recorded = state.assign_variant_if_absent(experiment_id, variant);
                    variant_ids.push(recorded);
                }
                Err(e) => warn!(error = %e, "bandit assignment failed, continuing without a variant"),
            }
        }
        let greeting_variant = (state.phase == Phase::Discovery).then(|| variant_ids.first().cloned()).flatten();
        let price_objection_variant = (state.phase == Phase::Objection).then(|| variant_ids.first().cloned()).flatten();

        // Step 6: compose prompt.
        let hour_of_day = chrono::Utc::now().format("%H").to_string().parse().unwrap_or(12);
        let composer_input = ComposerInput {
            phase: state.phase,
            primary_emotion: &emotion.primary_emotion,
            tier: state.tier.as_ref().map(|t| t.detected),
            archetype: state.archetype,
            predicted_objections: &predicted_objections,
            predicted_needs: &predicted_needs,
            greeting_variant: greeting_variant.as_ref(),
            price_objection_variant: price_objection_variant.as_ref(),
            last_customer_message: &text,
            turn_count,
            hour_of_day,
            timestamp: &now,
        };
        let prompt = PromptComposer::compose(&self.catalogue, &composer_input);

        // Step 7: LLM call.
        let params = LlmParams::for_phase(state.phase);
        let llm_output = if cancel.is_cancelled() {
            self.fallback_llm.generate(&prompt, &params).await
        } else {
            match self.llm.generate(&prompt, &params).await {
                Ok(output) => Ok(output),
                Err(e) => {
                    warn!(error = %e, "llm gateway degraded, using canned fallback");
                    self.fallback_llm.generate(&prompt, &params).await
                }
            }
        }
        .map_err(|e| PipelineError::Core(CoreError::UpstreamUnavailable { dependency: format!("llm: {e}") }))?;
        let degraded = any_degraded || llm_output.degraded;

        // Step 8: post-process and score.
        let last_two_agent: Vec<&str> = state
            .transcript
            .iter()
            .rev()
            .filter(|m| m.role == Role::Agent)
            .take(2)
            .map(|m| m.text.as_str())
            .collect();
        let mut agent_text = llm_output.text;
        if !enforce_no_repetition(&agent_text, &last_two_agent) {
            agent_text = format!("{} Let's get specific to your situation.", agent_text.trim_end());
        }
        let customer_name = state.customer_profile.name.clone().unwrap_or_default();
        agent_text = enforce_name_once(&agent_text, &customer_name);
        agent_text = enforce_forward_question(&agent_text, state.phase);
        let empathy_score = score_empathy(&agent_text);

        // Step 9: commit.
        state.append_message(Role::User, text.clone(), &now, estimate_tokens(&text));
        state.append_message(Role::Agent, agent_text.clone(), &now, estimate_tokens(&agent_text));
        state.emotional_journey.push(EmotionalSnapshot {
            primary_emotion: emotion.primary_emotion.clone(),
            intensity: emotion.intensity,
            confidence: emotion.confidence,
            ts: now.clone(),
        });
        state.update_tier(tier_decision.tier, tier_decision.confidence, &now);
        state.push_prediction(prediction_log_entry(&objection, &now));
        state.push_prediction(prediction_log_entry(&needs, &now));
        state.push_prediction(prediction_log_entry(&conversion, &now));
        state.push_prediction(prediction_log_entry(&nba, &now));

        match self.persisted_save(&mut state, expected_version) {
            Ok(_) => {}
            Err(CoreError::Conflict(_)) => return Err(PipelineError::Conflict),
            Err(e) => return Err(PipelineError::Core(e)),
        }
        self.sessions
            .record_commit(session_id, client_message_id, &agent_text, &now)
            .map_err(session_error)?;

        // Step 10: emit telemetry. A failure here is logged, not surfaced (§7).
        let event = TrackingEvent::MessageExchange(MessageExchangeEvent {
            session_id: session_id.as_str().to_string(),
            event_seq: state.version,
            variants_used: state.experiments_assigned.clone(),
            predictions: [&objection, &needs, &conversion, &nba]
                .iter()
                .filter_map(|r| r.as_ref())
                .map(|r| PredictionRecord { model_id: r.model_version.clone(), confidence: r.confidence, degraded: r.degraded })
                .collect(),
            empathy_score,
            phase: state.phase,
            latency_ms_per_stage: Default::default(),
            ts: now,
        });
        if let Err(e) = self.tracking.record(event).await {
            warn!(error = %e, "telemetry emission failed, request still succeeds");
        }

        // Step 11: return.
        Ok(SendMessageResponse {
            agent_text,
            phase: state.phase,
            tier: state.tier.as_ref().map(|t| t.detected),
            ml_insights: MlInsights {
                predicted_objections,
                predicted_needs,
                conversion_probability,
                variant_ids,
                degraded,
            },
        })
    }

    async fn deadline_fallback_response(&self, session_id: &SessionId) -> CoreResult<SendMessageResponse> {
        let state = self.persisted_load(session_id)?;
        let (phase, tier) = state
            .as_ref()
            .map(|s| (s.phase, s.tier.as_ref().map(|t| t.detected)))
            .unwrap_or((Phase::Discovery, None));
        let params = LlmParams::for_phase(phase);
        let prompt = sales_empathy::SystemPrompt {
            static_tier: "generic guidance".to_string(),
            customer_tier: String::new(),
            volatile_tier: String::new(),
        };
        let output = self
            .fallback_llm
            .generate(&prompt, &params)
            .await
            .map_err(|e| CoreError::UpstreamUnavailable { dependency: format!("llm: {e}") })?;
        Ok(SendMessageResponse {
            agent_text: output.text,
            phase,
            tier,
            ml_insights: MlInsights {
                predicted_objections: Vec::new(),
                predicted_needs: Vec::new(),
                conversion_probability: 0.0,
                variant_ids: Vec::new(),
                degraded: true,
            },
        })
    }

    fn persisted_load(&self, session_id: &SessionId) -> CoreResult<Option<ConversationState>> {
        let cache_key = session_id.as_str();
        if let Some(cached) = self.cache.session.get(cache_key) {
            if let Ok(state) = serde_json::from_value::<ConversationState>(cached) {
                return Ok(Some(state));
            }
        }
        let breaker = self.persistence_breaker();
        if !breaker.allow_call() {
            return Err(CoreError::UpstreamUnavailable { dependency: "persistence".to_string() });
        }
        match self.sessions.load(session_id) {
            Ok(state) => {
                breaker.record_success();
                if let Some(ref s) = state {
                    if let Ok(json) = serde_json::to_value(s) {
                        self.cache.session.set(cache_key, json, None, Some(cache_key.to_string()));
                    }
                }
                Ok(state)
            }
            Err(e) => {
                breaker.record_failure();
                Err(session_error(e))
            }
        }
    }

    fn persisted_create(&self, state: &ConversationState) -> CoreResult<()> {
        let breaker = self.persistence_breaker();
        if !breaker.allow_call() {
            return Err(CoreError::UpstreamUnavailable { dependency: "persistence".to_string() });
        }
        match self.sessions.create(state) {
            Ok(()) => {
                breaker.record_success();
                Ok(())
            }
            Err(e) => {
                breaker.record_failure();
                Err(session_error(e))
            }
        }
    }

    /// Writes `state` through to the session cache after a successful
    /// persistence call (spec.md:79: the `session` namespace is
    /// write-through on `Save`), so a hot session's next read doesn't force
    /// a DB round trip that could itself hit an open breaker.
    fn write_through(&self, state: &ConversationState) {
        let cache_key = state.session_id.as_str();
        if let Ok(json) = serde_json::to_value(state) {
            self.cache.session.set(cache_key, json, None, Some(cache_key.to_string()));
        }
    }

    fn persisted_save(&self, state: &mut ConversationState, expected_version: u64) -> CoreResult<u64> {
        let breaker = self.persistence_breaker();
        if !breaker.allow_call() {
            return Err(CoreError::UpstreamUnavailable { dependency: "persistence".to_string() });
        }
        match self.sessions.save(state, expected_version) {
            Ok(new_version) => {
                breaker.record_success();
                self.write_through(state);
                Ok(new_version)
            }
            Err(SessionError::VersionConflict { expected, found, .. }) => {
                breaker.record_success();
                Err(CoreError::Conflict(format!("expected version {expected}, found {found}")))
            }
            Err(e) => {
                breaker.record_failure();
                Err(session_error(e))
            }
        }
    }

    fn persisted_terminate(&self, state: &mut ConversationState, reason: &str, now: &str) -> CoreResult<()> {
        let breaker = self.persistence_breaker();
        if !breaker.allow_call() {
            return Err(CoreError::UpstreamUnavailable { dependency: "persistence".to_string() });
        }
        match self.sessions.terminate(&state.session_id, reason, now) {
            Ok(()) => {
                breaker.record_success();
                state.terminated_at = Some(now.to_string());
                state.phase = Phase::Terminal;
                self.write_through(state);
                Ok(())
            }
            Err(e) => {
                breaker.record_failure();
                Err(session_error(e))
            }
        }
    }

    fn persistence_breaker(&self) -> Arc<CircuitBreaker> {
        self.breakers
            .get("persistence")
            .expect("persistence breaker always registered")
    }
}

fn session_error(e: SessionError) -> CoreError {
    match e {
        SessionError::NotFound { session_id } => CoreError::NotFound { session_id },
        SessionError::VersionConflict { expected, found, session_id } => {
            CoreError::Conflict(format!("session {session_id}: expected {expected}, found {found}"))
        }
        other => CoreError::Internal(other.to_string()),
    }
}

/// Maps a terminal outcome to the bandit reward signal (§4.6 B2): a
/// conversion is a success, anything else is not.
fn reward_for_outcome(outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Converted => 1.0,
        Outcome::Lost | Outcome::Transferred | Outcome::Abandoned => 0.0,
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_USER_MESSAGE_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(MAX_USER_MESSAGE_CHARS).collect();
    format!("{truncated}\n[message truncated: exceeded length limit]")
}

fn estimate_tokens(text: &str) -> u32 {
    (text.split_whitespace().count() as f64 * 1.3).ceil() as u32
}

/// Customer-turn sliding window, most recent last, capped to
/// `TRANSCRIPT_WINDOW` entries, with the current (uncommitted) message
/// appended.
fn transcript_window(state: &ConversationState, text: &str) -> Vec<String> {
    let mut window: Vec<String> = state
        .transcript
        .iter()
        .filter(|m| m.role == Role::User)
        .rev()
        .take(TRANSCRIPT_WINDOW - 1)
        .map(|m| m.text.clone())
        .collect();
    window.reverse();
    window.push(text.to_string());
    window
}

fn predictor_features(state: &ConversationState, window: &[String]) -> Features {
    let full_transcript: Vec<String> = state
        .transcript
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text.clone())
        .chain(window.last().cloned())
        .collect();
    let turns = state.transcript.len() as u32;
    Features {
        recent_messages: window.to_vec(),
        full_transcript,
        phase: state.phase,
        engagement_score: (turns as f64 / 10.0).min(1.0),
        history_turns: turns,
    }
}

fn tier_features(state: &ConversationState, emotion: &EmotionalSignal) -> TierFeatures {
    let detected_urgency = if emotion.primary_emotion == "urgency" { emotion.intensity } else { 0.0 };
    TierFeatures {
        age: state.customer_profile.age,
        profession: state.customer_profile.profession.clone(),
        budget_band: state.customer_profile.budget_band.clone(),
        detected_urgency,
        engagement_score: (state.transcript.len() as f64 / 10.0).min(1.0),
    }
}

/// The fixed set of experiments relevant to a phase (§4.9 step 5). Only
/// phases with a defined experiment participate; others assign nothing.
fn experiments_for_phase(phase: Phase) -> Vec<ExperimentId> {
    match phase {
        Phase::Discovery => vec!["greeting".into()],
        Phase::Objection => vec!["price_objection".into()],
        _ => Vec::new(),
    }
}

async fn run_predictor_stage(
    registry: Arc<PredictorRegistry>,
    config: &CoreConfig,
    model_id: &str,
    features: Features,
    deadline: Duration,
) -> Option<PredictorResult> {
    let predictor = registry.get(model_id)?;
    if !config.predictor.is_enabled(model_id) {
        return Some(predictor.fallback(&features));
    }
    match tokio::time::timeout(deadline, predictor.predict(&features)).await {
        Ok(Ok(result)) => Some(result),
        Ok(Err(e)) => {
            warn!(model_id, error = %e, "predictor returned an error, using fallback");
            Some(predictor.fallback(&features))
        }
        Err(_) => {
            warn!(model_id, "predictor exceeded its stage deadline, using fallback");
            Some(predictor.fallback(&features))
        }
    }
}

fn predictor_strings(result: &Option<PredictorResult>, matches: impl Fn(&PredictorOutput) -> bool) -> Vec<String> {
    match result {
        Some(r) if matches(&r.output) => match &r.output {
            PredictorOutput::Objections(v) | PredictorOutput::Needs(v) => v.clone(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn prediction_log_entry(result: &Option<PredictorResult>, now: &str) -> PredictionLogEntry {
    let (model_id, output, confidence) = match result {
        Some(r) => (r.model_version.clone(), serde_json::to_value(&r.output).unwrap_or(serde_json::Value::Null), r.confidence),
        None => ("unavailable".to_string(), serde_json::Value::Null, 0.0),
    };
    PredictionLogEntry { model_id, inputs_hash: String::new(), output, confidence, ts: now.to_string() }
}

fn replay_response(state: &ConversationState, cached_text: String) -> SendMessageResponse {
    SendMessageResponse {
        agent_text: cached_text,
        phase: state.phase,
        tier: state.tier.as_ref().map(|t| t.detected),
        ml_insights: MlInsights {
            predicted_objections: Vec::new(),
            predicted_needs: Vec::new(),
            conversion_probability: 0.0,
            variant_ids: state.experiments_assigned.values().cloned().collect::<Vec<VariantId>>(),
            degraded: false,
        },
    }
}
