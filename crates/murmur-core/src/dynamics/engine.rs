//! Conversation dynamics engine.
//!
//! Tracks, per conversation id, how lively the conversation is (momentum),
//! how saturated its topics are, and which style the agent should speak in.
//! `update_state` is the only mutator and never fails; `get_state` creates a
//! default state on first sight and is otherwise a pure lookup.
//!
//! Updates never suspend. Per-conversation ordering is the caller's job: one
//! logical owner drives each conversation's turns.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use murmur_types::conversation::{
    ConversationState, MOMENTUM_MAX, MOMENTUM_MIN, SILENCE_PROBABILITY_MAX, TimeOfDay,
};
use murmur_types::style::ConversationStyle;

use super::sentiment::score_sentiment;
use super::store::ConversationStore;
use super::style::StyleCatalog;
use super::topics::detect_topics;

/// Momentum lost per full decay window of silence.
const MOMENTUM_DECAY_PER_WINDOW: f64 = 0.1;
/// Length of one decay window, in seconds.
const DECAY_WINDOW_SECS: f64 = 300.0;

const QUESTION_BONUS: f64 = 0.1;
const LONG_MESSAGE_BONUS: f64 = 0.05;
const SHORT_MESSAGE_PENALTY: f64 = 0.05;
const TOPIC_BONUS: f64 = 0.1;
const LONG_MESSAGE_CHARS: usize = 100;
const SHORT_MESSAGE_CHARS: usize = 20;

const EXHAUSTION_STEP: f64 = 0.2;

const BASE_SILENCE_PROBABILITY: f64 = 0.1;
const LOW_MOMENTUM_SILENCE: f64 = 0.3;
const EXHAUSTED_SILENCE: f64 = 0.2;
const NIGHT_SILENCE: f64 = 0.2;
const LOW_MOMENTUM: f64 = 0.3;
const HIGH_MEAN_EXHAUSTION: f64 = 0.7;

/// Weight kept from the previous sentiment on each update.
const SENTIMENT_CARRY: f64 = 0.6;

/// What the agent should do on its next turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnDecision {
    Silent,
    Speak {
        style: ConversationStyle,
        style_prompt: String,
    },
}

/// Per-conversation dynamics over an injected store and random source.
pub struct DynamicsEngine<S: ConversationStore> {
    store: S,
    catalog: StyleCatalog,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<S: ConversationStore> DynamicsEngine<S> {
    /// Create an engine with an entropy-seeded random source.
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Create an engine with an explicit random source (deterministic tests).
    pub fn with_rng<R: RngCore + Send + 'static>(store: S, rng: R) -> Self {
        Self {
            store,
            catalog: StyleCatalog::new(),
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    /// State for `conversation_id`, created with defaults on first access.
    pub fn get_state(&self, conversation_id: &str) -> ConversationState {
        self.get_state_at(conversation_id, Local::now())
    }

    /// Like [`get_state`](Self::get_state) with an explicit creation time.
    pub fn get_state_at(&self, conversation_id: &str, now: DateTime<Local>) -> ConversationState {
        if let Some(state) = self.store.load(conversation_id) {
            return state;
        }
        let state = ConversationState::new(now);
        self.store.save(conversation_id, state.clone());
        debug!(conversation_id, "created conversation state");
        state
    }

    /// Fold `message` into the conversation's state using the wall clock.
    pub fn update_state(&self, conversation_id: &str, message: &str) -> ConversationState {
        self.update_state_at(conversation_id, message, Local::now())
    }

    /// Fold `message` into the conversation's state as of `now`.
    ///
    /// Order: silence duration, momentum decay and bonuses, topic exhaustion,
    /// current topics (replaced, not unioned), silence probability,
    /// interaction count and time of day, sentiment, style transition.
    pub fn update_state_at(
        &self,
        conversation_id: &str,
        message: &str,
        now: DateTime<Local>,
    ) -> ConversationState {
        let mut state = self.get_state_at(conversation_id, now);

        let elapsed_secs = (now - state.last_interaction).num_milliseconds().max(0) as f64 / 1000.0;
        state.silence_duration_secs = elapsed_secs as i64;
        state.last_interaction = now;

        let topics = detect_topics(message);
        state.momentum = next_momentum(state.momentum, elapsed_secs, message, !topics.is_empty());

        for topic in &topics {
            let score = state.topic_exhaustion.entry(topic.clone()).or_insert(0.0);
            *score = (*score + EXHAUSTION_STEP).min(1.0);
        }
        state.current_topics = topics;

        let hour = now.hour();
        state.silence_probability =
            silence_probability(state.momentum, state.mean_exhaustion(), hour);

        state.interaction_count += 1;
        state.time_of_day = TimeOfDay::from_hour(hour);

        state.sentiment = (SENTIMENT_CARRY * state.sentiment
            + (1.0 - SENTIMENT_CARRY) * score_sentiment(message))
        .clamp(-1.0, 1.0);

        let transition = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.catalog
                .suggest_style_transition(state.current_style, &state, &mut **rng)
        };
        if let Some(next) = transition {
            debug!(
                conversation_id,
                from = %state.current_style,
                to = %next,
                "style transition"
            );
            state.current_style = next;
        }

        debug!(
            conversation_id,
            momentum = state.momentum,
            silence_probability = state.silence_probability,
            topics = ?state.current_topics,
            "conversation state updated"
        );

        self.store.save(conversation_id, state.clone());
        state
    }

    /// Draw once against `state.silence_probability`. Never persisted.
    pub fn should_stay_silent(&self, state: &ConversationState) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0.0..1.0) < state.silence_probability
    }

    /// Decide whether to speak this turn and, if so, in which style.
    pub fn plan_turn(&self, conversation_id: &str) -> TurnDecision {
        let state = self.get_state(conversation_id);
        if self.should_stay_silent(&state) {
            debug!(conversation_id, "staying silent this turn");
            return TurnDecision::Silent;
        }
        TurnDecision::Speak {
            style: state.current_style,
            style_prompt: self.catalog.get_style_prompt(state.current_style).to_string(),
        }
    }
}

/// Decay momentum for `elapsed_secs` of quiet, apply content bonuses, clamp.
pub fn next_momentum(momentum: f64, elapsed_secs: f64, message: &str, has_topics: bool) -> f64 {
    let mut next = momentum - MOMENTUM_DECAY_PER_WINDOW * (elapsed_secs / DECAY_WINDOW_SECS);

    let length = message.chars().count();
    if message.contains('?') {
        next += QUESTION_BONUS;
    }
    if length > LONG_MESSAGE_CHARS {
        next += LONG_MESSAGE_BONUS;
    }
    if length < SHORT_MESSAGE_CHARS {
        next -= SHORT_MESSAGE_PENALTY;
    }
    if has_topics {
        next += TOPIC_BONUS;
    }

    next.clamp(MOMENTUM_MIN, MOMENTUM_MAX)
}

/// Silence probability from momentum, mean exhaustion and local hour.
pub fn silence_probability(momentum: f64, mean_exhaustion: f64, hour: u32) -> f64 {
    let mut probability = BASE_SILENCE_PROBABILITY;
    if momentum < LOW_MOMENTUM {
        probability += LOW_MOMENTUM_SILENCE;
    }
    if mean_exhaustion > HIGH_MEAN_EXHAUSTION {
        probability += EXHAUSTED_SILENCE;
    }
    if !(6..22).contains(&hour) {
        probability += NIGHT_SILENCE;
    }
    probability.clamp(0.0, SILENCE_PROBABILITY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::store::InMemoryConversationStore;
    use chrono::{Duration, TimeZone};
    use rand::rngs::mock::StepRng;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 1, 20, hour, minute, 0).unwrap()
    }

    fn engine(seed: u64) -> DynamicsEngine<InMemoryConversationStore> {
        DynamicsEngine::with_rng(InMemoryConversationStore::new(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn fresh_conversation_defaults() {
        let engine = engine(1);
        let state = engine.get_state_at("room", at(10, 0));
        assert!((state.momentum - 0.5).abs() < f64::EPSILON);
        assert_eq!(state.current_style, ConversationStyle::Casual);
        assert_eq!(state.interaction_count, 0);
        assert!(state.topic_exhaustion.is_empty());
        // The lazily created state is persisted.
        assert_eq!(engine.store().len(), 1);
    }

    #[test]
    fn get_state_is_a_pure_lookup_after_creation() {
        let engine = engine(1);
        engine.update_state_at("room", "hello there, how is everyone doing today", at(10, 0));
        let first = engine.get_state("room");
        let second = engine.get_state("room");
        assert_eq!(first.interaction_count, 1);
        assert_eq!(second.interaction_count, 1);
        assert!((first.momentum - second.momentum).abs() < f64::EPSILON);
    }

    #[test]
    fn short_message_without_topics_only_decays() {
        let engine = engine(2);
        engine.get_state_at("room", at(10, 0));
        let state = engine.update_state_at("room", "ok sounds good", at(10, 10));
        // 0.5 - 0.2 (two windows) - 0.05 (short)
        assert!((state.momentum - 0.25).abs() < 1e-9, "{}", state.momentum);
        assert!(state.current_topics.is_empty());
        assert_eq!(state.silence_duration_secs, 600);
    }

    #[test]
    fn decay_never_drops_below_floor() {
        let engine = engine(3);
        engine.get_state_at("room", at(8, 0));
        let state = engine.update_state_at("room", "ok sounds good", at(12, 0));
        assert!((state.momentum - MOMENTUM_MIN).abs() < f64::EPSILON);
    }

    #[test]
    fn engaging_question_gets_combined_bonus() {
        let engine = engine(4);
        engine.get_state_at("room", at(10, 0));
        let state =
            engine.update_state_at("room", "Is artificial intelligence conscious?", at(10, 5));
        // Decay-only baseline 0.4, plus 0.1 for "?" and 0.1 for topics.
        assert!((state.momentum - 0.6).abs() < 1e-9, "{}", state.momentum);
        assert!(state.current_topics.contains("philosophy"));
    }

    #[test]
    fn engaging_question_clamps_at_ceiling() {
        let engine = engine(5);
        let mut near_ceiling = ConversationState::new(at(10, 0));
        near_ceiling.momentum = 0.85;
        engine.store().save("room", near_ceiling);

        let state =
            engine.update_state_at("room", "Is artificial intelligence conscious?", at(10, 0));
        assert!((state.momentum - MOMENTUM_MAX).abs() < f64::EPSILON);
    }

    #[test]
    fn exhaustion_saturates_at_one() {
        let engine = engine(6);
        let mut now = at(14, 0);
        for _ in 0..12 {
            now += Duration::seconds(5);
            engine.update_state_at("room", "that song on the new album is great", now);
        }
        let state = engine.get_state("room");
        let music = state.topic_exhaustion["music"];
        assert!((music - 1.0).abs() < f64::EPSILON);
        assert!(state.topic_exhaustion.values().all(|v| *v <= 1.0));
    }

    #[test]
    fn current_topics_are_replaced_not_unioned() {
        let engine = engine(7);
        engine.update_state_at("room", "what's your favorite song right now", at(14, 0));
        let state = engine.update_state_at("room", "I'd rather talk about the election", at(14, 1));
        assert!(state.current_topics.contains("politics"));
        assert!(!state.current_topics.contains("music"));
        // Exhaustion remembers both.
        assert!(state.topic_exhaustion.contains_key("music"));
        assert!(state.topic_exhaustion.contains_key("politics"));
    }

    #[test]
    fn silence_probability_components() {
        assert!((silence_probability(0.5, 0.0, 14) - 0.1).abs() < 1e-9);
        assert!((silence_probability(0.2, 0.0, 14) - 0.4).abs() < 1e-9);
        assert!((silence_probability(0.5, 0.8, 14) - 0.3).abs() < 1e-9);
        assert!((silence_probability(0.5, 0.0, 23) - 0.3).abs() < 1e-9);
        assert!((silence_probability(0.5, 0.0, 5) - 0.3).abs() < 1e-9);
        assert!((silence_probability(0.5, 0.0, 6) - 0.1).abs() < 1e-9);
        // Everything at once: 0.1 + 0.3 + 0.2 + 0.2 = 0.8
        assert!((silence_probability(0.1, 0.9, 2) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn night_message_updates_time_of_day_and_silence() {
        let engine = engine(8);
        let state = engine.update_state_at("room", "still awake, thinking about dinner plans", at(23, 30));
        assert_eq!(state.time_of_day, TimeOfDay::Night);
        assert!(state.silence_probability >= 0.3 - 1e-9);
    }

    #[test]
    fn interaction_count_is_monotonic() {
        let engine = engine(9);
        for i in 1..=5 {
            let state = engine.update_state_at("room", "hello again", at(9, i));
            assert_eq!(state.interaction_count, i as u64);
        }
    }

    #[test]
    fn bounded_fields_stay_clamped_over_random_walk() {
        let messages = [
            "ok",
            "Is artificial intelligence conscious?",
            "I feel so sad and lonely tonight",
            "the database server had an outage, this is urgent!",
            "haha that was hilarious!!!",
            "Let me explain in detail why this election matters so much for the economy, \
             the health system, the price of food, and the future of our planet's science.",
            "?",
        ];
        let engine = engine(10);
        let mut walker = StdRng::seed_from_u64(99);
        let mut now = at(0, 0);

        for _ in 0..500 {
            now += Duration::seconds(walker.gen_range(0..3_600));
            let message = messages[walker.gen_range(0..messages.len())];
            let state = engine.update_state_at("room", message, now);
            assert!((MOMENTUM_MIN..=MOMENTUM_MAX).contains(&state.momentum));
            assert!((0.0..=SILENCE_PROBABILITY_MAX).contains(&state.silence_probability));
            assert!((-1.0..=1.0).contains(&state.sentiment));
            assert!(state.topic_exhaustion.values().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn low_sentiment_moves_style_to_empathetic() {
        let engine = engine(11);
        let state = engine.update_state_at("room", "I feel sad, lonely and hopeless", at(15, 0));
        // 0.6 * 0.0 + 0.4 * -1.0 = -0.4, below the empathy threshold.
        assert!((state.sentiment + 0.4).abs() < 1e-9);
        assert_eq!(state.current_style, ConversationStyle::Empathetic);
    }

    #[test]
    fn silence_draw_uses_injected_rng() {
        // All-zero draws are always below any positive probability.
        let silent = DynamicsEngine::with_rng(InMemoryConversationStore::new(), StepRng::new(0, 0));
        assert_eq!(silent.plan_turn("room"), TurnDecision::Silent);

        // All-one draws are never below the 0.9 cap.
        let chatty =
            DynamicsEngine::with_rng(InMemoryConversationStore::new(), StepRng::new(u64::MAX, 0));
        match chatty.plan_turn("room") {
            TurnDecision::Speak { style, style_prompt } => {
                assert_eq!(style, ConversationStyle::Casual);
                assert_eq!(style_prompt, chatty.catalog().get_style_prompt(style));
            }
            TurnDecision::Silent => panic!("expected to speak"),
        }
    }
}
