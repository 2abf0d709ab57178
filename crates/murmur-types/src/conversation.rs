//! Per-conversation dynamics state.
//!
//! `ConversationState` is the value the dynamics engine keeps for every
//! conversation id. Bounded fields are clamped by the engine on every update.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::style::ConversationStyle;

/// Lower bound for `ConversationState::momentum`.
pub const MOMENTUM_MIN: f64 = 0.1;
/// Upper bound for `ConversationState::momentum`.
pub const MOMENTUM_MAX: f64 = 0.9;
/// Upper bound for `ConversationState::silence_probability`.
pub const SILENCE_PROBABILITY_MAX: f64 = 0.9;

/// Coarse local time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket an hour of the day: morning [5,12), afternoon [12,17),
    /// evening [17,22), night otherwise.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Dynamics state for a single conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    /// How lively the conversation is, in [0.1, 0.9].
    pub momentum: f64,
    /// Likelihood that an agent turn produces no utterance, in [0, 0.9].
    pub silence_probability: f64,
    pub current_style: ConversationStyle,
    pub last_interaction: DateTime<Local>,
    /// Gap between the two most recent interactions, in seconds.
    pub silence_duration_secs: i64,
    /// Saturation per topic label, each in [0, 1]. Never decays.
    pub topic_exhaustion: HashMap<String, f64>,
    /// Topics of the most recent message only.
    pub current_topics: BTreeSet<String>,
    pub interaction_count: u64,
    pub time_of_day: TimeOfDay,
    /// Smoothed sentiment of recent messages, in [-1, 1].
    pub sentiment: f64,
}

impl ConversationState {
    /// Fresh state for a conversation first seen at `now`.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            momentum: 0.5,
            silence_probability: 0.1,
            current_style: ConversationStyle::Casual,
            last_interaction: now,
            silence_duration_secs: 0,
            topic_exhaustion: HashMap::new(),
            current_topics: BTreeSet::new(),
            interaction_count: 0,
            time_of_day: TimeOfDay::from_hour(now.hour()),
            sentiment: 0.0,
        }
    }

    /// Mean exhaustion across every topic seen so far (0 when none).
    pub fn mean_exhaustion(&self) -> f64 {
        if self.topic_exhaustion.is_empty() {
            return 0.0;
        }
        self.topic_exhaustion.values().sum::<f64>() / self.topic_exhaustion.len() as f64
    }

    /// Whether any current topic matches one of `labels`.
    pub fn has_topic(&self, labels: &[&str]) -> bool {
        labels.iter().any(|label| self.current_topics.contains(*label))
    }
}
