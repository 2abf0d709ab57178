//! Style catalog: prompt fragments, transition adjacency, cue patterns, and
//! the rules that pick the next style.
//!
//! The catalog is immutable once built. Style transitions are an ordered
//! list of forced-override rules (low sentiment, urgency/safety, technical
//! topics) that terminates in a weighted random drift to an adjacent style.
//! Each rule is a standalone function so it can be tested on its own.

use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

use murmur_types::conversation::ConversationState;
use murmur_types::style::ConversationStyle;

use super::topics::{TECHNICAL_TOPICS, URGENT_TOPICS};

/// Style used when nothing else applies.
pub const BASELINE_STYLE: ConversationStyle = ConversationStyle::Casual;

/// Sentiment below which the conversation is steered toward empathy.
pub const LOW_SENTIMENT_THRESHOLD: f64 = -0.3;

/// Momentum below which random drift becomes more likely.
pub const LOW_MOMENTUM_THRESHOLD: f64 = 0.3;

/// Drift probability when momentum is low.
pub const LOW_MOMENTUM_DRIFT_PROBABILITY: f64 = 0.4;

/// Drift probability otherwise.
pub const BASE_DRIFT_PROBABILITY: f64 = 0.1;

/// Texts longer than this bias toward analytical styles.
const LONG_TEXT_CHARS: usize = 200;

/// A single catalog entry.
#[derive(Debug)]
pub struct StyleDefinition {
    pub style: ConversationStyle,
    pub prompt: &'static str,
    pub transitions: Vec<ConversationStyle>,
    cues: Regex,
}

impl StyleDefinition {
    fn new(
        style: ConversationStyle,
        prompt: &'static str,
        transitions: Vec<ConversationStyle>,
        cues: &str,
    ) -> Self {
        Self {
            style,
            prompt,
            transitions,
            // Cue sets are compile-time constants; a bad one is a programming error.
            cues: Regex::new(&format!("(?i){cues}")).expect("style cue pattern must compile"),
        }
    }

    /// Number of cue hits in `text`.
    fn cue_hits(&self, text: &str) -> usize {
        self.cues.find_iter(text).count()
    }
}

/// Deterministic forced-override rule.
type ForcedRule = fn(ConversationStyle, &ConversationState) -> Option<ConversationStyle>;

/// Forced rules in priority order. The first rule that fires wins.
const FORCED_RULES: [ForcedRule; 3] = [
    empathy_for_low_sentiment,
    precision_for_urgency,
    technical_for_infrastructure,
];

/// Immutable table of every style definition.
#[derive(Debug)]
pub struct StyleCatalog {
    definitions: HashMap<ConversationStyle, StyleDefinition>,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleCatalog {
    /// Build the full catalog.
    pub fn new() -> Self {
        use ConversationStyle::*;

        let definitions = vec![
            StyleDefinition::new(
                Casual,
                "Keep it relaxed and conversational, like chatting with a friend. Short sentences, plain words, no lectures.",
                vec![Playful, Humorous, Enthusiastic, Supportive, Skeptical],
                r"\b(hey|hi|hello|yeah|yep|nah|btw|gonna|wanna|kinda|sup|chill)\b",
            ),
            StyleDefinition::new(
                Formal,
                "Use a composed, formal register. Complete sentences, courteous phrasing, no slang.",
                vec![Analytical, Precise, Casual],
                r"\b(regards|sincerely|kindly|respectfully|dear|hereby|pursuant|shall|moreover)\b",
            ),
            StyleDefinition::new(
                Playful,
                "Be playful and light. Tease gently, riff on what was said, and keep the energy up.",
                vec![Casual, Humorous, Enthusiastic],
                r"\b(haha|hehe|lol|yay|silly|teehee|woohoo|lmao)\b",
            ),
            StyleDefinition::new(
                Humorous,
                "Lean into humor. A quick joke, a wry observation, or an unexpected comparison is welcome.",
                vec![Playful, Casual, Skeptical],
                r"\b(joke|jokes|funny|hilarious|pun|rofl|kidding|comedy)\b",
            ),
            StyleDefinition::new(
                Enthusiastic,
                "Show genuine excitement. Celebrate ideas and build on them with energy.",
                vec![Playful, Casual, Supportive],
                r"\b(amazing|awesome|incredible|love it|so excited|can't wait|wow|fantastic)\b",
            ),
            StyleDefinition::new(
                Analytical,
                "Reason carefully. Break the point into parts, weigh evidence, and draw a clear conclusion.",
                vec![Philosophical, Technical, Precise, Skeptical, Formal],
                r"\b(furthermore|therefore|thus|hence|data|analysis|analy[sz]e|evidence|indicates?|suggests?|consequently|statistically|correlation)\b",
            ),
            StyleDefinition::new(
                Philosophical,
                "Take a reflective, philosophical angle. Ask what it means and explore the deeper question.",
                vec![Analytical, Casual, Skeptical],
                r"\b(meaning|existence|conscious\w*|truth|reality|purpose|ethic\w*|moral\w*|essence)\b",
            ),
            StyleDefinition::new(
                Technical,
                "Be technical and concrete. Use correct terminology and focus on how things actually work.",
                vec![Analytical, Precise, Casual],
                r"\b(function|api|database|server|code|compile|deploy\w*|algorithm|latency|config\w*|bug|stack trace)\b",
            ),
            StyleDefinition::new(
                Precise,
                "Be precise and direct. State the essential facts first, avoid speculation, and keep it short.",
                vec![Technical, Formal, Analytical],
                r"\b(exactly|precisely|specifically|step by step|clarify|accurate|correct(ly)?)\b",
            ),
            StyleDefinition::new(
                Empathetic,
                "Respond with warmth and empathy. Acknowledge how the other person feels before anything else.",
                vec![Supportive, Casual],
                r"\b(sorry to hear|i understand|sounds hard|feel|feeling|hurt|sad|lonely|grief|tough)\b",
            ),
            StyleDefinition::new(
                Supportive,
                "Be encouraging and supportive. Offer reassurance and a constructive next step.",
                vec![Empathetic, Casual, Enthusiastic],
                r"\b(you can do it|proud of you|here for you|help|support|encourage|don't give up|believe in you)\b",
            ),
            StyleDefinition::new(
                Skeptical,
                "Be politely skeptical. Question assumptions and ask for reasons before agreeing.",
                vec![Analytical, Humorous, Casual],
                r"\b(doubt\w*|skeptic\w*|not sure|prove it|citation needed|unlikely|questionable|really)\b",
            ),
        ];

        Self {
            definitions: definitions.into_iter().map(|d| (d.style, d)).collect(),
        }
    }

    /// Look up a style's definition.
    pub fn definition(&self, style: ConversationStyle) -> Option<&StyleDefinition> {
        self.definitions.get(&style)
    }

    /// Prompt fragment for `style`, falling back to the baseline style.
    pub fn get_style_prompt(&self, style: ConversationStyle) -> &'static str {
        self.definitions
            .get(&style)
            .or_else(|| self.definitions.get(&BASELINE_STYLE))
            .map(|d| d.prompt)
            .unwrap_or_default()
    }

    /// Prompt fragment for a style given by name; unknown names fall back.
    pub fn get_style_prompt_by_name(&self, name: &str) -> &'static str {
        let style = name.parse().unwrap_or(BASELINE_STYLE);
        self.get_style_prompt(style)
    }

    /// Allowed transition targets for `style`.
    pub fn transitions(&self, style: ConversationStyle) -> &[ConversationStyle] {
        self.definitions
            .get(&style)
            .map(|d| d.transitions.as_slice())
            .unwrap_or(&[])
    }

    /// Score every style against `text`.
    ///
    /// One point per cue hit, plus: exclamation marks bias expressive styles
    /// (0.5 each, up to three), long text biases analytical styles (+1), a
    /// question mark biases supportive styles (+0.5).
    pub fn score_styles(&self, text: &str) -> Vec<(ConversationStyle, f64)> {
        let exclamations = text.matches('!').count().min(3) as f64;
        let is_long = text.chars().count() > LONG_TEXT_CHARS;
        let has_question = text.contains('?');

        ConversationStyle::ALL
            .iter()
            .filter_map(|style| self.definitions.get(style))
            .map(|def| {
                let mut score = def.cue_hits(text) as f64;
                if def.style.is_playful_family() {
                    score += exclamations * 0.5;
                }
                if is_long && def.style.is_analytical_family() {
                    score += 1.0;
                }
                if has_question && def.style.is_empathetic_family() {
                    score += 0.5;
                }
                (def.style, score)
            })
            .collect()
    }

    /// Classify `text` into the highest-scoring style.
    ///
    /// Ties resolve to catalog order; an all-zero score yields the baseline.
    pub fn detect_style(&self, text: &str) -> ConversationStyle {
        let mut best = (BASELINE_STYLE, 0.0);
        for (style, score) in self.score_styles(text) {
            if score > best.1 {
                best = (style, score);
            }
        }
        best.0
    }

    /// Decide whether to move away from `current`.
    ///
    /// Forced rules run first in order; if none fires, a random drift to an
    /// adjacent style happens with 40% probability when momentum is low, or
    /// 10% otherwise. `None` means "no transition".
    pub fn suggest_style_transition<R: Rng + ?Sized>(
        &self,
        current: ConversationStyle,
        state: &ConversationState,
        rng: &mut R,
    ) -> Option<ConversationStyle> {
        FORCED_RULES
            .iter()
            .find_map(|rule| rule(current, state))
            .or_else(|| self.random_drift(current, state, rng))
    }

    /// Weighted random move to a neighbor of `current`.
    pub fn random_drift<R: Rng + ?Sized>(
        &self,
        current: ConversationStyle,
        state: &ConversationState,
        rng: &mut R,
    ) -> Option<ConversationStyle> {
        let probability = if state.momentum < LOW_MOMENTUM_THRESHOLD {
            LOW_MOMENTUM_DRIFT_PROBABILITY
        } else {
            BASE_DRIFT_PROBABILITY
        };
        if !rng.gen_bool(probability) {
            return None;
        }
        self.transitions(current).choose(rng).copied()
    }
}

/// Low sentiment pulls the conversation into the empathetic family.
pub fn empathy_for_low_sentiment(
    current: ConversationStyle,
    state: &ConversationState,
) -> Option<ConversationStyle> {
    (state.sentiment < LOW_SENTIMENT_THRESHOLD && !current.is_empathetic_family())
        .then_some(ConversationStyle::Empathetic)
}

/// Urgency or safety cues demand precision.
pub fn precision_for_urgency(
    current: ConversationStyle,
    state: &ConversationState,
) -> Option<ConversationStyle> {
    (state.has_topic(&URGENT_TOPICS) && current != ConversationStyle::Precise)
        .then_some(ConversationStyle::Precise)
}

/// Technical or infrastructure topics switch to the technical style.
pub fn technical_for_infrastructure(
    current: ConversationStyle,
    state: &ConversationState,
) -> Option<ConversationStyle> {
    (state.has_topic(&TECHNICAL_TOPICS) && current != ConversationStyle::Technical)
        .then_some(ConversationStyle::Technical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn state() -> ConversationState {
        ConversationState::new(Local.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap())
    }

    fn state_with_topics(topics: &[&str]) -> ConversationState {
        let mut s = state();
        s.current_topics = topics.iter().map(|t| t.to_string()).collect();
        s
    }

    #[test]
    fn every_style_has_prompt_and_transitions() {
        let catalog = StyleCatalog::new();
        for style in ConversationStyle::ALL {
            assert!(!catalog.get_style_prompt(style).is_empty(), "{style}");
            let transitions = catalog.transitions(style);
            assert!(!transitions.is_empty(), "{style}");
            assert!(!transitions.contains(&style), "{style} must not transition to itself");
        }
    }

    #[test]
    fn unknown_style_name_falls_back_to_baseline_prompt() {
        let catalog = StyleCatalog::new();
        assert_eq!(
            catalog.get_style_prompt_by_name("sarcastic"),
            catalog.get_style_prompt(BASELINE_STYLE)
        );
        assert_eq!(
            catalog.get_style_prompt_by_name("Technical"),
            catalog.get_style_prompt(ConversationStyle::Technical)
        );
    }

    #[test]
    fn analytical_text_is_never_playful() {
        let catalog = StyleCatalog::new();
        let style = catalog.detect_style("furthermore, therefore the data indicates...");
        assert!(!style.is_playful_family());
        assert_eq!(style, ConversationStyle::Analytical);
    }

    #[test]
    fn zero_score_defaults_to_baseline() {
        let catalog = StyleCatalog::new();
        assert_eq!(catalog.detect_style("the train leaves at noon"), BASELINE_STYLE);
        assert_eq!(catalog.detect_style(""), BASELINE_STYLE);
    }

    #[test]
    fn exclamations_bias_expressive_styles() {
        let catalog = StyleCatalog::new();
        let style = catalog.detect_style("we won the match!!!");
        assert!(style.is_playful_family());
    }

    #[test]
    fn question_marks_bias_empathetic_family() {
        let catalog = StyleCatalog::new();
        let style = catalog.detect_style("are you okay?");
        assert!(style.is_empathetic_family());
    }

    #[test]
    fn long_text_biases_analytical_family() {
        let catalog = StyleCatalog::new();
        let text = "a ".repeat(150);
        let scores = catalog.score_styles(&text);
        let analytical = scores
            .iter()
            .find(|(s, _)| *s == ConversationStyle::Analytical)
            .unwrap()
            .1;
        assert!((analytical - 1.0).abs() < f64::EPSILON);
        assert_eq!(catalog.detect_style(&text), ConversationStyle::Analytical);
    }

    #[test]
    fn low_sentiment_forces_empathy() {
        let catalog = StyleCatalog::new();
        let mut s = state();
        s.sentiment = -0.8;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            catalog.suggest_style_transition(ConversationStyle::Playful, &s, &mut rng),
            Some(ConversationStyle::Empathetic)
        );
        // Already empathetic-family: rule does not fire.
        assert_eq!(empathy_for_low_sentiment(ConversationStyle::Supportive, &s), None);
    }

    #[test]
    fn urgency_forces_precise_before_technical() {
        let catalog = StyleCatalog::new();
        let s = state_with_topics(&["urgency", "infrastructure"]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            catalog.suggest_style_transition(ConversationStyle::Casual, &s, &mut rng),
            Some(ConversationStyle::Precise)
        );
        assert_eq!(precision_for_urgency(ConversationStyle::Precise, &s), None);
    }

    #[test]
    fn technical_topics_force_technical() {
        let s = state_with_topics(&["technology"]);
        assert_eq!(
            technical_for_infrastructure(ConversationStyle::Casual, &s),
            Some(ConversationStyle::Technical)
        );
        assert_eq!(technical_for_infrastructure(ConversationStyle::Technical, &s), None);
    }

    #[test]
    fn random_drift_only_picks_neighbors() {
        let catalog = StyleCatalog::new();
        let mut s = state();
        s.momentum = 0.1;
        let mut rng = StdRng::seed_from_u64(42);
        let neighbors = catalog.transitions(ConversationStyle::Casual);
        for _ in 0..200 {
            if let Some(next) = catalog.random_drift(ConversationStyle::Casual, &s, &mut rng) {
                assert!(neighbors.contains(&next));
            }
        }
    }

    #[test]
    fn drift_is_more_likely_at_low_momentum() {
        let catalog = StyleCatalog::new();
        let mut low = state();
        low.momentum = 0.1;
        let mut high = state();
        high.momentum = 0.8;

        let count = |s: &ConversationState, seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..2_000)
                .filter(|_| {
                    catalog
                        .random_drift(ConversationStyle::Casual, s, &mut rng)
                        .is_some()
                })
                .count()
        };

        let low_hits = count(&low, 7);
        let high_hits = count(&high, 7);
        // Expected ~800 vs ~200; bounds are loose.
        assert!(low_hits > 600 && low_hits < 1_000, "low={low_hits}");
        assert!(high_hits > 100 && high_hits < 320, "high={high_hits}");
    }
}
