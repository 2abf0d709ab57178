//! Topic detection: text -> set of topic labels.
//!
//! Pure function over a fixed table of case-insensitive cue patterns plus a
//! few structural heuristics (code-like syntax, currency amounts, "why" and
//! "meaning" questions). Labels are stable strings so they can key the
//! per-conversation exhaustion map.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

pub const PHILOSOPHY: &str = "philosophy";
pub const TECHNOLOGY: &str = "technology";
pub const SCIENCE: &str = "science";
pub const ART: &str = "art";
pub const MUSIC: &str = "music";
pub const POLITICS: &str = "politics";
pub const EMOTIONS: &str = "emotions";
pub const HEALTH: &str = "health";
pub const FINANCE: &str = "finance";
pub const GAMING: &str = "gaming";
pub const FOOD: &str = "food";
pub const URGENCY: &str = "urgency";
pub const SAFETY: &str = "safety";
pub const INFRASTRUCTURE: &str = "infrastructure";

/// Topics that force a precise style.
pub const URGENT_TOPICS: [&str; 2] = [URGENCY, SAFETY];

/// Topics that force a technical style.
pub const TECHNICAL_TOPICS: [&str; 2] = [TECHNOLOGY, INFRASTRUCTURE];

struct TopicPattern {
    label: &'static str,
    pattern: Regex,
}

fn cue(label: &'static str, pattern: &str) -> TopicPattern {
    TopicPattern {
        label,
        // Patterns are compile-time constants; a bad one is a programming error.
        pattern: Regex::new(&format!("(?i){pattern}")).expect("topic pattern must compile"),
    }
}

static TOPIC_PATTERNS: LazyLock<Vec<TopicPattern>> = LazyLock::new(|| {
    vec![
        cue(
            PHILOSOPHY,
            r"\b(conscious(ness)?|existence|exist|meaning of life|free will|ethic(s|al)|moral(ity)?|philosoph\w*|metaphysic\w*|sentien(t|ce)|soul)\b",
        ),
        cue(
            TECHNOLOGY,
            r"\b(artificial intelligence|ai|machine learning|software|hardware|computer|algorithm|programming|code|coding|robot\w*|internet|app|rust|python|javascript|llm|neural network)\b",
        ),
        cue(
            SCIENCE,
            r"\b(science|scientific|physics|chemistry|biology|quantum|experiment|hypothesis|research|universe|planet|evolution|dna|atom)\b",
        ),
        cue(
            ART,
            r"\b(art|artist|painting|paint|sculpture|drawing|museum|gallery|poetry|poem|novel|literature|creative|design)\b",
        ),
        cue(
            MUSIC,
            r"\b(music|song|songs|album|band|guitar|piano|concert|melody|lyrics|playlist|jazz|hip hop|rap)\b",
        ),
        cue(
            POLITICS,
            r"\b(politic\w*|election|government|president|senate|congress|policy|vote|voting|democra\w*|parliament)\b",
        ),
        cue(
            EMOTIONS,
            r"\b(feel|feeling|feelings|sad|happy|angry|lonely|anxious|anxiety|depressed|depression|upset|grief|love|heartbroken|scared|afraid)\b",
        ),
        cue(
            HEALTH,
            r"\b(health|healthy|doctor|hospital|sick|illness|medicine|exercise|diet|sleep|therapy|mental health|symptom\w*)\b",
        ),
        cue(
            FINANCE,
            r"\b(money|finance|financial|invest\w*|stock\w*|market|crypto\w*|bitcoin|bank|budget|salary|price|economy|inflation|donat\w*)\b",
        ),
        cue(
            GAMING,
            r"\b(game|games|gaming|gamer|playstation|xbox|nintendo|steam|esports|rpg|speedrun)\b",
        ),
        cue(
            FOOD,
            r"\b(food|eat|eating|cook|cooking|recipe|restaurant|dinner|lunch|breakfast|pizza|coffee|delicious)\b",
        ),
        cue(
            URGENCY,
            r"\b(urgent|urgently|emergency|asap|immediately|right now|critical|deadline|hurry)\b",
        ),
        cue(
            SAFETY,
            r"\b(danger|dangerous|unsafe|safety|hurt|injur\w*|threat|attack|suicid\w*|self[- ]harm|abuse|help me)\b",
        ),
        cue(
            INFRASTRUCTURE,
            r"\b(server|servers|database|deploy\w*|kubernetes|docker|outage|latency|network|cloud|api|backend|infrastructure|cluster)\b",
        ),
    ]
});

static CODE_SYNTAX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```|\w+\(\)|=>|::|\bfn\s+\w+|\bdef\s+\w+|;\s*$")
        .expect("code heuristic must compile")
});

static CURRENCY_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[$€£]\s?\d|\d+(\.\d+)?\s?(usd|eur|dollars|euros)\b")
        .expect("currency heuristic must compile")
});

static DEEP_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwhy\b.*\?|\bmeaning\b.*\?|\bwhat is (the )?(point|purpose)\b")
        .expect("question heuristic must compile")
});

/// Detect the topic labels mentioned in `text`.
pub fn detect_topics(text: &str) -> BTreeSet<String> {
    let mut topics: BTreeSet<String> = TOPIC_PATTERNS
        .iter()
        .filter(|topic| topic.pattern.is_match(text))
        .map(|topic| topic.label.to_string())
        .collect();

    if CODE_SYNTAX.is_match(text) {
        topics.insert(TECHNOLOGY.to_string());
    }
    if CURRENCY_AMOUNT.is_match(&text.to_lowercase()) {
        topics.insert(FINANCE.to_string());
    }
    if DEEP_QUESTION.is_match(text) {
        topics.insert(PHILOSOPHY.to_string());
    }

    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_philosophy_and_technology_in_consciousness_question() {
        let topics = detect_topics("Is artificial intelligence conscious?");
        assert!(topics.contains(PHILOSOPHY));
        assert!(topics.contains(TECHNOLOGY));
    }

    #[test]
    fn short_smalltalk_has_no_topics() {
        assert!(detect_topics("ok sounds good").is_empty());
        assert!(detect_topics("").is_empty());
    }

    #[test]
    fn matching_is_case_insensitive_and_word_bounded() {
        assert!(detect_topics("I LOVE this SONG").contains(MUSIC));
        // "art" must not match inside "start".
        assert!(!detect_topics("let's start").contains(ART));
    }

    #[test]
    fn code_syntax_implies_technology() {
        let topics = detect_topics("try calling init() first");
        assert!(topics.contains(TECHNOLOGY));
    }

    #[test]
    fn currency_amount_implies_finance() {
        assert!(detect_topics("it cost me $40").contains(FINANCE));
        assert!(detect_topics("about 300 dollars total").contains(FINANCE));
    }

    #[test]
    fn why_question_implies_philosophy() {
        assert!(detect_topics("but why do we even bother?").contains(PHILOSOPHY));
        // A "why" without a question mark is not a deep question.
        assert!(!detect_topics("that's why").contains(PHILOSOPHY));
    }

    #[test]
    fn urgency_and_safety_cues() {
        let topics = detect_topics("This is an emergency, someone could get hurt");
        assert!(topics.contains(URGENCY));
        assert!(topics.contains(SAFETY));
    }

    #[test]
    fn infrastructure_cues() {
        let topics = detect_topics("the database server had an outage");
        assert!(topics.contains(INFRASTRUCTURE));
    }
}
