//! Lexicon sentiment score for a single message.

use std::sync::LazyLock;

use regex::Regex;

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(good|great|love|lovely|happy|glad|awesome|amazing|wonderful|fantastic|nice|thanks|thank you|excited|fun|beautiful|enjoy\w*|cool|brilliant|yay)\b",
    )
    .expect("positive lexicon must compile")
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(bad|sad|terrible|awful|hate|angry|upset|lonely|depressed|miserable|horrible|worried|anxious|scared|afraid|hurt|cry\w*|tired|hopeless|alone|grief|lost|broken|sorry)\b",
    )
    .expect("negative lexicon must compile")
});

/// Score `text` in [-1, 1]: (positive hits - negative hits) / total hits.
///
/// Returns 0.0 for text without any lexicon hits.
pub fn score_sentiment(text: &str) -> f64 {
    let positive = POSITIVE.find_iter(text).count() as f64;
    let negative = NEGATIVE.find_iter(text).count() as f64;
    let total = positive + negative;
    if total == 0.0 {
        return 0.0;
    }
    ((positive - negative) / total).clamp(-1.0, 1.0)
}
