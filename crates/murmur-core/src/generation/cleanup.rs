//! Post-processing of raw completion text.

/// Stop sequences sent with every completion request and stripped from
/// accepted text.
pub const STOP_SEQUENCES: [&str; 4] = ["\nUser:", "\nHuman:", "<|eot_id|>", "</s>"];

/// Shortest accepted completion, in characters after cleanup.
pub const MIN_COMPLETION_CHARS: usize = 2;

/// Truncate `text` at the first occurrence of every stop sequence, then trim.
pub fn strip_stop_sequences(text: &str) -> String {
    let mut cleaned = text;
    for stop in STOP_SEQUENCES {
        if let Some(index) = cleaned.find(stop) {
            cleaned = &cleaned[..index];
        }
    }
    cleaned.trim().to_string()
}

/// Drop a leading `"{speaker}:"` tag the model copied from the transcript.
pub fn strip_speaker_tag(text: &str, speaker: &str) -> String {
    let trimmed = text.trim_start();
    match trimmed.strip_prefix(speaker) {
        Some(rest) if rest.starts_with(':') => rest[1..].trim().to_string(),
        _ => text.trim().to_string(),
    }
}

/// Full cleanup for a persona's completion.
pub fn clean_completion(text: &str, speaker: &str) -> String {
    strip_speaker_tag(&strip_stop_sequences(text), speaker)
}

/// Whether cleaned text is long enough to be worth sending.
pub fn is_substantive(text: &str) -> bool {
    text.trim().chars().count() >= MIN_COMPLETION_CHARS
}
