//! `murmur analyze` -- offline topic, sentiment and style analysis.

use console::style;
use serde::Serialize;
use tracing::info_span;

use murmur_core::dynamics::sentiment::score_sentiment;
use murmur_core::dynamics::topics::detect_topics;
use murmur_core::dynamics::{DynamicsEngine, InMemoryConversationStore};
use murmur_observe::genai_attrs::OP_ANALYZE;
use murmur_types::style::ConversationStyle;

/// Everything the engine derives from one message in a fresh conversation.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub topics: Vec<String>,
    pub sentiment: f64,
    pub detected_style: ConversationStyle,
    pub style_scores: Vec<(ConversationStyle, f64)>,
    pub style_prompt: String,
    /// Style the conversation moves to after this message.
    pub next_style: ConversationStyle,
    pub momentum: f64,
    pub silence_probability: f64,
}

/// Run the analysis without printing.
pub fn build_analysis(text: &str) -> Analysis {
    let engine = DynamicsEngine::new(InMemoryConversationStore::new());
    let catalog = engine.catalog();
    let detected_style = catalog.detect_style(text);

    let mut style_scores: Vec<_> = catalog
        .score_styles(text)
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .collect();
    style_scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    let state = engine.update_state("analyze", text);

    Analysis {
        topics: detect_topics(text).into_iter().collect(),
        sentiment: score_sentiment(text),
        detected_style,
        style_scores,
        style_prompt: catalog.get_style_prompt(detected_style).to_string(),
        next_style: state.current_style,
        momentum: state.momentum,
        silence_probability: state.silence_probability,
    }
}

pub fn analyze(text: &str, json: bool) -> anyhow::Result<()> {
    let _span = info_span!("murmur.analyze", gen_ai.operation.name = OP_ANALYZE).entered();
    let analysis = build_analysis(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let topics = if analysis.topics.is_empty() {
        style("(none)").dim().to_string()
    } else {
        analysis.topics.join(", ")
    };

    println!();
    println!("  {}      {}", style("Topics:").bold(), topics);
    println!("  {}   {:+.2}", style("Sentiment:").bold(), analysis.sentiment);
    println!(
        "  {}       {}",
        style("Style:").bold(),
        style(analysis.detected_style).cyan()
    );
    for (s, score) in &analysis.style_scores {
        println!("    {} {:.1}", style(format!("{:<14}", s.as_str())).dim(), score);
    }
    println!("  {}  {}", style("Next style:").bold(), analysis.next_style);
    println!(
        "  {}    {:.2}  {}  {:.2}",
        style("Momentum:").bold(),
        analysis.momentum,
        style("Silence:").bold(),
        analysis.silence_probability
    );
    println!();
    println!("  {}", style(&analysis.style_prompt).dim());
    println!();
    Ok(())
}
