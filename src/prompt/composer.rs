//! Deterministic system prompt composition for one exchange.

use crate::core::sentiment::Sentiment;

/// Build the system prompt from gathered memory, context and transcript.
///
/// Pure string assembly with a fixed section order: personal memory,
/// collective memory, context, transcript. The sentiment is embedded as a
/// tone directive. Empty memory lists empty their section, never error.
#[must_use]
pub fn compose(
    persona: &str,
    context: &str,
    transcript: &str,
    personal: &[String],
    collective: &[String],
    sentiment: Sentiment,
) -> String {
    let mut out = String::with_capacity(estimate_len(
        persona, context, transcript, personal, collective,
    ));

    out.push_str(persona);
    out.push_str(" Tone: ");
    out.push_str(sentiment.as_str());
    out.push_str(".\n");

    out.push_str("## Personal Memory:\n");
    for entry in personal {
        out.push_str(entry);
        out.push('\n');
    }

    out.push_str("## Collective Memory:\n");
    for entry in collective {
        out.push_str(entry);
        out.push('\n');
    }

    out.push_str("## Context:\n");
    out.push_str(context);
    out.push('\n');

    out.push_str("## Transcript:\n");
    out.push_str(transcript);
    out.push('\n');

    out
}

fn estimate_len(
    persona: &str,
    context: &str,
    transcript: &str,
    personal: &[String],
    collective: &[String],
) -> usize {
    let memories: usize = personal
        .iter()
        .chain(collective)
        .map(|entry| entry.len() + 1)
        .sum();
    persona.len() + context.len() + transcript.len() + memories + 96
}
