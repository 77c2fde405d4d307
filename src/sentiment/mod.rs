pub mod analysis;
pub mod client;

pub use analysis::{build_analysis_summary, negative_sentences_report};
pub use client::{HttpSentimentClassifier, SentimentApiConfig};

use anyhow::Result;

use crate::models::{NEUTRAL_PLACEHOLDER, SentimentLabel, SentimentScores};

/// Scores a span of transcript text.
///
/// The production implementation calls the sentiment service over HTTP;
/// tests substitute a canned classifier.
#[allow(async_fn_in_trait)]
pub trait SentimentClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScores>;
}

/// Split a statement into sentences on terminal punctuation.
///
/// Empty segments from consecutive terminators are dropped. A statement
/// with no scorable sentences yields the neutral placeholder so every
/// statement produces at least one classification.
pub fn split_sentences(text: &str) -> Vec<String> {
    let sentences: Vec<String> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if sentences.is_empty() {
        vec![NEUTRAL_PLACEHOLDER.to_string()]
    } else {
        sentences
    }
}

/// Most frequent label across sentence classifications, ties broken in the
/// canonical order positive, negative, neutral
pub fn majority_label(labels: &[SentimentLabel]) -> SentimentLabel {
    let mut counts = [0usize; 3];
    for label in labels {
        match label {
            SentimentLabel::Positive => counts[0] += 1,
            SentimentLabel::Negative => counts[1] += 1,
            SentimentLabel::Neutral => counts[2] += 1,
        }
    }

    let mut best = 0;
    for i in 1..3 {
        if counts[i] > counts[best] {
            best = i;
        }
    }

    match best {
        0 => SentimentLabel::Positive,
        1 => SentimentLabel::Negative,
        _ => SentimentLabel::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_on_terminators() {
        let sentences = split_sentences("Revenue grew. Margins declined! Why? Mix.");
        assert_eq!(sentences, vec!["Revenue grew", "Margins declined", "Why", "Mix"]);
    }

    #[test]
    fn test_split_drops_empty_segments() {
        let sentences = split_sentences("Good quarter... Really.");
        assert_eq!(sentences, vec!["Good quarter", "Really"]);
    }

    #[test]
    fn test_split_empty_statement_yields_placeholder() {
        assert_eq!(split_sentences(""), vec!["Neutral."]);
        assert_eq!(split_sentences("..."), vec!["Neutral."]);
    }

    #[test]
    fn test_majority_label() {
        let labels = [
            SentimentLabel::Positive,
            SentimentLabel::Neutral,
            SentimentLabel::Positive,
        ];
        assert_eq!(majority_label(&labels), SentimentLabel::Positive);
    }

    #[test]
    fn test_majority_tie_breaks_canonically() {
        let labels = [SentimentLabel::Neutral, SentimentLabel::Negative];
        assert_eq!(majority_label(&labels), SentimentLabel::Negative);

        let labels = [
            SentimentLabel::Neutral,
            SentimentLabel::Negative,
            SentimentLabel::Positive,
        ];
        assert_eq!(majority_label(&labels), SentimentLabel::Positive);
    }
}
