use crate::models::SentimentLabel;

use super::majority_label;

/// Build the per-statement analysis summary: the majority label followed by
/// per-class sentence counts and percentages, then the negative-sentence
/// report when any sentence scored negative.
pub fn build_analysis_summary(sentences: &[String], labels: &[SentimentLabel]) -> String {
    let total = labels.len().max(1);
    let count = |wanted: SentimentLabel| labels.iter().filter(|l| **l == wanted).count();

    let positive = count(SentimentLabel::Positive);
    let negative = count(SentimentLabel::Negative);
    let neutral = count(SentimentLabel::Neutral);
    let pct = |n: usize| n as f64 * 100.0 / total as f64;

    let mut summary = format!(
        "Overall sentiment is {}. {} sentences are positive ({:.2}%). {} sentences are negative ({:.2}%). {} sentences are neutral ({:.2}%). ",
        majority_label(labels).as_str(),
        positive,
        pct(positive),
        negative,
        pct(negative),
        neutral,
        pct(neutral),
    );

    if negative > 0 {
        summary.push_str(&negative_sentences_report(sentences, labels));
    }

    summary
}

/// Enumerate the sentences classified negative, in document order
pub fn negative_sentences_report(sentences: &[String], labels: &[SentimentLabel]) -> String {
    let mut report = String::from("The classified negative sentences are: ");
    let mut ordinal = 0;
    for (sentence, label) in sentences.iter().zip(labels.iter()) {
        if *label == SentimentLabel::Negative {
            ordinal += 1;
            report.push_str(&format!("({}) {}. ", ordinal, sentence));
        }
    }
    report
}
