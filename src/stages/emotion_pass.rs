use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::emotion::EmotionEngine;
use crate::io::{annotate_qa_emotion, extract_qa};

/// Result of the emotion pass
#[derive(Debug)]
pub struct EmotionPassResult {
    /// Q&A turns classified
    pub turns_classified: usize,
    /// Operator turns left unannotated
    pub operator_turns_skipped: usize,
    /// Occurrences of each emotion label; combined labels count once per
    /// constituent emotion
    pub label_counts: HashMap<String, usize>,
}

/// Execute the emotion pass on one sentiment-annotated transcript.
///
/// Every Q&A turn is classified by score ranges and keyword stems and the
/// merged label is written as a lower-cased `<emotion>` child of the turn's
/// text element. Operator turns are classified but not annotated.
pub fn execute_emotion_pass(
    engine: &EmotionEngine,
    input: &Path,
    output: &Path,
) -> Result<EmotionPassResult> {
    let xml = fs::read_to_string(input)
        .with_context(|| format!("failed to read transcript {:?}", input))?;

    let turns = extract_qa(&xml)?;
    info!("Emotion pass: classifying {} Q&A turns", turns.len());

    let mut labels = Vec::with_capacity(turns.len());
    let mut label_counts: HashMap<String, usize> = HashMap::new();
    let mut operator_turns_skipped = 0;

    for turn in &turns {
        let outcome = engine.classify_turn(turn);
        if turn.is_operator() {
            operator_turns_skipped += 1;
        } else {
            for emotion in outcome.combined.split(", ") {
                *label_counts.entry(emotion.to_string()).or_insert(0) += 1;
            }
        }
        labels.push(outcome.combined);
    }

    let mut frequency: Vec<(&String, &usize)> = label_counts.iter().collect();
    frequency.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (label, count) in frequency {
        info!("Emotion frequency: {} x{}", label, count);
    }

    let annotated = annotate_qa_emotion(&xml, &labels)?;
    fs::write(output, annotated)
        .with_context(|| format!("failed to write annotated transcript {:?}", output))?;

    Ok(EmotionPassResult {
        turns_classified: turns.len(),
        operator_turns_skipped,
        label_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root><body>
  <section name="Question and Answer">
    <speaker id="-1">Operator
      <text>Our first question comes from John Doe.</text>
    </speaker>
    <speaker id="2" company="Acme Research">John Doe
      <text>Thanks, that&apos;s helpful.<sentiment>neutral</sentiment><pos>0.1</pos><neg>0.05</neg><neutr>0.85</neutr></text>
    </speaker>
    <speaker id="3">Jane Roe
      <text>We are worried about margin pressure in Europe this year.</text>
    </speaker>
  </section>
</body></root>"#;

    #[test]
    fn test_emotion_pass_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("call_sentiment.xml");
        let output = dir.path().join("call_emotion.xml");
        fs::write(&input, SAMPLE).unwrap();

        let engine = EmotionEngine::default();
        let result = execute_emotion_pass(&engine, &input, &output).unwrap();

        assert_eq!(result.turns_classified, 3);
        assert_eq!(result.operator_turns_skipped, 1);

        let annotated = fs::read_to_string(&output).unwrap();
        // short thank-you turn is an acknowledgement, written lower-case
        assert!(annotated.contains("<emotion>acknowledgement</emotion>"));
        // "worried" stems to a Concern keyword
        assert!(annotated.contains("<emotion>concern</emotion>"));
        // the operator turn gets no emotion tag
        assert_eq!(annotated.matches("<emotion>").count(), 2);

        // operator turn is excluded from the frequency counts
        assert_eq!(result.label_counts.get("Acknowledgement"), Some(&1));
        assert_eq!(result.label_counts.get("Concern"), Some(&1));
        assert_eq!(result.label_counts.len(), 2);
    }

    #[test]
    fn test_frequency_counts_split_combined_labels() {
        use crate::emotion::{EmotionTables, KeywordTable, ScoreRangeTable, ScoreRanges};

        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<root><body><section name="Question and Answer">
  <speaker id="2">John Doe
    <text>Momentum in the enterprise segment carried the quarter comfortably.<pos>0.7</pos><neg>0.1</neg><neutr>0.2</neutr></text>
  </speaker>
</section></body></root>"#;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("call_sentiment.xml");
        let output = dir.path().join("call_emotion.xml");
        fs::write(&input, xml).unwrap();

        // both ranges cover the turn's scores
        let tables = EmotionTables {
            score_ranges: ScoreRangeTable {
                entries: vec![
                    (
                        "Confidence".to_string(),
                        ScoreRanges {
                            positive: [0.5, 1.0],
                            negative: [0.0, 0.2],
                            neutral: [0.0, 0.5],
                        },
                    ),
                    (
                        "Optimism".to_string(),
                        ScoreRanges {
                            positive: [0.6, 0.8],
                            negative: [0.0, 0.2],
                            neutral: [0.0, 0.5],
                        },
                    ),
                ],
            },
            keywords: KeywordTable {
                entries: vec![("Concern".to_string(), vec!["worri".to_string()])],
            },
        };

        let result = execute_emotion_pass(&EmotionEngine::new(tables), &input, &output).unwrap();

        assert_eq!(result.label_counts.get("Confidence"), Some(&1));
        assert_eq!(result.label_counts.get("Optimism"), Some(&1));
        assert!(!result.label_counts.contains_key("Confidence, Optimism"));

        // the annotation itself still carries the combined label
        let annotated = fs::read_to_string(&output).unwrap();
        assert!(annotated.contains("<emotion>confidence, optimism</emotion>"));
    }

    #[test]
    fn test_emotion_pass_requires_qa_section() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.xml");
        let output = dir.path().join("out.xml");
        fs::write(
            &input,
            r#"<?xml version="1.0"?><root><body><section name="Presentation"/></body></root>"#,
        )
        .unwrap();

        let engine = EmotionEngine::default();
        assert!(execute_emotion_pass(&engine, &input, &output).is_err());
        assert!(!output.exists());
    }
}
