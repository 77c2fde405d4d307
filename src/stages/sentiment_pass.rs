use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::io::{
    PresentationAnnotation, QaAnnotation, annotate_presentation, annotate_qa_sentiment,
    extract_presentation, extract_qa,
};
use crate::models::SentimentScores;
use crate::sentiment::{SentimentClassifier, build_analysis_summary, split_sentences};

/// Configuration for the sentiment pass
#[derive(Debug, Clone)]
pub struct SentimentPassConfig {
    /// Maximum retries per classification request
    pub max_retries: u32,
}

impl Default for SentimentPassConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

/// Result of the sentiment pass
#[derive(Debug)]
pub struct SentimentPassResult {
    /// Presentation statements annotated
    pub statements_annotated: usize,
    /// Q&A turns annotated
    pub turns_annotated: usize,
}

/// Intermediate presentation-annotated document, removed when the pass
/// finishes or fails
struct IntermediateDoc {
    path: PathBuf,
}

impl IntermediateDoc {
    fn create(dir: &Path, contents: &str) -> Result<Self> {
        let path = dir.join(format!(".pres_sent_{}.xml", Uuid::new_v4()));
        fs::write(&path, contents)
            .with_context(|| format!("failed to write intermediate document {:?}", path))?;
        Ok(Self { path })
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read intermediate document {:?}", self.path))
    }
}

impl Drop for IntermediateDoc {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove intermediate document {:?}: {}", self.path, e);
        }
    }
}

/// Execute the sentiment pass on one transcript.
///
/// Presentation statements are scored sentence by sentence and annotated
/// with a majority label and analysis summary; the result is staged as an
/// intermediate document, re-read, and each Q&A turn is scored whole and
/// annotated with its label and rounded class scores. The fully annotated
/// document is written to `output`.
pub async fn execute_sentiment_pass<C: SentimentClassifier>(
    client: &C,
    input: &Path,
    output: &Path,
    config: &SentimentPassConfig,
) -> Result<SentimentPassResult> {
    let xml = fs::read_to_string(input)
        .with_context(|| format!("failed to read transcript {:?}", input))?;

    let statements = extract_presentation(&xml)?;
    info!(
        "Sentiment pass: scoring {} presentation statements",
        statements.len()
    );

    let mut annotations = Vec::with_capacity(statements.len());
    for statement in &statements {
        let sentences = split_sentences(&statement.text);
        let mut labels = Vec::with_capacity(sentences.len());
        for sentence in &sentences {
            let scores = classify_with_retry(client, sentence, config.max_retries).await?;
            labels.push(scores.label());
        }
        let analysis = build_analysis_summary(&sentences, &labels);
        let sentiment = crate::sentiment::majority_label(&labels).as_str().to_string();
        annotations.push(PresentationAnnotation { sentiment, analysis });
    }

    let presentation_annotated = annotate_presentation(&xml, &annotations)?;

    let staging_dir = output.parent().unwrap_or_else(|| Path::new("."));
    let intermediate = IntermediateDoc::create(staging_dir, &presentation_annotated)?;

    let staged = intermediate.read()?;
    let turns = extract_qa(&staged)?;
    info!("Sentiment pass: scoring {} Q&A turns", turns.len());

    let mut qa_annotations = Vec::with_capacity(turns.len());
    for turn in &turns {
        let scores = classify_with_retry(client, &turn.text, config.max_retries)
            .await?
            .rounded();
        qa_annotations.push(QaAnnotation {
            label: scores.label().as_str().to_string(),
            scores,
        });
    }

    let fully_annotated = annotate_qa_sentiment(&staged, &qa_annotations)?;
    fs::write(output, fully_annotated)
        .with_context(|| format!("failed to write annotated transcript {:?}", output))?;

    Ok(SentimentPassResult {
        statements_annotated: annotations.len(),
        turns_annotated: qa_annotations.len(),
    })
}

async fn classify_with_retry<C: SentimentClassifier>(
    client: &C,
    text: &str,
    max_retries: u32,
) -> Result<SentimentScores> {
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            warn!("Classification retry {} of {}", attempt, max_retries);
        }
        match client.classify(text).await {
            Ok(scores) => return Ok(scores),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error
        .unwrap_or_else(|| anyhow::anyhow!("classification failed with no recorded error")))
}
