use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{QA_SECTION_NAME, SchemaError};
use crate::models::{OPERATOR_SPEAKER_ID, SentimentScores};

/// Sentiment result written into one presentation statement
#[derive(Debug, Clone)]
pub struct PresentationAnnotation {
    /// Majority label across the statement's sentences
    pub sentiment: String,
    /// Human-readable analysis summary
    pub analysis: String,
}

/// Sentiment result written into one Q&A turn
#[derive(Debug, Clone)]
pub struct QaAnnotation {
    pub label: String,
    pub scores: SentimentScores,
}

/// Inject `<sentiment>` and `<analysis>` children into each presentation
/// statement's `<text>` element.
///
/// The rewrite is additive: every original event passes through unchanged
/// and new children land immediately before the closing `</text>` tag. The
/// Nth annotation goes to the Nth statement in document order; a count
/// mismatch fails instead of mislabeling.
pub fn annotate_presentation(xml: &str, annotations: &[PresentationAnnotation]) -> Result<String> {
    rewrite(xml, |ctx| {
        match ctx {
            RewriteContext::StatementText { index } => annotations.get(index).map(|ann| {
                vec![
                    ("sentiment", ann.sentiment.clone()),
                    ("analysis", ann.analysis.clone()),
                ]
            }),
            _ => None,
        }
    })
    .and_then(|(output, nodes)| check_alignment(output, nodes.statement_texts, annotations.len()))
}

/// Inject `<sentiment>`, `<pos>`, `<neg>`, and `<neutr>` children into each
/// Q&A turn's `<text>` element.
pub fn annotate_qa_sentiment(xml: &str, annotations: &[QaAnnotation]) -> Result<String> {
    rewrite(xml, |ctx| {
        match ctx {
            RewriteContext::QaText { index, .. } => annotations.get(index).map(|ann| {
                vec![
                    ("sentiment", ann.label.clone()),
                    ("pos", format!("{}", ann.scores.positive)),
                    ("neg", format!("{}", ann.scores.negative)),
                    ("neutr", format!("{}", ann.scores.neutral)),
                ]
            }),
            _ => None,
        }
    })
    .and_then(|(output, nodes)| check_alignment(output, nodes.qa_speakers, annotations.len()))
}

/// Inject a lower-cased `<emotion>` child into each Q&A turn's `<text>`
/// element, skipping operator turns (speaker id `-1`). The record index
/// still advances over skipped turns so alignment is preserved.
pub fn annotate_qa_emotion(xml: &str, labels: &[String]) -> Result<String> {
    rewrite(xml, |ctx| {
        match ctx {
            RewriteContext::QaText { index, speaker_id } => {
                if speaker_id == OPERATOR_SPEAKER_ID {
                    None
                } else {
                    labels
                        .get(index)
                        .map(|label| vec![("emotion", label.to_lowercase())])
                }
            }
            _ => None,
        }
    })
    .and_then(|(output, nodes)| check_alignment(output, nodes.qa_speakers, labels.len()))
}

fn check_alignment(output: String, nodes: usize, records: usize) -> Result<String> {
    if nodes != records {
        return Err(SchemaError::AnnotationMismatch { records, nodes }.into());
    }
    Ok(output)
}

/// Where in the document a `</text>` close is happening
enum RewriteContext<'a> {
    /// Text element of the Nth presentation statement
    StatementText { index: usize },
    /// Text element of the Nth Q&A speaker turn
    QaText { index: usize, speaker_id: &'a str },
}

/// Counts of annotatable nodes seen during a rewrite
#[derive(Debug, Default)]
struct NodeCounts {
    statement_texts: usize,
    qa_speakers: usize,
}

/// Stream the document through unchanged, asking `inject` for extra child
/// elements whenever a target `<text>` element closes.
fn rewrite<F>(xml: &str, mut inject: F) -> Result<(String, NodeCounts)>
where
    F: FnMut(RewriteContext) -> Option<Vec<(&'static str, String)>>,
{
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut counts = NodeCounts::default();

    let mut in_statement = false;
    let mut in_statement_speaker = false;
    let mut in_section = false;
    let mut in_qa_speaker = false;
    let mut qa_speaker_id = String::new();
    let mut qa_index = 0usize;
    let mut first = true;

    loop {
        let event = reader.read_event().context("malformed transcript XML")?;

        if first {
            first = false;
            // the output always carries a declaration
            if !matches!(event, Event::Decl(_)) {
                writer
                    .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
                    .context("failed to write XML declaration")?;
            }
        }

        match &event {
            Event::Start(e) => match e.name().as_ref() {
                b"statement" => in_statement = true,
                b"speaker" if in_statement => in_statement_speaker = true,
                b"speaker" if in_section => {
                    in_qa_speaker = true;
                    qa_speaker_id = attr_or_default(e, "id")?;
                }
                b"section" => {
                    if attr_or_default(e, "name")? == QA_SECTION_NAME {
                        in_section = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"text" => {
                // expand an empty <text/> so children can be injected
                let context = if in_statement_speaker {
                    counts.statement_texts += 1;
                    Some(RewriteContext::StatementText {
                        index: counts.statement_texts - 1,
                    })
                } else if in_qa_speaker {
                    Some(RewriteContext::QaText {
                        index: qa_index,
                        speaker_id: &qa_speaker_id,
                    })
                } else {
                    None
                };

                if let Some(ctx) = context {
                    let children = inject(ctx);
                    writer
                        .write_event(Event::Start(e.to_owned()))
                        .context("failed to write element")?;
                    if let Some(children) = children {
                        write_children(&mut writer, &children)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new("text")))
                        .context("failed to write element")?;
                    continue;
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"text" if in_statement_speaker => {
                    counts.statement_texts += 1;
                    if let Some(children) = inject(RewriteContext::StatementText {
                        index: counts.statement_texts - 1,
                    }) {
                        write_children(&mut writer, &children)?;
                    }
                }
                b"text" if in_qa_speaker => {
                    if let Some(children) = inject(RewriteContext::QaText {
                        index: qa_index,
                        speaker_id: &qa_speaker_id,
                    }) {
                        write_children(&mut writer, &children)?;
                    }
                }
                b"speaker" if in_qa_speaker => {
                    in_qa_speaker = false;
                    qa_index += 1;
                    counts.qa_speakers += 1;
                }
                b"speaker" if in_statement_speaker => in_statement_speaker = false,
                b"statement" => in_statement = false,
                b"section" if in_section => in_section = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }

        writer
            .write_event(event)
            .context("failed to write event")?;
    }

    let output = String::from_utf8(writer.into_inner()).context("annotated XML is not UTF-8")?;
    Ok((output, counts))
}

fn write_children(writer: &mut Writer<Vec<u8>>, children: &[(&'static str, String)]) -> Result<()> {
    for (tag, value) in children {
        writer
            .write_event(Event::Start(BytesStart::new(*tag)))
            .with_context(|| format!("failed to write <{}>", tag))?;
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .with_context(|| format!("failed to write <{}> text", tag))?;
        writer
            .write_event(Event::End(BytesEnd::new(*tag)))
            .with_context(|| format!("failed to write </{}>", tag))?;
    }
    Ok(())
}

fn attr_or_default(element: &BytesStart, name: &str) -> Result<String> {
    let attr = element
        .try_get_attribute(name)
        .with_context(|| format!("malformed '{}' attribute", name))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .with_context(|| format!("malformed '{}' attribute value", name))?;
            Ok(value.into_owned())
        }
        None => Ok(String::new()),
    }
}
