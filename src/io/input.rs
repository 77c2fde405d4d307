use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use super::{QA_SECTION_NAME, SchemaError};
use crate::models::{NEUTRAL_PLACEHOLDER, PresentationStatement, QaSentiment, QaTurn};

/// Extract presentation statements from a transcript file
pub fn extract_presentation_file(path: &Path) -> Result<Vec<PresentationStatement>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {:?}", path))?;
    extract_presentation(&xml)
}

/// Extract Q&A turns from a transcript file
pub fn extract_qa_file(path: &Path) -> Result<Vec<QaTurn>> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {:?}", path))?;
    extract_qa(&xml)
}

/// Walk every `<statement>` element in document order, collecting the
/// speaker attributes, the speaker name (element text before the first
/// child), and the `<text>` body.
pub fn extract_presentation(xml: &str) -> Result<Vec<PresentationStatement>> {
    let mut reader = Reader::from_str(xml);
    let mut statements = Vec::new();

    let mut in_statement = false;
    let mut in_speaker = false;
    let mut in_text = false;
    // element text ends at the first child, matching tree semantics
    let mut speaker_child_seen = false;
    let mut text_child_seen = false;

    let mut speaker_id = String::new();
    let mut position: Option<String> = None;
    let mut name = String::new();
    let mut body: Option<String> = None;

    loop {
        match reader.read_event().context("malformed transcript XML")? {
            Event::Start(e) => match e.name().as_ref() {
                b"statement" => {
                    in_statement = true;
                    in_speaker = false;
                    in_text = false;
                    speaker_id.clear();
                    position = None;
                    name.clear();
                    body = None;
                }
                b"speaker" if in_statement && !in_speaker => {
                    in_speaker = true;
                    speaker_child_seen = false;
                    speaker_id = attr_value(&e, "id")?.unwrap_or_default();
                    position = attr_value(&e, "position")?;
                }
                b"text" if in_speaker && !in_text => {
                    speaker_child_seen = true;
                    in_text = true;
                    text_child_seen = false;
                    body = Some(String::new());
                }
                _ => {
                    if in_text {
                        text_child_seen = true;
                    } else if in_speaker {
                        speaker_child_seen = true;
                    }
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"text" if in_speaker => {
                    speaker_child_seen = true;
                    body.get_or_insert_with(String::new);
                }
                _ => {
                    if in_text {
                        text_child_seen = true;
                    } else if in_speaker {
                        speaker_child_seen = true;
                    }
                }
            },
            Event::Text(t) => {
                let value = t.unescape().context("invalid character data")?;
                if in_text && !text_child_seen {
                    if let Some(buf) = body.as_mut() {
                        buf.push_str(&value);
                    }
                } else if in_speaker && !speaker_child_seen {
                    name.push_str(&value);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"text" if in_text => in_text = false,
                b"speaker" if in_speaker => in_speaker = false,
                b"statement" if in_statement => {
                    in_statement = false;
                    statements.push(PresentationStatement {
                        speaker_id: speaker_id.trim().to_string(),
                        speaker_name: name.trim().to_string(),
                        position: position.take(),
                        text: finalize_body(body.take(), name.trim()),
                    });
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(statements)
}

/// Walk the `<speaker>` elements of the Q&A section in document order,
/// collecting attributes, name, text body, and any sentiment tags written
/// by an earlier pass.
pub fn extract_qa(xml: &str) -> Result<Vec<QaTurn>> {
    let mut reader = Reader::from_str(xml);
    let mut turns = Vec::new();

    let mut section_found = false;
    let mut in_section = false;
    let mut in_speaker = false;
    let mut in_text = false;
    let mut speaker_child_seen = false;
    let mut text_child_seen = false;
    // which sentiment child of <text> we are inside, if any
    let mut score_tag: Option<ScoreTag> = None;

    let mut speaker_id = String::new();
    let mut company: Option<String> = None;
    let mut name = String::new();
    let mut body: Option<String> = None;
    let mut label = String::new();
    let mut pos = String::new();
    let mut neg = String::new();
    let mut neutr = String::new();

    loop {
        match reader.read_event().context("malformed transcript XML")? {
            Event::Start(e) => match e.name().as_ref() {
                b"section" => {
                    if attr_value(&e, "name")?.as_deref() == Some(QA_SECTION_NAME) {
                        in_section = true;
                        section_found = true;
                    }
                }
                b"speaker" if in_section && !in_speaker => {
                    in_speaker = true;
                    in_text = false;
                    speaker_child_seen = false;
                    speaker_id = attr_value(&e, "id")?.unwrap_or_default();
                    company = attr_value(&e, "company")?;
                    name.clear();
                    body = None;
                    label.clear();
                    pos.clear();
                    neg.clear();
                    neutr.clear();
                }
                b"text" if in_speaker && !in_text => {
                    speaker_child_seen = true;
                    in_text = true;
                    text_child_seen = false;
                    body = Some(String::new());
                }
                tag @ (b"sentiment" | b"pos" | b"neg" | b"neutr") if in_text => {
                    text_child_seen = true;
                    score_tag = Some(match tag {
                        b"sentiment" => ScoreTag::Label,
                        b"pos" => ScoreTag::Positive,
                        b"neg" => ScoreTag::Negative,
                        _ => ScoreTag::Neutral,
                    });
                }
                _ => {
                    if in_text {
                        text_child_seen = true;
                    } else if in_speaker {
                        speaker_child_seen = true;
                    }
                }
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"text" if in_speaker => {
                    speaker_child_seen = true;
                    body.get_or_insert_with(String::new);
                }
                _ => {
                    if in_text {
                        text_child_seen = true;
                    } else if in_speaker {
                        speaker_child_seen = true;
                    }
                }
            },
            Event::Text(t) => {
                let value = t.unescape().context("invalid character data")?;
                match score_tag {
                    Some(ScoreTag::Label) => label.push_str(&value),
                    Some(ScoreTag::Positive) => pos.push_str(&value),
                    Some(ScoreTag::Negative) => neg.push_str(&value),
                    Some(ScoreTag::Neutral) => neutr.push_str(&value),
                    None => {
                        if in_text && !text_child_seen {
                            if let Some(buf) = body.as_mut() {
                                buf.push_str(&value);
                            }
                        } else if in_speaker && !speaker_child_seen {
                            name.push_str(&value);
                        }
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"sentiment" | b"pos" | b"neg" | b"neutr" if score_tag.is_some() => {
                    score_tag = None;
                }
                b"text" if in_text => in_text = false,
                b"speaker" if in_speaker => {
                    in_speaker = false;
                    turns.push(QaTurn {
                        speaker_id: speaker_id.trim().to_string(),
                        speaker_name: name.trim().to_string(),
                        company: company.take(),
                        text: finalize_body(body.take(), name.trim()),
                        sentiment: QaSentiment {
                            label: non_empty(&label),
                            positive: parse_score(&pos, "pos"),
                            negative: parse_score(&neg, "neg"),
                            neutral: parse_score(&neutr, "neutr"),
                        },
                    });
                }
                b"section" if in_section => in_section = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !section_found {
        return Err(SchemaError::MissingQaSection.into());
    }

    Ok(turns)
}

#[derive(Clone, Copy)]
enum ScoreTag {
    Label,
    Positive,
    Negative,
    Neutral,
}

fn attr_value(element: &BytesStart, name: &str) -> Result<Option<String>> {
    let attr = element
        .try_get_attribute(name)
        .with_context(|| format!("malformed '{}' attribute", name))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .with_context(|| format!("malformed '{}' attribute value", name))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn finalize_body(body: Option<String>, speaker: &str) -> String {
    let trimmed = body.map(|b| b.trim().to_string()).unwrap_or_default();
    if trimmed.is_empty() {
        warn!(
            "statement by '{}' has no text, substituting placeholder",
            speaker
        );
        NEUTRAL_PLACEHOLDER.to_string()
    } else {
        trimmed
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_score(value: &str, tag: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(score) => Some(score),
        Err(_) => {
            warn!("unparseable <{}> value '{}', treating as missing", tag, trimmed);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<root>
  <body>
    <section name="Presentation">
      <statement>
        <speaker id="1" position="CEO">Jane Smith
          <text>Revenue grew nicely this quarter. Margins declined in Europe.</text>
        </speaker>
      </statement>
      <statement>
        <speaker id="2" position="CFO">Alex Chen
          <text/>
        </speaker>
      </statement>
    </section>
    <section name="Question and Answer">
      <speaker id="-1">Operator
        <text>Our first question comes from the line of John Doe.</text>
      </speaker>
      <speaker id="2" company="Acme Research">John Doe
        <text>Thanks, that&apos;s helpful.</text>
      </speaker>
    </section>
  </body>
</root>"#;

    #[test]
    fn test_extract_presentation_in_document_order() {
        let statements = extract_presentation(SAMPLE).unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].speaker_id, "1");
        assert_eq!(statements[0].speaker_name, "Jane Smith");
        assert_eq!(statements[0].position.as_deref(), Some("CEO"));
        assert_eq!(
            statements[0].text,
            "Revenue grew nicely this quarter. Margins declined in Europe."
        );
        assert_eq!(statements[1].speaker_name, "Alex Chen");
    }

    #[test]
    fn test_missing_text_becomes_placeholder() {
        let statements = extract_presentation(SAMPLE).unwrap();
        assert_eq!(statements[1].text, "Neutral.");
    }

    #[test]
    fn test_extract_qa_in_document_order() {
        let turns = extract_qa(SAMPLE).unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].speaker_id, "-1");
        assert_eq!(turns[0].speaker_name, "Operator");
        assert!(turns[0].is_operator());
        assert_eq!(turns[1].speaker_id, "2");
        assert_eq!(turns[1].company.as_deref(), Some("Acme Research"));
        assert_eq!(turns[1].text, "Thanks, that's helpful.");
        assert!(turns[1].sentiment.positive.is_none());
    }

    #[test]
    fn test_extract_qa_reads_existing_sentiment_tags() {
        let xml = r#"<root><body><section name="Question and Answer">
            <speaker id="2" company="Acme">John Doe
              <text>Thanks.<sentiment>neutral</sentiment><pos>0.1</pos><neg>0.05</neg><neutr>0.85</neutr></text>
            </speaker>
        </section></body></root>"#;

        let turns = extract_qa(xml).unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "Thanks.");
        assert_eq!(turns[0].sentiment.label.as_deref(), Some("neutral"));
        assert_eq!(turns[0].sentiment.positive, Some(0.1));
        assert_eq!(turns[0].sentiment.negative, Some(0.05));
        assert_eq!(turns[0].sentiment.neutral, Some(0.85));
    }

    #[test]
    fn test_missing_qa_section_is_fatal() {
        let xml = "<root><body><section name=\"Presentation\"/></body></root>";
        let err = extract_qa(xml).unwrap_err();
        assert!(err.downcast_ref::<SchemaError>().is_some());
    }
}
