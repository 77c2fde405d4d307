use serde::{Deserialize, Serialize};

/// Substituted for absent statement text so no record carries an empty body
pub const NEUTRAL_PLACEHOLDER: &str = "Neutral.";

/// Speaker id marking a non-substantive turn (the operator)
pub const OPERATOR_SPEAKER_ID: &str = "-1";

/// Classifier output: a probability per sentiment class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScores {
    /// Round all three scores to 4 decimal places
    pub fn rounded(&self) -> Self {
        Self {
            positive: round4(self.positive),
            negative: round4(self.negative),
            neutral: round4(self.neutral),
        }
    }

    /// Argmax label; ties resolve in canonical order (positive, negative, neutral)
    pub fn label(&self) -> SentimentLabel {
        let mut label = SentimentLabel::Positive;
        let mut best = self.positive;
        if self.negative > best {
            label = SentimentLabel::Negative;
            best = self.negative;
        }
        if self.neutral > best {
            label = SentimentLabel::Neutral;
        }
        label
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Discrete sentiment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// One statement from the presentation section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationStatement {
    /// Speaker id attribute
    pub speaker_id: String,
    /// Speaker display name
    pub speaker_name: String,
    /// Position attribute (title/company), if present
    pub position: Option<String>,
    /// Statement body; never empty (placeholder-substituted)
    pub text: String,
}

/// One speaker turn from the Q&A section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaTurn {
    /// Speaker id attribute ("-1" marks the operator)
    pub speaker_id: String,
    /// Speaker display name
    pub speaker_name: String,
    /// Company attribute, if present
    pub company: Option<String>,
    /// Turn body; never empty (placeholder-substituted)
    pub text: String,
    /// Sentiment tags written by an earlier pass, if any
    pub sentiment: QaSentiment,
}

impl QaTurn {
    /// Operator turns are excluded from emotion annotation
    pub fn is_operator(&self) -> bool {
        self.speaker_id == OPERATOR_SPEAKER_ID
    }
}

/// Previously written sentiment tags on a Q&A turn; each may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaSentiment {
    pub label: Option<String>,
    pub positive: Option<f64>,
    pub negative: Option<f64>,
    pub neutral: Option<f64>,
}
