pub mod keyword_stem;
pub mod normalize;
pub mod score_range;
pub mod tables;

pub use keyword_stem::{ACK_WORDS, classify_by_keyword};
pub use normalize::TextNormalizer;
pub use score_range::classify_by_score;
pub use tables::{EmotionTables, KeywordTable, ScoreRangeTable, ScoreRanges, TableError};

use crate::models::QaTurn;

/// Sentinel for a classifier that found no applicable emotion
pub const UNCLASSIFIED: &str = "Unclassified";
/// Label for short acknowledgement utterances
pub const ACKNOWLEDGEMENT: &str = "Acknowledgement";
/// Final label when neither classifier fired
pub const NEUTRAL: &str = "Neutral";

/// Render a classifier result: matched emotions joined with ", ", or the
/// `Unclassified` sentinel when nothing matched
pub fn render_label(emotions: &[String]) -> String {
    if emotions.is_empty() {
        UNCLASSIFIED.to_string()
    } else {
        emotions.join(", ")
    }
}

/// Combine the two classifier outputs into the final label.
///
/// Precedence, in order: both unclassified -> `Neutral`; keyword
/// acknowledgement always wins, even over a score match; then a score match;
/// then the keyword match. The acknowledgement override is deliberate and
/// must not be reordered.
pub fn merge_labels(by_score: &str, by_keyword: &str) -> String {
    if by_score == UNCLASSIFIED && by_keyword == UNCLASSIFIED {
        NEUTRAL.to_string()
    } else if by_keyword == ACKNOWLEDGEMENT {
        ACKNOWLEDGEMENT.to_string()
    } else if by_score != UNCLASSIFIED {
        by_score.to_string()
    } else {
        by_keyword.to_string()
    }
}

/// Both classifier outputs and their merged result for one turn
#[derive(Debug, Clone)]
pub struct TurnEmotion {
    pub by_score: String,
    pub by_keyword: String,
    pub combined: String,
}

/// The emotion rule engine: score-range bucketing plus keyword-stem
/// matching over normalized text, merged per turn.
///
/// Owns its normalizer and tables; construct once per pass.
pub struct EmotionEngine {
    normalizer: TextNormalizer,
    tables: EmotionTables,
}

impl EmotionEngine {
    pub fn new(tables: EmotionTables) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            tables,
        }
    }

    pub fn classify_turn(&self, turn: &QaTurn) -> TurnEmotion {
        let by_score = render_label(&classify_by_score(
            turn.sentiment.positive,
            turn.sentiment.negative,
            turn.sentiment.neutral,
            &self.tables.score_ranges,
        ));

        let tokens = self.normalizer.normalize(&turn.text);
        let by_keyword = render_label(&classify_by_keyword(&tokens, &self.tables.keywords));

        let combined = merge_labels(&by_score, &by_keyword);

        TurnEmotion {
            by_score,
            by_keyword,
            combined,
        }
    }
}

impl Default for EmotionEngine {
    fn default() -> Self {
        Self::new(EmotionTables::default())
    }
}
