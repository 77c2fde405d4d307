use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Malformed emotion table configuration
#[derive(Debug, Error)]
pub enum TableError {
    #[error("emotion '{emotion}': {dimension} range [{lo}, {hi}] is out of order")]
    RangeOutOfOrder {
        emotion: String,
        dimension: &'static str,
        lo: f64,
        hi: f64,
    },
    #[error("emotion '{emotion}': {dimension} range [{lo}, {hi}] is outside [0, 1]")]
    RangeOutOfBounds {
        emotion: String,
        dimension: &'static str,
        lo: f64,
        hi: f64,
    },
    #[error("emotion '{emotion}' has no keyword stems")]
    EmptyKeywords { emotion: String },
    #[error("score range table has no emotions")]
    EmptyScoreTable,
    #[error("keyword table has no emotions")]
    EmptyKeywordTable,
}

/// Closed intervals, one per score dimension; an emotion applies iff all
/// three scores fall inside
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRanges {
    #[serde(rename = "PositiveScoreRange")]
    pub positive: [f64; 2],
    #[serde(rename = "NegativeScoreRange")]
    pub negative: [f64; 2],
    #[serde(rename = "NeutralScoreRange")]
    pub neutral: [f64; 2],
}

impl ScoreRanges {
    pub fn matches(&self, pos: f64, neg: f64, neutral: f64) -> bool {
        in_range(self.positive, pos) && in_range(self.negative, neg) && in_range(self.neutral, neutral)
    }
}

fn in_range(range: [f64; 2], value: f64) -> bool {
    range[0] <= value && value <= range[1]
}

/// Emotion name -> score ranges, in configuration insertion order
#[derive(Debug, Clone, Default)]
pub struct ScoreRangeTable {
    pub entries: Vec<(String, ScoreRanges)>,
}

impl ScoreRangeTable {
    pub fn validate(&self) -> Result<(), TableError> {
        if self.entries.is_empty() {
            return Err(TableError::EmptyScoreTable);
        }
        for (emotion, ranges) in &self.entries {
            for (dimension, range) in [
                ("positive", ranges.positive),
                ("negative", ranges.negative),
                ("neutral", ranges.neutral),
            ] {
                let [lo, hi] = range;
                if lo > hi {
                    return Err(TableError::RangeOutOfOrder {
                        emotion: emotion.clone(),
                        dimension,
                        lo,
                        hi,
                    });
                }
                if lo < 0.0 || hi > 1.0 {
                    return Err(TableError::RangeOutOfBounds {
                        emotion: emotion.clone(),
                        dimension,
                        lo,
                        hi,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for ScoreRangeTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ScoreRangeTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of emotion name to score ranges")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((emotion, ranges)) = map.next_entry::<String, ScoreRanges>()? {
                    entries.push((emotion, ranges));
                }
                Ok(ScoreRangeTable { entries })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Emotion name -> keyword stems, in configuration insertion order
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    pub entries: Vec<(String, Vec<String>)>,
}

impl KeywordTable {
    pub fn validate(&self) -> Result<(), TableError> {
        if self.entries.is_empty() {
            return Err(TableError::EmptyKeywordTable);
        }
        for (emotion, stems) in &self.entries {
            if stems.is_empty() {
                return Err(TableError::EmptyKeywords {
                    emotion: emotion.clone(),
                });
            }
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for KeywordTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = KeywordTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of emotion name to keyword stem list")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((emotion, stems)) = map.next_entry::<String, Vec<String>>()? {
                    entries.push((emotion, stems));
                }
                Ok(KeywordTable { entries })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The two static tables the emotion pass is configured with
#[derive(Debug, Clone)]
pub struct EmotionTables {
    pub score_ranges: ScoreRangeTable,
    pub keywords: KeywordTable,
}

impl EmotionTables {
    /// Load the tables from JSON files, falling back to the built-in
    /// defaults where no path is given; malformed input fails fast
    pub fn load(score_ranges_path: Option<&Path>, keywords_path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let score_ranges = match score_ranges_path {
            Some(path) => load_score_ranges(path)?,
            None => defaults.score_ranges,
        };
        let keywords = match keywords_path {
            Some(path) => load_keywords(path)?,
            None => defaults.keywords,
        };
        Ok(Self {
            score_ranges,
            keywords,
        })
    }
}

pub fn load_score_ranges(path: &Path) -> Result<ScoreRangeTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read score range table {:?}", path))?;
    let table: ScoreRangeTable = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse score range table {:?}", path))?;
    table.validate()?;
    Ok(table)
}

pub fn load_keywords(path: &Path) -> Result<KeywordTable> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keyword table {:?}", path))?;
    let table: KeywordTable = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse keyword table {:?}", path))?;
    table.validate()?;
    Ok(table)
}

impl Default for EmotionTables {
    fn default() -> Self {
        let score_ranges = ScoreRangeTable {
            entries: vec![
                range_entry("Confidence", [0.6, 1.0], [0.0, 0.2], [0.0, 0.4]),
                range_entry("Excitement", [0.75, 1.0], [0.0, 0.15], [0.0, 0.25]),
                range_entry("Optimism", [0.4, 0.6], [0.0, 0.25], [0.15, 0.6]),
                range_entry("Positive Surprise", [0.55, 1.0], [0.0, 0.1], [0.1, 0.45]),
                range_entry("Frustration", [0.0, 0.15], [0.7, 1.0], [0.0, 0.3]),
                range_entry("Concern", [0.0, 0.3], [0.4, 0.7], [0.0, 0.6]),
                range_entry("Doubtful", [0.0, 0.2], [0.3, 0.6], [0.3, 0.7]),
                range_entry("Negative Surprise", [0.0, 0.1], [0.55, 1.0], [0.1, 0.45]),
            ],
        };

        let keywords = KeywordTable {
            entries: vec![
                keyword_entry("Confidence", &["confid", "strong", "robust", "solid"]),
                keyword_entry("Excitement", &["excit", "thrill", "terrific"]),
                keyword_entry("Optimism", &["optimist", "improv", "grow", "momentum"]),
                keyword_entry("Positive Surprise", &["beat", "exceed", "outperform", "upsid"]),
                keyword_entry("Frustration", &["frustrat", "disappoint", "setback"]),
                keyword_entry("Concern", &["concern", "worri", "risk", "headwind", "pressur"]),
                keyword_entry("Doubtful", &["doubt", "uncertain", "unsur", "hesit"]),
                keyword_entry("Negative Surprise", &["miss", "unexpect", "shortfal"]),
                keyword_entry("Confusion", &["confus", "unclear", "puzzl"]),
                keyword_entry("Curiosity", &["curious", "wonder", "interest"]),
                keyword_entry("Skepticism", &["skeptic", "question"]),
            ],
        };

        Self {
            score_ranges,
            keywords,
        }
    }
}

fn range_entry(
    emotion: &str,
    positive: [f64; 2],
    negative: [f64; 2],
    neutral: [f64; 2],
) -> (String, ScoreRanges) {
    (
        emotion.to_string(),
        ScoreRanges {
            positive,
            negative,
            neutral,
        },
    )
}

fn keyword_entry(emotion: &str, stems: &[&str]) -> (String, Vec<String>) {
    (
        emotion.to_string(),
        stems.iter().map(|s| (*s).to_string()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_range_table_preserves_insertion_order() {
        let json = r#"{
            "Zeal": {
                "PositiveScoreRange": [0.5, 1.0],
                "NegativeScoreRange": [0.0, 0.5],
                "NeutralScoreRange": [0.0, 0.5]
            },
            "Apathy": {
                "PositiveScoreRange": [0.0, 0.5],
                "NegativeScoreRange": [0.0, 0.5],
                "NeutralScoreRange": [0.5, 1.0]
            }
        }"#;

        let table: ScoreRangeTable = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = table.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Zeal", "Apathy"]);
        table.validate().unwrap();
    }

    #[test]
    fn test_score_range_validation_rejects_out_of_order_bounds() {
        let table = ScoreRangeTable {
            entries: vec![range_entry("Bad", [0.8, 0.2], [0.0, 1.0], [0.0, 1.0])],
        };
        assert!(matches!(
            table.validate(),
            Err(TableError::RangeOutOfOrder { .. })
        ));
    }

    #[test]
    fn test_score_range_validation_rejects_out_of_bounds() {
        let table = ScoreRangeTable {
            entries: vec![range_entry("Bad", [0.0, 1.5], [0.0, 1.0], [0.0, 1.0])],
        };
        assert!(matches!(
            table.validate(),
            Err(TableError::RangeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_keyword_table_rejects_empty_stem_list() {
        let table = KeywordTable {
            entries: vec![("Empty".to_string(), vec![])],
        };
        assert!(matches!(
            table.validate(),
            Err(TableError::EmptyKeywords { .. })
        ));
    }

    #[test]
    fn test_empty_tables_rejected() {
        assert!(matches!(
            ScoreRangeTable::default().validate(),
            Err(TableError::EmptyScoreTable)
        ));
        assert!(matches!(
            KeywordTable::default().validate(),
            Err(TableError::EmptyKeywordTable)
        ));
    }

    #[test]
    fn test_defaults_validate() {
        let tables = EmotionTables::default();
        tables.score_ranges.validate().unwrap();
        tables.keywords.validate().unwrap();
    }

    #[test]
    fn test_load_overrides_only_the_given_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"{"Concern": ["worri"]}"#).unwrap();

        let tables = EmotionTables::load(None, Some(&path)).unwrap();
        assert_eq!(tables.keywords.entries.len(), 1);
        assert_eq!(tables.keywords.entries[0].0, "Concern");
        // score ranges fall back to the defaults
        assert_eq!(
            tables.score_ranges.entries.len(),
            EmotionTables::default().score_ranges.entries.len()
        );

        // malformed override fails fast
        std::fs::write(&path, r#"{"Empty": []}"#).unwrap();
        assert!(EmotionTables::load(None, Some(&path)).is_err());
    }

    #[test]
    fn test_shipped_glossary_matches_defaults() {
        let score_json = include_str!("../../glossary/emotion_score_ranges.json");
        let keyword_json = include_str!("../../glossary/emotion_keywords_stemmed.json");

        let score_table: ScoreRangeTable = serde_json::from_str(score_json).unwrap();
        let keyword_table: KeywordTable = serde_json::from_str(keyword_json).unwrap();
        score_table.validate().unwrap();
        keyword_table.validate().unwrap();

        let defaults = EmotionTables::default();
        assert_eq!(score_table.entries.len(), defaults.score_ranges.entries.len());
        assert_eq!(keyword_table.entries.len(), defaults.keywords.entries.len());
    }
}
