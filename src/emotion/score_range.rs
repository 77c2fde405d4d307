use super::tables::ScoreRangeTable;

/// Match a score triple against every configured emotion range.
///
/// Any missing score means no ranges are evaluated and the empty result
/// renders as `"Unclassified"`. Matching is inclusive on both bounds and
/// non-exclusive across emotions; iteration follows table insertion order.
/// Out-of-range scores simply fail to match, never error.
pub fn classify_by_score(
    positive: Option<f64>,
    negative: Option<f64>,
    neutral: Option<f64>,
    table: &ScoreRangeTable,
) -> Vec<String> {
    let (Some(pos), Some(neg), Some(neutr)) = (positive, negative, neutral) else {
        return Vec::new();
    };

    table
        .entries
        .iter()
        .filter(|(_, ranges)| ranges.matches(pos, neg, neutr))
        .map(|(emotion, _)| emotion.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::render_label;
    use crate::emotion::tables::ScoreRanges;

    fn table() -> ScoreRangeTable {
        ScoreRangeTable {
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
                    "Concern".to_string(),
                    ScoreRanges {
                        positive: [0.0, 0.3],
                        negative: [0.4, 1.0],
                        neutral: [0.0, 0.6],
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_matching_triple_returns_emotion() {
        let emotions = classify_by_score(Some(0.7), Some(0.1), Some(0.2), &table());
        assert_eq!(emotions, vec!["Confidence"]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let emotions = classify_by_score(Some(0.5), Some(0.2), Some(0.5), &table());
        assert_eq!(emotions, vec!["Confidence"]);
    }

    #[test]
    fn test_missing_score_renders_unclassified() {
        let emotions = classify_by_score(None, Some(0.1), Some(0.2), &table());
        assert_eq!(render_label(&emotions), "Unclassified");

        let emotions = classify_by_score(Some(0.7), None, Some(0.2), &table());
        assert_eq!(render_label(&emotions), "Unclassified");

        let emotions = classify_by_score(Some(0.7), Some(0.1), None, &table());
        assert_eq!(render_label(&emotions), "Unclassified");
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let emotions = classify_by_score(Some(0.4), Some(0.3), Some(0.3), &table());
        assert!(emotions.is_empty());

        // out-of-range scores are simply non-matching
        let emotions = classify_by_score(Some(7.0), Some(-1.0), Some(0.0), &table());
        assert!(emotions.is_empty());
    }

    #[test]
    fn test_overlapping_ranges_return_union_in_order() {
        let mut overlapping = table();
        overlapping.entries.push((
            "Optimism".to_string(),
            ScoreRanges {
                positive: [0.6, 0.8],
                negative: [0.0, 0.2],
                neutral: [0.0, 0.5],
            },
        ));
        let emotions = classify_by_score(Some(0.7), Some(0.1), Some(0.2), &overlapping);
        assert_eq!(emotions, vec!["Confidence", "Optimism"]);
    }
}
