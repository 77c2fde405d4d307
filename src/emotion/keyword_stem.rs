use super::ACKNOWLEDGEMENT;
use super::tables::KeywordTable;

/// Stems that mark a short utterance as an acknowledgement. The Snowball
/// stemmer leaves "yes" intact, so it is listed alongside the classic
/// Porter stem "ye".
pub const ACK_WORDS: &[&str] = &["ye", "yes", "right", "okay", "got", "thank", "sure", "none"];

/// Match normalized tokens against the configured keyword stems.
///
/// A short utterance (fewer than 5 tokens) containing an acknowledgement
/// word returns `Acknowledgement` immediately, overriding all other rules.
/// Otherwise each emotion is recorded at most once, on its first matching
/// stem, in table insertion order.
pub fn classify_by_keyword(tokens: &[String], table: &KeywordTable) -> Vec<String> {
    if tokens.len() < 5
        && tokens
            .iter()
            .any(|token| ACK_WORDS.contains(&token.as_str()))
    {
        return vec![ACKNOWLEDGEMENT.to_string()];
    }

    let mut emotions = Vec::new();
    for (emotion, stems) in &table.entries {
        if stems.iter().any(|stem| stem_matches(stem, tokens)) {
            emotions.push(emotion.clone());
        }
    }
    emotions
}

/// A stem matches as an exact token or as either half of an adjacent pair
fn stem_matches(stem: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|token| token == stem)
        || tokens
            .windows(2)
            .any(|pair| pair[0] == stem || pair[1] == stem)
}
