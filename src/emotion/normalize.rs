use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::{LANGUAGE, get};
use tracing::warn;

use crate::models::NEUTRAL_PLACEHOLDER;

/// Punctuation markers and contraction suffixes filtered alongside stop words
const EXTRA_STOP_WORDS: &[&str] = &[
    ",", ".", "--", "''", "``", "'s", "'d", "'ll", "'re", "'ve", "'m", "'t",
];

/// Acknowledgement surface forms kept out of the stop list; short
/// acknowledgement utterances must survive normalization intact
const KEEP_WORDS: &[&str] = &[
    "ye", "yes", "yeah", "right", "okay", "ok", "got", "thank", "thanks", "sure", "none",
];

/// Tokenizes, filters stop words, and stems statement text.
///
/// Construct once and reuse; the stemmer and stop-word set are owned.
pub struct TextNormalizer {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
}

impl TextNormalizer {
    pub fn new() -> Self {
        let mut stop_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        for word in EXTRA_STOP_WORDS {
            stop_words.insert((*word).to_string());
        }
        for word in KEEP_WORDS {
            stop_words.remove(*word);
        }

        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words,
        }
    }

    /// Reduce text to an ordered sequence of lowercase stems.
    ///
    /// Empty input falls back to the `"Neutral."` placeholder so callers
    /// never see an empty token sequence silently.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let source = if text.trim().is_empty() {
            warn!("empty statement text, substituting neutral placeholder");
            NEUTRAL_PLACEHOLDER
        } else {
            text
        };

        tokenize(source)
            .into_iter()
            .filter(|token| {
                !self.stop_words.contains(token) && token.chars().any(char::is_alphanumeric)
            })
            .map(|token| self.stemmer.stem(&token).into_owned())
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split lowercased text into word, contraction-suffix, and punctuation tokens
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut chars = lower.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
        } else if ch.is_alphanumeric() {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() {
                    word.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(word);
        } else if ch == '\'' {
            // contraction suffix stays attached to the apostrophe ("that's" -> "that", "'s")
            let mut suffix = String::from('\'');
            chars.next();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() {
                    suffix.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(suffix);
        } else {
            // a run of the same punctuation character is one token ("--")
            let mut run = String::new();
            run.push(ch);
            chars.next();
            while let Some(&c) = chars.peek() {
                if c == ch {
                    run.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(run);
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_splits_punctuation_and_contractions() {
        let tokens = tokenize("That's fine -- really.");
        assert_eq!(tokens, vec!["that", "'s", "fine", "--", "really", "."]);
    }

    #[test]
    fn test_normalize_filters_and_stems() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Revenue declined and margins worried investors.");
        assert_eq!(tokens, vec!["revenu", "declin", "margin", "worri", "investor"]);
    }

    #[test]
    fn test_normalize_keeps_acknowledgement_words() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize("Thanks, that's okay.");
        assert_eq!(tokens, vec!["thank", "okay"]);
    }

    #[test]
    fn test_normalize_empty_input_falls_back_to_placeholder() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("   "), vec!["neutral"]);
        assert_eq!(normalizer.normalize(""), vec!["neutral"]);
    }

    #[test]
    fn test_normalize_drops_pure_punctuation() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("?! ... ---"), Vec::<String>::new());
    }
}
