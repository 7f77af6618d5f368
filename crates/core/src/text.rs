//! Word tokenizer shared by the relevance scorers and lexical similarity.
//!
//! Lowercases, splits on anything that is not a letter, digit, or
//! underscore (Hangul syllables count as letters), and drops tokens
//! shorter than two characters.

use std::collections::BTreeSet;

/// Minimum token length in characters.
pub const MIN_TOKEN_CHARS: usize = 2;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize text into a set of lowercase words.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Tokenize several fragments into one set.
pub fn tokenize_all<'a, I>(parts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens = BTreeSet::new();
    for part in parts {
        tokens.extend(tokenize(part));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        let tokens = tokenize("Rust, rust! RUST-lang");
        assert!(tokens.contains("rust"));
        assert!(tokens.contains("lang"));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn keeps_hangul_words() {
        let tokens = tokenize("좋아하는 카페는 시청 근처");
        assert!(tokens.contains("카페는"));
        assert!(tokens.contains("시청"));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn drops_single_character_tokens() {
        let tokens = tokenize("a b 내 cd");
        assert_eq!(tokens.into_iter().collect::<Vec<_>>(), vec!["cd".to_string()]);
    }

    #[test]
    fn underscore_is_a_word_char() {
        assert!(tokenize("burned_room").contains("burned_room"));
    }

    #[test]
    fn empty_text_is_empty_set() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ... ").is_empty());
    }

    #[test]
    fn tokenize_all_merges_parts() {
        let tokens = tokenize_all(["coffee shop", "cafe"]);
        assert_eq!(tokens.len(), 3);
    }
}
