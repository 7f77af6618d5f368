//! Dialogue window: the bounded recent slice of the transcript, and a
//! short digest of what the user has been talking about.

use hearth_core::dialogue::{DialogueTurn, TurnRole};

const ELLIPSIS: &str = "...";

/// The last `max_turns` turns, in original order.
pub fn trim(turns: &[DialogueTurn], max_turns: usize) -> Vec<DialogueTurn> {
    let start = turns.len().saturating_sub(max_turns);
    turns[start..].to_vec()
}

/// A bullet digest of recent user turns.
///
/// Built from user-authored turns only, or from all turns when the user
/// has said nothing in the window. Takes the last `max_lines` of them,
/// flattens newlines, and cuts each to `max_chars_per_line` characters
/// (ellipsis included).
pub fn summarize_recent_user_turns(
    turns: &[DialogueTurn],
    max_lines: usize,
    max_chars_per_line: usize,
) -> Vec<String> {
    if max_lines == 0 {
        return Vec::new();
    }

    let user_turns: Vec<&DialogueTurn> = turns.iter().filter(|t| t.role == TurnRole::User).collect();
    let source: Vec<&DialogueTurn> = if user_turns.is_empty() {
        turns.iter().collect()
    } else {
        user_turns
    };

    let start = source.len().saturating_sub(max_lines);
    source[start..]
        .iter()
        .filter(|t| !t.content.trim().is_empty())
        .map(|t| {
            let flat = t.content.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("- {}: {}", t.role, truncate_chars(&flat, max_chars_per_line))
        })
        .collect()
}

/// Render turns as `role: content`, one per line.
pub fn transcript_lines(turns: &[DialogueTurn]) -> Vec<String> {
    turns
        .iter()
        .map(|t| format!("{}: {}", t.role, t.content))
        .collect()
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an
/// ellipsis when there is room for one.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let ellipsis_len = ELLIPSIS.chars().count();
    if max_chars <= ellipsis_len {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ellipsis_len).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<DialogueTurn> {
        vec![
            DialogueTurn::user("first"),
            DialogueTurn::assistant("reply one"),
            DialogueTurn::user("second"),
            DialogueTurn::assistant("reply two"),
            DialogueTurn::user("third"),
        ]
    }

    #[test]
    fn trim_zero_is_empty() {
        assert!(trim(&history(), 0).is_empty());
    }

    #[test]
    fn trim_larger_than_history_returns_all_in_order() {
        let turns = history();
        let trimmed = trim(&turns, 1000);
        assert_eq!(trimmed, turns);
    }

    #[test]
    fn trim_keeps_suffix() {
        let trimmed = trim(&history(), 2);
        let contents: Vec<_> = trimmed.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["reply two", "third"]);
    }

    #[test]
    fn digest_uses_user_turns_only() {
        let digest = summarize_recent_user_turns(&history(), 2, 80);
        assert_eq!(digest, vec!["- user: second", "- user: third"]);
    }

    #[test]
    fn digest_falls_back_to_all_turns() {
        let turns = vec![DialogueTurn::assistant("welcome back"), DialogueTurn::assistant("how was it")];
        let digest = summarize_recent_user_turns(&turns, 8, 80);
        assert_eq!(digest, vec!["- assistant: welcome back", "- assistant: how was it"]);
    }

    #[test]
    fn digest_truncates_with_ellipsis() {
        let turns = vec![DialogueTurn::user("a very long line\nthat spans two lines")];
        let digest = summarize_recent_user_turns(&turns, 8, 10);
        assert_eq!(digest, vec!["- user: a very ..."]);
    }

    #[test]
    fn digest_of_empty_history_is_empty() {
        assert!(summarize_recent_user_turns(&[], 8, 80).is_empty());
        assert!(summarize_recent_user_turns(&history(), 0, 80).is_empty());
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("좋아하는 카페는", 5), "좋아...");
        assert_eq!(truncate_chars("short", 80), "short");
        assert_eq!(truncate_chars("abcdef", 2), "ab");
    }

    #[test]
    fn transcript_lines_label_roles() {
        let lines = transcript_lines(&history()[..2]);
        assert_eq!(lines, vec!["user: first", "assistant: reply one"]);
    }
}
