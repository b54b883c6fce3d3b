/// Character that starts a mention.
pub const MENTION_TRIGGER: char = '@';

/// An `@token` the cursor is currently inside of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCandidate {
    /// Char offset of the `@`.
    pub trigger_start: usize,
    /// Text between the `@` and the cursor. May be empty.
    pub search_term: String,
}

/// Find the mention being typed at `cursor` (a char offset into `text`).
///
/// Walks backwards from the cursor until it finds `@`, a space, a newline or
/// the start of the text; only the first of these yields a candidate. The
/// result depends on nothing but the arguments, so it must be recomputed on
/// every edit with the current cursor.
pub fn detect(text: &str, cursor: usize) -> Option<MentionCandidate> {
    let before: Vec<char> = text.chars().take(cursor).collect();
    let trigger_start = before
        .iter()
        .rposition(|&c| c == MENTION_TRIGGER || c == ' ' || c == '\n')?;
    if before[trigger_start] != MENTION_TRIGGER {
        return None;
    }
    let search_term: String = before[trigger_start + 1..].iter().collect();
    if search_term.contains([' ', '\n']) {
        return None;
    }
    Some(MentionCandidate {
        trigger_start,
        search_term,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(trigger_start: usize, search_term: &str) -> Option<MentionCandidate> {
        Some(MentionCandidate {
            trigger_start,
            search_term: search_term.to_string(),
        })
    }

    #[test]
    fn test_detect() {
        let test_cases = vec![
            ("hello @al", 9, candidate(6, "al"), "cursor at end of token"),
            ("hello @al bob", 9, candidate(6, "al"), "cursor before the space"),
            ("hello @al bob", 13, None, "space between trigger and cursor"),
            ("hello @al bob", 8, candidate(6, "a"), "cursor inside the token"),
            ("@", 1, candidate(0, ""), "bare trigger"),
            ("hi @", 4, candidate(3, ""), "bare trigger after text"),
            ("@bob", 0, None, "cursor before the trigger"),
            ("hello", 5, None, "no trigger"),
            ("", 0, None, "empty text"),
            ("line\n@bo", 8, candidate(5, "bo"), "trigger after newline"),
            ("@bo\nx", 5, None, "newline between trigger and cursor"),
            ("a@b@c", 5, candidate(3, "c"), "nearest trigger wins"),
            ("mail me@host", 12, candidate(7, "host"), "trigger mid-word"),
            ("héllo @zoë", 10, candidate(6, "zoë"), "offsets count chars"),
            ("hi @al", 99, candidate(3, "al"), "cursor past the end is clamped"),
        ];

        for (text, cursor, expected, description) in test_cases {
            assert_eq!(detect(text, cursor), expected, "Failed for case: {description}");
        }
    }

    #[test]
    fn detection_is_idempotent() {
        let text = "ping @car and @da";
        for cursor in 0..=text.chars().count() {
            assert_eq!(detect(text, cursor), detect(text, cursor));
        }
    }

    #[test]
    fn search_term_is_exactly_the_text_between_trigger_and_cursor() {
        let text = "x @abc def @g";
        let chars: Vec<char> = text.chars().collect();
        for cursor in 0..=chars.len() {
            if let Some(c) = detect(text, cursor) {
                let between: String = chars[c.trigger_start + 1..cursor].iter().collect();
                assert_eq!(c.search_term, between);
                assert_eq!(chars[c.trigger_start], MENTION_TRIGGER);
            }
        }
    }
}
