use std::sync::LazyLock;

use regex_lite::Regex;

#[allow(clippy::expect_used)]
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));

/// Every `@word` in `text`, without the `@`, first occurrence first.
///
/// This scans the final text rather than tracking which names were picked
/// from the suggestion list, so freely typed mentions count too.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions: Vec<String> = Vec::new();
    for caps in MENTION_REGEX.captures_iter(text) {
        if let Some(name) = caps.get(1) {
            let name = name.as_str();
            if !mentions.iter().any(|m| m == name) {
                mentions.push(name.to_string());
            }
        }
    }
    mentions
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_each_name_once_in_order() {
        assert_eq!(
            extract_mentions("@bob hi @alice, ping @bob again"),
            vec!["bob", "alice"]
        );
    }

    #[test]
    fn bare_trigger_and_email_like_text() {
        assert_eq!(extract_mentions("just @ nothing"), Vec::<String>::new());
        // Mid-word triggers still count as the token that follows them.
        assert_eq!(extract_mentions("mail me@host"), vec!["host"]);
    }

    #[test]
    fn punctuation_ends_a_name() {
        assert_eq!(extract_mentions("thanks @carol!"), vec!["carol"]);
        assert_eq!(extract_mentions("@dave_2-ok"), vec!["dave_2"]);
    }
}
