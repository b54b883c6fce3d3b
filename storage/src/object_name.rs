use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Object names may only contain `[A-Za-z0-9._-]`; anything else from the
/// user's file name is replaced with `_`.
pub fn sanitize_object_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
            sanitized.push(c);
        } else {
            sanitized.push('_');
        }
    }

    if sanitized.is_empty() {
        "_".to_string()
    } else {
        sanitized
    }
}

/// `{unix_millis}-{sanitized}` so repeated uploads of one file never collide.
pub fn canonical_object_name(name: &str, unix_millis: u128) -> String {
    format!("{unix_millis}-{}", sanitize_object_name(name))
}

pub(crate) fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitizes_spaces_and_unicode() {
        assert_eq!(sanitize_object_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_object_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_object_name(""), "_");
    }

    #[test]
    fn canonical_name_is_prefixed_with_timestamp() {
        assert_eq!(
            canonical_object_name("report final.pdf", 1_700_000_000_000),
            "1700000000000-report_final.pdf"
        );
    }
}
