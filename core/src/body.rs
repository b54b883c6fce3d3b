use huddle_protocol::Delta;

/// A submitted body reduced to what the send path needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody {
    pub plain_text: String,
    /// `None` when the body was not a delta document.
    pub delta: Option<Delta>,
}

impl ParsedBody {
    pub fn has_text(&self) -> bool {
        !self.plain_text.trim().is_empty()
    }
}

/// Parse a serialized delta document. A body that does not parse is taken
/// as plain text; the failure is only logged.
pub fn parse_body(raw: &str) -> ParsedBody {
    match Delta::from_json(raw) {
        Ok(delta) => ParsedBody {
            plain_text: delta.plain_text(),
            delta: Some(delta),
        },
        Err(e) => {
            tracing::debug!("body is not a delta document, using it as plain text: {e}");
            ParsedBody {
                plain_text: raw.to_string(),
                delta: None,
            }
        }
    }
}
