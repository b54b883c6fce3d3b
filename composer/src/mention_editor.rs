use thiserror::Error;

use crate::mention_detector::MENTION_TRIGGER;
use crate::text_buffer::TextBuffer;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    #[error("no mention trigger at offset {0}")]
    NoTrigger(usize),

    #[error("cursor {cursor} is before the trigger at {trigger_start}")]
    CursorBeforeTrigger { trigger_start: usize, cursor: usize },
}

/// Replace `trigger_start..cursor` (the `@` plus the typed search term)
/// with `@{user_name} ` in a single buffer mutation and put the cursor
/// right after the trailing space. Returns the new cursor.
///
/// `user_name` is inserted verbatim; it is never re-scanned.
pub fn insert_mention(
    buffer: &mut TextBuffer,
    trigger_start: usize,
    cursor: usize,
    user_name: &str,
) -> Result<usize, SpliceError> {
    if cursor <= trigger_start {
        return Err(SpliceError::CursorBeforeTrigger {
            trigger_start,
            cursor,
        });
    }
    if buffer.char_at(trigger_start) != Some(MENTION_TRIGGER) {
        return Err(SpliceError::NoTrigger(trigger_start));
    }

    let token = format!("{MENTION_TRIGGER}{user_name} ");
    let new_cursor = trigger_start + token.chars().count();
    buffer.replace_range(trigger_start..cursor, &token, new_cursor);
    tracing::debug!(trigger_start, user_name, "mention inserted");
    Ok(new_cursor)
}
