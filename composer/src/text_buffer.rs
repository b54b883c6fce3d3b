//! The editable message body.
//!
//! Text is held as runs that share formatting attributes. All offsets
//! (cursor, ranges) count `char`s, not bytes.

use std::ops::Range;

use huddle_protocol::Delta;
use huddle_protocol::DeltaInsert;
use huddle_protocol::DeltaOp;
use huddle_protocol::delta::Attributes;

#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    attributes: Option<Attributes>,
}

impl Run {
    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBuffer {
    runs: Vec<Run>,
    cursor: usize,
    /// Bumped once per mutation, however many characters it touched.
    revision: u64,
}

fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from a delta document. Embeds have no textual form in
    /// the editor and are dropped. The cursor is placed at the end.
    pub fn from_delta(delta: &Delta) -> Self {
        let mut buffer = Self::default();
        for op in &delta.ops {
            if let DeltaInsert::Text(text) = &op.insert {
                buffer.runs.push(Run {
                    text: text.clone(),
                    attributes: op.attributes.clone().filter(|a| !a.is_empty()),
                });
            }
        }
        buffer.normalize();
        buffer.cursor = buffer.len();
        buffer
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        let (run, offset) = self.locate(index)?;
        self.runs[run].text.chars().nth(offset)
    }

    /// Move the cursor, clamped to the buffer.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.len());
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.set_cursor(self.cursor + 1);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Insert at the cursor, inheriting the formatting of the text the
    /// cursor follows.
    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = self.cursor;
        self.splice(at..at, text);
        self.cursor = at + text.chars().count();
        self.revision += 1;
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    pub fn delete_backward(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.cursor - 1;
        self.splice(at..at + 1, "");
        self.cursor = at;
        self.revision += 1;
    }

    pub fn delete_forward(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.cursor;
        self.splice(at..at + 1, "");
        self.revision += 1;
    }

    /// Replace `range` with `text` and move the cursor to `cursor_after` as
    /// one mutation: there is no observable state in which the range is
    /// deleted but `text` is not yet inserted.
    ///
    /// `range` must lie within the buffer; `cursor_after` is clamped.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str, cursor_after: usize) {
        let len = self.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.splice(start..end, text);
        self.set_cursor(cursor_after);
        self.revision += 1;
    }

    /// Empty the buffer, e.g. after the message was sent.
    pub fn reset(&mut self) {
        self.runs.clear();
        self.cursor = 0;
        self.revision += 1;
    }

    pub fn to_delta(&self) -> Delta {
        Delta {
            ops: self
                .runs
                .iter()
                .map(|run| match &run.attributes {
                    Some(attributes) => DeltaOp::formatted(run.text.clone(), attributes.clone()),
                    None => DeltaOp::text(run.text.clone()),
                })
                .collect(),
        }
    }

    /// Run index and char offset within that run for the char at `index`.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut start = 0;
        for (i, run) in self.runs.iter().enumerate() {
            let len = run.len();
            if index < start + len {
                return Some((i, index - start));
            }
            start += len;
        }
        None
    }

    /// Split runs so that one starts exactly at `index`; returns its position
    /// (or `runs.len()` when `index` is the end of the buffer).
    fn split_at(&mut self, index: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            if index == start {
                return i;
            }
            let len = self.runs[i].len();
            if index < start + len {
                let at = byte_index(&self.runs[i].text, index - start);
                let tail = self.runs[i].text.split_off(at);
                let attributes = self.runs[i].attributes.clone();
                self.runs.insert(
                    i + 1,
                    Run {
                        text: tail,
                        attributes,
                    },
                );
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Raw edit without touching the cursor or revision. Inserted text takes
    /// the formatting of the character before `range.start`.
    fn splice(&mut self, range: Range<usize>, text: &str) {
        let inherit_from = range.start.saturating_sub(1);
        let attributes = self
            .locate(inherit_from)
            .and_then(|(run, _)| self.runs[run].attributes.clone());

        let first = self.split_at(range.start);
        let last = self.split_at(range.end);
        let replacement = (!text.is_empty()).then(|| Run {
            text: text.to_string(),
            attributes,
        });
        self.runs.splice(first..last, replacement);
        self.normalize();
    }

    /// Drop empty runs and merge neighbours with equal formatting.
    fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.attributes == run.attributes => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bold() -> Attributes {
        let mut a = Attributes::new();
        a.insert("bold".to_string(), json!(true));
        a
    }

    #[test]
    fn typing_moves_the_cursor_and_bumps_revision() {
        let mut buffer = TextBuffer::new();
        buffer.insert_str("héllo");
        buffer.insert_char('!');
        assert_eq!(buffer.text(), "héllo!");
        assert_eq!(buffer.cursor(), 6);
        assert_eq!(buffer.revision(), 2);

        buffer.move_left();
        buffer.delete_backward();
        assert_eq!(buffer.text(), "héll!");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut buffer = TextBuffer::new();
        buffer.insert_str("hello world");
        buffer.set_cursor(5);
        buffer.insert_str(",");
        assert_eq!(buffer.text(), "hello, world");
        assert_eq!(buffer.cursor(), 6);
    }

    #[test]
    fn replace_range_is_a_single_revision() {
        let mut buffer = TextBuffer::new();
        buffer.insert_str("hello @al");
        let before = buffer.revision();
        buffer.replace_range(6..9, "@alice ", 13);
        assert_eq!(buffer.text(), "hello @alice ");
        assert_eq!(buffer.cursor(), 13);
        assert_eq!(buffer.revision(), before + 1);
    }

    #[test]
    fn replace_range_keeps_text_after_the_range() {
        let mut buffer = TextBuffer::new();
        buffer.insert_str("hello @al bob");
        buffer.replace_range(6..9, "@alice ", 13);
        assert_eq!(buffer.text(), "hello @alice  bob");
    }

    #[test]
    fn formatting_survives_edits_and_round_trips_through_delta() {
        let delta = Delta {
            ops: vec![DeltaOp::text("hi "), DeltaOp::formatted("bob", bold())],
        };
        let mut buffer = TextBuffer::from_delta(&delta);
        assert_eq!(buffer.cursor(), 6);

        // Typing at the end continues the bold run.
        buffer.insert_str("by");
        // Typing after "hi " continues the plain run.
        buffer.set_cursor(3);
        buffer.insert_str("to ");

        assert_eq!(
            buffer.to_delta(),
            Delta {
                ops: vec![DeltaOp::text("hi to "), DeltaOp::formatted("bobby", bold())],
            }
        );
    }

    #[test]
    fn deleting_across_runs_merges_equal_neighbours() {
        let delta = Delta {
            ops: vec![
                DeltaOp::text("ab"),
                DeltaOp::formatted("X", bold()),
                DeltaOp::text("cd"),
            ],
        };
        let mut buffer = TextBuffer::from_delta(&delta);
        buffer.set_cursor(3);
        buffer.delete_backward();
        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.to_delta().ops, vec![DeltaOp::text("abcd")]);
    }

    #[test]
    fn reset_empties_the_buffer() {
        let mut buffer = TextBuffer::new();
        buffer.insert_str("draft");
        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.to_delta(), Delta::default());
    }
}
