//! Where characters of the composer text land on a wrapped, monospaced
//! grid. Rendering and caret lookup share [`wrap_lines`] /
//! [`grid_position`] so the popup anchor and the drawn text always agree.

use huddle_composer::Anchor;
use huddle_composer::CaretLocator;
use unicode_width::UnicodeWidthChar;

/// Locates characters of the composer text inside a text area of `width`
/// columns whose top-left cell is (`origin_x`, `origin_y`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GridLocator {
    pub width: u16,
    pub origin_x: u16,
    pub origin_y: u16,
}

impl CaretLocator for GridLocator {
    fn locate(&self, text: &str, char_index: usize) -> Option<Anchor> {
        let (row, col) = grid_position(text, char_index, self.width)?;
        Some(Anchor {
            top: self.origin_y.saturating_add(row),
            left: self.origin_x.saturating_add(col),
        })
    }
}

fn char_width(ch: char) -> u16 {
    if ch == '\n' {
        0
    } else {
        ch.width().unwrap_or(0) as u16
    }
}

/// (row, column) of the char at `char_index`, or of the end of the text when
/// `char_index` equals its length. Lines break on `\n` and whenever the next
/// character would not fit.
pub(crate) fn grid_position(text: &str, char_index: usize, width: u16) -> Option<(u16, u16)> {
    let width = width.max(1);
    let (mut row, mut col) = (0u16, 0u16);
    let mut count = 0;
    for (i, ch) in text.chars().enumerate() {
        let w = char_width(ch);
        if ch != '\n' && col > 0 && col + w > width {
            row += 1;
            col = 0;
        }
        if i == char_index {
            return Some((row, col));
        }
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += w;
        }
        count = i + 1;
    }
    if char_index != count {
        return None;
    }
    if col >= width {
        Some((row + 1, 0))
    } else {
        Some((row, col))
    }
}

/// Split `text` into display rows with the same rules as [`grid_position`].
pub(crate) fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![String::new()];
    let mut col = 0u16;
    for ch in text.chars() {
        if ch == '\n' {
            lines.push(String::new());
            col = 0;
            continue;
        }
        let w = char_width(ch);
        if col > 0 && col + w > width {
            lines.push(String::new());
            col = 0;
        }
        if let Some(line) = lines.last_mut() {
            line.push(ch);
        }
        col += w;
    }
    lines
}
