use huddle_composer::SuggestionState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::Constraint;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Cell;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::Widget;
use ratatui::widgets::WidgetRef;
use unicode_width::UnicodeWidthStr;

use super::popup_consts::MAX_POPUP_ROWS;

/// Renders an open [`SuggestionState`] as a bordered list of user names.
pub(crate) struct MentionPopup<'a> {
    state: &'a SuggestionState,
}

impl<'a> MentionPopup<'a> {
    pub(crate) fn new(state: &'a SuggestionState) -> Self {
        Self { state }
    }

    fn visible_rows(&self) -> usize {
        self.state.matches.len().clamp(1, MAX_POPUP_ROWS)
    }

    /// First match shown, chosen so the highlighted row is visible.
    pub(crate) fn scroll_top(&self) -> usize {
        let rows = self.visible_rows();
        (self.state.highlighted + 1).saturating_sub(rows)
    }

    /// Preferred height (rows) including border.
    pub(crate) fn required_height(&self) -> u16 {
        self.visible_rows() as u16 + 2
    }

    /// Preferred width including border and padding.
    pub(crate) fn required_width(&self) -> u16 {
        let names = self
            .state
            .matches
            .iter()
            .map(|n| n.width())
            .max()
            .unwrap_or(0);
        let title = self.state.search_term.width() + 3;
        (names.max(title) + 4) as u16
    }

    /// Match index under screen row `y` of a popup drawn in `area`.
    pub(crate) fn index_at_row(&self, area: Rect, y: u16) -> Option<usize> {
        // Rows start below the top border.
        let row = y.checked_sub(area.y + 1)? as usize;
        if row >= self.visible_rows() {
            return None;
        }
        let index = self.scroll_top() + row;
        (index < self.state.matches.len()).then_some(index)
    }
}

/// Char range of the first case-insensitive occurrence of `term` in `name`.
fn match_span(name: &str, term: &str) -> Option<(usize, usize)> {
    if term.is_empty() {
        return None;
    }
    let name: Vec<char> = name.chars().collect();
    let term: Vec<char> = term.chars().collect();
    let eq = |a: char, b: char| a.to_lowercase().eq(b.to_lowercase());
    (0..=name.len().checked_sub(term.len())?)
        .find(|&start| term.iter().enumerate().all(|(i, &t)| eq(name[start + i], t)))
        .map(|start| (start, start + term.len()))
}

impl WidgetRef for MentionPopup<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let rows: Vec<Row> = state
            .matches
            .iter()
            .enumerate()
            .skip(self.scroll_top())
            .take(self.visible_rows())
            .map(|(i, name)| {
                let spans: Vec<Span> = match match_span(name, &state.search_term) {
                    Some((start, end)) => name
                        .chars()
                        .enumerate()
                        .map(|(idx, ch)| {
                            let mut style = Style::default();
                            if (start..end).contains(&idx) {
                                style = style.add_modifier(Modifier::BOLD);
                            }
                            Span::styled(ch.to_string(), style)
                        })
                        .collect(),
                    None => vec![Span::raw(name.clone())],
                };

                let mut cell = Cell::from(Line::from(spans));
                if i == state.highlighted {
                    cell = cell.style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    );
                }
                Row::new(vec![cell])
            })
            .collect();

        let table = Table::new(rows, vec![Constraint::Percentage(100)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(format!(" @{} ", state.search_term)),
            );

        table.render(area, buf);
    }
}
