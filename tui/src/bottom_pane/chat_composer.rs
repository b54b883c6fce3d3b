use std::cell::Cell;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use huddle_composer::Composer;
use huddle_composer::Draft;
use huddle_composer::KeyOutcome;
use huddle_composer::OverlayKey;
use huddle_composer::SubmitOutcome;
use huddle_core::PendingFile;
use huddle_protocol::ActiveUser;
use huddle_protocol::ReplyContext;
use huddle_protocol::human_size;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;

use super::mention_popup::MentionPopup;
use crate::caret::GridLocator;
use crate::caret::grid_position;
use crate::caret::wrap_lines;

const BASE_PLACEHOLDER_TEXT: &str = "send a message";
const ATTACH_COMMAND: &str = "/attach ";
const DETACH_COMMAND: &str = "/detach";
/// Width assumed before the first frame has been drawn.
const DEFAULT_WIDTH: u16 = 80;

/// Result returned when the user interacts with the text area.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    Submitted(Draft),
    Attach(PathBuf),
    None,
}

/// Screen regions of one composer frame, top to bottom.
struct ComposerLayout {
    popup: Option<Rect>,
    files: Option<Rect>,
    reply: Option<Rect>,
    textarea: Rect,
}

pub(crate) struct ChatComposer {
    composer: Composer,
    channel_id: String,
    /// Width of the last rendered area; the caret locator wraps with it.
    width: Cell<u16>,
    /// Where the mention popup was last drawn, for mouse hit testing.
    popup_area: Cell<Option<Rect>>,
    submitting: bool,
}

impl ChatComposer {
    pub fn new(channel_id: impl Into<String>, active_users: Vec<ActiveUser>) -> Self {
        let mut composer = Composer::new();
        composer.set_active_users(active_users);
        Self {
            composer,
            channel_id: channel_id.into(),
            width: Cell::new(DEFAULT_WIDTH),
            popup_area: Cell::new(None),
            submitting: false,
        }
    }

    #[cfg(test)]
    fn text(&self) -> String {
        self.composer.buffer().text()
    }

    #[cfg(test)]
    fn is_popup_open(&self) -> bool {
        self.composer.overlay().is_open()
    }

    pub(crate) fn attach(&mut self, file: PendingFile) {
        self.composer.attach(file);
    }

    pub(crate) fn set_reply(&mut self, reply: Option<ReplyContext>) {
        self.composer.set_reply(reply);
    }

    pub(crate) fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Clear the draft if the submit went through.
    pub(crate) fn apply_outcome(&mut self, outcome: &SubmitOutcome) {
        self.composer.apply_outcome(outcome);
        self.popup_area.set(None);
    }

    fn locator(&self) -> GridLocator {
        GridLocator {
            width: text_width(self.width.get()),
            origin_x: 0,
            origin_y: 0,
        }
    }

    pub fn handle_paste(&mut self, pasted: String) -> bool {
        let locator = self.locator();
        self.composer
            .edit(&locator, |buffer| buffer.insert_str(&pasted));
        true
    }

    /// Handle a key event coming from the main UI.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if self.composer.overlay().is_open() {
            if let Some(key) = overlay_key(&key_event) {
                let locator = self.locator();
                let outcome = self.composer.handle_overlay_key(key, &locator);
                if outcome != KeyOutcome::Ignored {
                    return (InputResult::None, true);
                }
            }
        }
        self.handle_key_event_without_popup(key_event)
    }

    fn handle_key_event_without_popup(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        let locator = self.locator();
        let KeyEvent {
            code, modifiers, ..
        } = key_event;
        match code {
            KeyCode::Enter if modifiers.is_empty() => self.submit(),
            KeyCode::Enter => {
                self.composer.edit(&locator, |b| b.insert_char('\n'));
                (InputResult::None, true)
            }
            KeyCode::Char('j') if modifiers == KeyModifiers::CONTROL => {
                self.composer.edit(&locator, |b| b.insert_char('\n'));
                (InputResult::None, true)
            }
            KeyCode::Char(ch)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.composer.edit(&locator, |b| b.insert_char(ch));
                (InputResult::None, true)
            }
            KeyCode::Backspace => {
                self.composer.edit(&locator, |b| b.delete_backward());
                (InputResult::None, true)
            }
            KeyCode::Delete => {
                self.composer.edit(&locator, |b| b.delete_forward());
                (InputResult::None, true)
            }
            KeyCode::Left => {
                self.composer.edit(&locator, |b| b.move_left());
                (InputResult::None, true)
            }
            KeyCode::Right => {
                self.composer.edit(&locator, |b| b.move_right());
                (InputResult::None, true)
            }
            KeyCode::Home => {
                self.composer.edit(&locator, |b| b.move_home());
                (InputResult::None, true)
            }
            KeyCode::End => {
                self.composer.edit(&locator, |b| b.move_end());
                (InputResult::None, true)
            }
            _ => (InputResult::None, false),
        }
    }

    fn submit(&mut self) -> (InputResult, bool) {
        if self.submitting {
            return (InputResult::None, false);
        }
        let text = self.composer.buffer().text();
        let locator = self.locator();

        if let Some(path) = text.trim_start().strip_prefix(ATTACH_COMMAND) {
            let path = PathBuf::from(path.trim());
            self.composer.edit(&locator, |b| b.reset());
            return (InputResult::Attach(path), true);
        }
        if text.trim() == DETACH_COMMAND {
            let last = self.composer.files().len().checked_sub(1);
            if let Some(file) = last.and_then(|i| self.composer.remove_file(i)) {
                tracing::debug!("detached {}", file.name);
            }
            self.composer.edit(&locator, |b| b.reset());
            return (InputResult::None, true);
        }

        if text.trim().is_empty() && self.composer.files().is_empty() {
            return (InputResult::None, false);
        }
        (
            InputResult::Submitted(self.composer.draft(self.channel_id.clone())),
            true,
        )
    }

    /// Mouse click at screen cell (`x`, `y`). Returns whether a suggestion
    /// was picked.
    pub fn handle_click(&mut self, x: u16, y: u16) -> bool {
        let Some(area) = self.popup_area.get() else {
            return false;
        };
        if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
            return false;
        }
        let index = match self.composer.overlay().state() {
            Some(state) => MentionPopup::new(state).index_at_row(area, y),
            None => None,
        };
        let locator = self.locator();
        index.is_some_and(|i| self.composer.select_suggestion(i, &locator))
    }

    pub fn desired_height(&self, width: u16) -> u16 {
        let buffer = self.composer.buffer();
        let text = buffer.text();
        let width = text_width(width);
        let caret_row = grid_position(&text, buffer.cursor(), width).map_or(0, |(row, _)| row);
        let text_rows = (wrap_lines(&text, width).len() as u16).max(caret_row + 1);
        self.popup_height() + self.extra_rows() + text_rows + 2
    }

    fn popup_height(&self) -> u16 {
        self.composer
            .overlay()
            .state()
            .map(|state| MentionPopup::new(state).required_height())
            .unwrap_or(0)
    }

    fn extra_rows(&self) -> u16 {
        u16::from(!self.composer.files().is_empty()) + u16::from(self.composer.reply().is_some())
    }

    fn layout(&self, area: Rect) -> ComposerLayout {
        let mut y = area.y;
        let mut take = |height: u16| {
            let height = height.min(area.bottom().saturating_sub(y));
            let rect = Rect::new(area.x, y, area.width, height);
            y += height;
            rect
        };

        let popup = self.composer.overlay().state().map(|state| {
            let popup = MentionPopup::new(state);
            let row = take(popup.required_height());
            let width = popup.required_width().min(area.width);
            // Line the popup up with the `@`, shifted left if it would overflow.
            let left = area
                .x
                .saturating_add(1)
                .saturating_add(state.anchor.left)
                .min(area.right().saturating_sub(width));
            Rect::new(left.max(area.x), row.y, width, row.height)
        });
        let files = (!self.composer.files().is_empty()).then(|| take(1));
        let reply = self.composer.reply().is_some().then(|| take(1));
        let textarea = take(u16::MAX);
        ComposerLayout {
            popup,
            files,
            reply,
            textarea,
        }
    }

    /// Terminal cursor position for the caret, if it is inside `area`.
    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let layout = self.layout(area);
        let inner = Block::default().borders(Borders::ALL).inner(layout.textarea);
        let buffer = self.composer.buffer();
        let (row, col) = grid_position(&buffer.text(), buffer.cursor(), inner.width)?;
        let (x, y) = (inner.x + col, inner.y + row);
        (y < inner.bottom() && x < inner.right()).then_some((x, y))
    }
}

fn text_width(width: u16) -> u16 {
    width.saturating_sub(2).max(1)
}

fn overlay_key(key_event: &KeyEvent) -> Option<OverlayKey> {
    match key_event.code {
        KeyCode::Up => Some(OverlayKey::Up),
        KeyCode::Down => Some(OverlayKey::Down),
        KeyCode::Enter | KeyCode::Tab if key_event.modifiers.is_empty() => Some(OverlayKey::Enter),
        KeyCode::Esc => Some(OverlayKey::Escape),
        _ => None,
    }
}

impl WidgetRef for &ChatComposer {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        self.width.set(area.width);
        let layout = self.layout(area);

        self.popup_area.set(layout.popup);
        if let (Some(rect), Some(state)) = (layout.popup, self.composer.overlay().state()) {
            MentionPopup::new(state).render_ref(rect, buf);
        }

        if let Some(rect) = layout.files {
            let names: Vec<String> = self
                .composer
                .files()
                .iter()
                .map(|f| format!("{} ({})", f.name, human_size(f.size())))
                .collect();
            Line::from(format!("📎 {}", names.join(", ")))
                .dim()
                .render_ref(rect, buf);
        }

        if let (Some(rect), Some(reply)) = (layout.reply, self.composer.reply()) {
            Line::from(format!("↪ @{}: {}", reply.user_name, reply.content))
                .dim()
                .render_ref(rect, buf);
        }

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().dim());
        if self.submitting {
            block = block.title(" sending… ");
        }
        let inner = block.inner(layout.textarea);
        block.render_ref(layout.textarea, buf);

        let text = self.composer.buffer().text();
        let paragraph = if text.is_empty() {
            Paragraph::new(Line::from(BASE_PLACEHOLDER_TEXT).dim())
        } else {
            Paragraph::new(
                wrap_lines(&text, inner.width)
                    .into_iter()
                    .map(Line::from)
                    .collect::<Vec<_>>(),
            )
        };
        paragraph.render_ref(inner, buf);
    }
}
