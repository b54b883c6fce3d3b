//! Bottom pane: upload progress rows stacked above the ChatComposer.

use std::time::Duration;
use std::time::Instant;

use crossterm::event::KeyEvent;
use huddle_composer::SubmitOutcome;
use huddle_core::PendingFile;
use huddle_protocol::ActiveUser;
use huddle_protocol::ReplyContext;
use huddle_protocol::UploadTask;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::WidgetRef;

mod chat_composer;
mod mention_popup;
mod popup_consts;
mod upload_progress;

pub(crate) use chat_composer::ChatComposer;
pub(crate) use chat_composer::InputResult;

use upload_progress::UploadProgressView;

pub(crate) struct BottomPaneParams {
    pub(crate) channel_id: String,
    pub(crate) active_users: Vec<ActiveUser>,
    /// How long a completed upload row stays visible.
    pub(crate) completed_display: Duration,
}

/// Pane displayed in the lower half of the chat UI.
pub(crate) struct BottomPane {
    composer: ChatComposer,
    progress: UploadProgressView,
}

impl BottomPane {
    pub fn new(params: BottomPaneParams) -> Self {
        Self {
            composer: ChatComposer::new(params.channel_id, params.active_users),
            progress: UploadProgressView::new(params.completed_display),
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        self.composer.handle_key_event(key_event)
    }

    pub fn handle_paste(&mut self, pasted: String) -> bool {
        self.composer.handle_paste(pasted)
    }

    pub fn handle_click(&mut self, x: u16, y: u16) -> bool {
        self.composer.handle_click(x, y)
    }

    pub fn attach(&mut self, file: PendingFile) {
        self.composer.attach(file);
    }

    pub fn set_reply(&mut self, reply: Option<ReplyContext>) {
        self.composer.set_reply(reply);
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.composer.set_submitting(submitting);
    }

    pub fn apply_outcome(&mut self, outcome: &SubmitOutcome) {
        self.composer.apply_outcome(outcome);
    }

    pub fn update_upload_progress(&mut self, tasks: Vec<UploadTask>) {
        self.progress.update(tasks, Instant::now());
    }

    /// Returns whether a redraw is needed.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        self.progress.prune(now)
    }

    pub fn desired_height(&self, width: u16) -> u16 {
        self.progress.desired_height() + self.composer.desired_height(width)
    }

    fn composer_area(&self, area: Rect) -> (Rect, Rect) {
        let progress_height = self.progress.desired_height().min(area.height);
        let progress = Rect {
            height: progress_height,
            ..area
        };
        let composer = Rect {
            y: area.y + progress_height,
            height: area.height - progress_height,
            ..area
        };
        (progress, composer)
    }

    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let (_, composer) = self.composer_area(area);
        self.composer.cursor_pos(composer)
    }
}

impl WidgetRef for &BottomPane {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let (progress, composer) = self.composer_area(area);
        if !self.progress.is_empty() {
            self.progress.render_ref(progress, buf);
        }
        (&self.composer).render_ref(composer, buf);
    }
}
