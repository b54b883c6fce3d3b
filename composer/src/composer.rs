use huddle_core::PendingFile;
use huddle_protocol::ActiveUser;
use huddle_protocol::ReplyContext;

use crate::mention_editor::insert_mention;
use crate::orchestrator::Draft;
use crate::orchestrator::SubmitOutcome;
use crate::suggestion_overlay::CaretLocator;
use crate::suggestion_overlay::KeyOutcome;
use crate::suggestion_overlay::OverlayKey;
use crate::suggestion_overlay::Selection;
use crate::suggestion_overlay::SuggestionOverlay;
use crate::text_buffer::TextBuffer;

/// One editor instance: the buffer, its suggestion overlay and what will
/// be submitted alongside the text.
///
/// Every buffer mutation goes through here so that the overlay is
/// re-evaluated against the current text and cursor each time.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: TextBuffer,
    overlay: SuggestionOverlay,
    files: Vec<PendingFile>,
    reply: Option<ReplyContext>,
    active_users: Vec<ActiveUser>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn overlay(&self) -> &SuggestionOverlay {
        &self.overlay
    }

    pub fn files(&self) -> &[PendingFile] {
        &self.files
    }

    pub fn reply(&self) -> Option<&ReplyContext> {
        self.reply.as_ref()
    }

    /// Replace the users offered as suggestions. Takes effect on the next
    /// edit.
    pub fn set_active_users(&mut self, users: Vec<ActiveUser>) {
        self.active_users = users;
    }

    pub fn attach(&mut self, file: PendingFile) {
        self.files.push(file);
    }

    pub fn remove_file(&mut self, index: usize) -> Option<PendingFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn set_reply(&mut self, reply: Option<ReplyContext>) {
        self.reply = reply;
    }

    /// Apply an edit to the buffer and refresh the overlay.
    pub fn edit(&mut self, locator: &dyn CaretLocator, f: impl FnOnce(&mut TextBuffer)) {
        f(&mut self.buffer);
        self.refresh_overlay(locator);
    }

    /// Route a navigation key to the overlay. A confirmed choice is spliced
    /// into the buffer before this returns.
    pub fn handle_overlay_key(&mut self, key: OverlayKey, locator: &dyn CaretLocator) -> KeyOutcome {
        let outcome = self.overlay.handle_key(key);
        if let KeyOutcome::Selected(selection) = &outcome {
            self.apply_selection(selection, locator);
        }
        outcome
    }

    /// Click on row `index` of the overlay.
    pub fn select_suggestion(&mut self, index: usize, locator: &dyn CaretLocator) -> bool {
        match self.overlay.select(index) {
            Some(selection) => {
                self.apply_selection(&selection, locator);
                true
            }
            None => false,
        }
    }

    /// Snapshot what a submit would send.
    pub fn draft(&self, channel_id: impl Into<String>) -> Draft {
        Draft {
            channel_id: channel_id.into(),
            body: self
                .buffer
                .to_delta()
                .to_json()
                .unwrap_or_else(|_| self.buffer.text()),
            files: self.files.clone(),
            reply: self.reply.clone(),
        }
    }

    /// Clear the editor after a successful send. Any other outcome leaves
    /// the draft in place for another try.
    pub fn apply_outcome(&mut self, outcome: &SubmitOutcome) {
        if outcome.is_sent() {
            self.buffer.reset();
            self.overlay.close();
            self.files.clear();
            self.reply = None;
        }
    }

    fn apply_selection(&mut self, selection: &Selection, locator: &dyn CaretLocator) {
        let cursor = self.buffer.cursor();
        if let Err(err) = insert_mention(
            &mut self.buffer,
            selection.trigger_start,
            cursor,
            &selection.user_name,
        ) {
            tracing::warn!("dropping stale mention selection: {err}");
        }
        self.refresh_overlay(locator);
    }

    fn refresh_overlay(&mut self, locator: &dyn CaretLocator) {
        let text = self.buffer.text();
        self.overlay
            .on_text_change(&text, self.buffer.cursor(), &self.active_users, locator);
    }
}
