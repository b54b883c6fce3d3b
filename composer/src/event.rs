use huddle_core::ProgressObserver;
use huddle_protocol::UploadTask;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Short, transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// Full snapshot of every upload task of the current submit.
    UploadProgress(Vec<UploadTask>),
    Notice(Notice),
}

#[derive(Clone, Debug)]
pub struct ComposerEventSender {
    tx: UnboundedSender<ComposerEvent>,
}

impl ComposerEventSender {
    pub fn new(tx: UnboundedSender<ComposerEvent>) -> Self {
        Self { tx }
    }

    /// Send an event to the composer event channel. If it fails, we swallow
    /// the error and log it.
    pub fn send(&self, event: ComposerEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("failed to send event: {e}");
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.send(ComposerEvent::Notice(notice));
    }
}

impl ProgressObserver for ComposerEventSender {
    fn on_progress(&self, tasks: &[UploadTask]) {
        self.send(ComposerEvent::UploadProgress(tasks.to_vec()));
    }
}
