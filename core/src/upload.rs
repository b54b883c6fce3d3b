//! Concurrent multi-file uploads with per-file progress.
//!
//! Every file gets an [`UploadTask`] up front. All uploads run at once and
//! every status change publishes the whole task list to a
//! [`ProgressObserver`]. A failing upload only marks its own task; the
//! coordinator resolves once every task has settled.

use std::sync::Mutex;
use std::sync::PoisonError;

use futures::future::join_all;
use huddle_protocol::Attachment;
use huddle_protocol::UploadTask;
use tracing::info;
use tracing::warn;

use crate::error::get_error_message_ui;
use crate::pending_file::PendingFile;
use crate::uploader::FileUploader;

/// Receives a full snapshot of every task whenever one of them changes.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, tasks: &[UploadTask]);
}

/// Observer that drops every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _tasks: &[UploadTask]) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Successful uploads, in the order the files were selected.
    pub attachments: Vec<Attachment>,
    /// Final state of every task, including failed ones.
    pub tasks: Vec<UploadTask>,
}

impl UploadOutcome {
    pub fn failed(&self) -> impl Iterator<Item = &UploadTask> {
        self.tasks.iter().filter(|t| t.error.is_some())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

pub struct UploadCoordinator<U> {
    uploader: U,
}

impl<U: FileUploader> UploadCoordinator<U> {
    pub fn new(uploader: U) -> Self {
        Self { uploader }
    }

    /// Upload `files` concurrently. Never fails as a whole: per-file errors
    /// end up in the matching task's `error` field.
    pub async fn upload(
        &self,
        files: &[PendingFile],
        observer: &dyn ProgressObserver,
    ) -> UploadOutcome {
        let tasks = Mutex::new(
            files
                .iter()
                .enumerate()
                .map(|(index, f)| UploadTask::new(index, f.name.clone(), f.size(), &f.mime_type))
                .collect::<Vec<_>>(),
        );
        if files.is_empty() {
            return UploadOutcome {
                attachments: Vec::new(),
                tasks: Vec::new(),
            };
        }
        observer.on_progress(&lock(&tasks));

        let update = |index: usize, f: &dyn Fn(&mut UploadTask) -> bool| {
            let mut tasks = lock(&tasks);
            if let Some(task) = tasks.get_mut(index)
                && f(task)
            {
                observer.on_progress(&tasks);
            }
        };

        let uploads = files.iter().enumerate().map(|(index, file)| {
            let update = &update;
            async move {
                update(index, &|t| t.start());
                info!(index, file = %file.name, size = file.size(), "upload started");
                match self.uploader.upload_file(file).await {
                    Ok(attachment) => {
                        info!(index, file = %file.name, "upload completed");
                        update(index, &|t| t.complete());
                        Some(attachment)
                    }
                    Err(err) => {
                        warn!(index, file = %file.name, "upload failed: {err}");
                        let reason = get_error_message_ui(&err);
                        update(index, &|t| t.fail(reason.clone()));
                        None
                    }
                }
            }
        });

        // join_all yields results in input order, whatever order the
        // uploads finish in.
        let attachments = join_all(uploads).await.into_iter().flatten().collect();
        let tasks = tasks.into_inner().unwrap_or_else(PoisonError::into_inner);
        UploadOutcome { attachments, tasks }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
