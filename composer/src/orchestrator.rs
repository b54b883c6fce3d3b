//! Submit flow: parse the body, upload attachments, assemble the payload
//! and hand it to the send interface.

use huddle_core::FileUploader;
use huddle_core::MessageSender;
use huddle_core::PendingFile;
use huddle_core::UploadCoordinator;
use huddle_core::UploadLimits;
use huddle_core::extract_mentions;
use huddle_core::get_error_message_ui;
use huddle_core::parse_body;
use huddle_core::validate;
use huddle_protocol::Attachment;
use huddle_protocol::FileRejection;
use huddle_protocol::ReplyContext;
use huddle_protocol::RichContent;
use huddle_protocol::SendMessageRequest;
use huddle_protocol::UploadTask;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::ComposerErr;
use crate::error::Result;
use crate::event::ComposerEventSender;
use crate::event::Notice;

/// Snapshot of the composer taken at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub channel_id: String,
    /// Serialized delta document, or plain text.
    pub body: String,
    pub files: Vec<PendingFile>,
    pub reply: Option<ReplyContext>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub message_id: String,
    pub request: SendMessageRequest,
    pub rejections: Vec<FileRejection>,
    pub failed_uploads: Vec<UploadTask>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// No text and no files; nothing happened.
    Skipped,
    /// Only files were given and none of them made it. Nothing was sent and
    /// the draft should stay as it is.
    NothingSent {
        rejections: Vec<FileRejection>,
        failed_uploads: Vec<UploadTask>,
    },
    Sent(SentMessage),
}

impl SubmitOutcome {
    /// Whether the composer should be cleared.
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent(_))
    }
}

/// Body text for a message that only carries attachments.
pub fn shared_files_placeholder(count: usize) -> String {
    if count == 1 {
        "Shared 1 file".to_string()
    } else {
        format!("Shared {count} files")
    }
}

pub struct ComposerOrchestrator<U, S> {
    coordinator: UploadCoordinator<U>,
    sender: S,
    limits: UploadLimits,
    user_name: String,
    events: ComposerEventSender,
}

impl<U: FileUploader, S: MessageSender> ComposerOrchestrator<U, S> {
    pub fn new(
        uploader: U,
        sender: S,
        limits: UploadLimits,
        user_name: impl Into<String>,
        events: ComposerEventSender,
    ) -> Self {
        Self {
            coordinator: UploadCoordinator::new(uploader),
            sender,
            limits,
            user_name: user_name.into(),
            events,
        }
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Run one submit. Upload problems are reported through the event
    /// channel and never fail the call; only a failed send does, in which
    /// case the caller keeps the draft for a retry.
    pub async fn submit(&self, draft: &Draft) -> Result<SubmitOutcome> {
        let body = parse_body(&draft.body);
        let has_text = body.has_text();
        let has_files = !draft.files.is_empty();
        if !has_text && !has_files {
            debug!("empty submit ignored");
            return Ok(SubmitOutcome::Skipped);
        }

        let (attachments, rejections, failed_uploads) = if has_files {
            self.upload_files(draft.files.clone()).await
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };

        if !has_text && attachments.is_empty() {
            warn!("no text and no file uploaded; nothing to send");
            return Ok(SubmitOutcome::NothingSent {
                rejections,
                failed_uploads,
            });
        }

        let content = if has_text {
            body.plain_text.trim().to_string()
        } else {
            shared_files_placeholder(attachments.len())
        };
        let mentions = extract_mentions(&body.plain_text);
        let delta = if has_text { body.delta } else { None };
        let request = SendMessageRequest {
            channel_id: draft.channel_id.clone(),
            content,
            user_name: self.user_name.clone(),
            rich_content: RichContent::assemble(delta, mentions, attachments),
            reply_to_id: None,
            reply_to_content: None,
            reply_to_user_name: None,
        }
        .with_reply(draft.reply.as_ref());

        match self.sender.send(&request).await {
            Ok(message_id) => {
                info!(%message_id, channel = %draft.channel_id, "submit complete");
                Ok(SubmitOutcome::Sent(SentMessage {
                    message_id,
                    request,
                    rejections,
                    failed_uploads,
                }))
            }
            Err(err) => {
                warn!("send failed: {err}");
                self.events.notify(Notice::error(format!(
                    "Message not sent: {}",
                    get_error_message_ui(&err)
                )));
                Err(ComposerErr::Send(err))
            }
        }
    }

    async fn upload_files(
        &self,
        files: Vec<PendingFile>,
    ) -> (Vec<Attachment>, Vec<FileRejection>, Vec<UploadTask>) {
        let (accepted, rejections) = validate(files, &self.limits);
        for rejection in &rejections {
            self.events.notify(Notice::warning(rejection.to_string()));
        }

        let outcome = self.coordinator.upload(&accepted, &self.events).await;
        let failed: Vec<UploadTask> = outcome.failed().cloned().collect();
        match failed.len() {
            0 => {}
            n if n == outcome.tasks.len() => self
                .events
                .notify(Notice::error(format!("{n} file(s) failed to upload"))),
            n => self.events.notify(Notice::warning(format!(
                "{n} of {} files failed to upload; sending the rest",
                outcome.tasks.len()
            ))),
        }
        (outcome.attachments, rejections, failed)
    }
}
