//! Messages, attachments and upload bookkeeping exchanged between the
//! composer, the upload pipeline and the external chat backend.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::delta::Delta;

/// A workspace member recently seen by the presence collaborator. Used only
/// to filter mention suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub user_name: String,
    /// Unix timestamp in milliseconds.
    #[serde(default)]
    pub last_activity: i64,
    #[serde(default)]
    pub message_count: u64,
}

impl ActiveUser {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            last_activity: 0,
            message_count: 0,
        }
    }
}

/// Reference to an uploaded file, embedded in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub url: String,
}

/// Structured payload of a message. Only ever constructed through
/// [`RichContent::assemble`], which refuses to build an empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl RichContent {
    /// Returns `None` when every part is empty so that callers never send a
    /// `richContent` object without content.
    pub fn assemble(
        delta: Option<Delta>,
        mentions: Vec<String>,
        attachments: Vec<Attachment>,
    ) -> Option<Self> {
        let delta = delta.filter(|d| !d.is_empty());
        let mentions = (!mentions.is_empty()).then_some(mentions);
        let attachments = (!attachments.is_empty()).then_some(attachments);
        if delta.is_none() && mentions.is_none() && attachments.is_none() {
            return None;
        }
        Some(Self {
            delta,
            mentions,
            attachments,
        })
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.as_deref().unwrap_or_default()
    }

    pub fn mentions(&self) -> &[String] {
        self.mentions.as_deref().unwrap_or_default()
    }
}

/// The message being replied to, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyContext {
    pub message_id: String,
    pub content: String,
    pub user_name: String,
}

/// Body of the external send-message call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub channel_id: String,
    pub content: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<RichContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_user_name: Option<String>,
}

impl SendMessageRequest {
    pub fn with_reply(mut self, reply: Option<&ReplyContext>) -> Self {
        if let Some(reply) = reply {
            self.reply_to_id = Some(reply.message_id.clone());
            self.reply_to_content = Some(reply.content.clone());
            self.reply_to_user_name = Some(reply.user_name.clone());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    #[serde(alias = "id")]
    pub message_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Completed,
    Error,
}

/// Per-file upload state as shown to the user.
///
/// Status only moves forward: `pending -> uploading -> completed | error`.
/// The transition methods return `false` and leave the task untouched when
/// asked to move backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    /// Position of the file in the user's original selection.
    pub index: usize,
    pub file_name: String,
    pub size: u64,
    pub mime_type: String,
    pub progress: u8,
    pub status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadTask {
    pub fn new(index: usize, file_name: impl Into<String>, size: u64, mime_type: &str) -> Self {
        Self {
            index,
            file_name: file_name.into(),
            size,
            mime_type: mime_type.to_string(),
            progress: 0,
            status: UploadStatus::Pending,
            error: None,
        }
    }

    pub fn start(&mut self) -> bool {
        if self.status != UploadStatus::Pending {
            return false;
        }
        self.status = UploadStatus::Uploading;
        true
    }

    pub fn complete(&mut self) -> bool {
        if self.status != UploadStatus::Uploading {
            return false;
        }
        self.status = UploadStatus::Completed;
        self.progress = 100;
        true
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.is_settled() {
            return false;
        }
        self.status = UploadStatus::Error;
        self.error = Some(reason.into());
        true
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, UploadStatus::Completed | UploadStatus::Error)
    }
}

/// Why a file was refused before any upload started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RejectionReason {
    TooLarge { size: u64, limit: u64 },
    DisallowedType { mime_type: String },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::TooLarge { size, limit } => write!(
                f,
                "file is {} which exceeds the {} limit",
                human_size(*size),
                human_size(*limit)
            ),
            RejectionReason::DisallowedType { mime_type } => {
                write!(f, "file type {mime_type} is not allowed")
            }
        }
    }
}

/// A pre-flight validation error for one file. Rejected files never become
/// [`UploadTask`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRejection {
    pub file_name: String,
    pub reason: RejectionReason,
}

impl fmt::Display for FileRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}

/// Result of storing one object through the storage gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub file_id: String,
    pub canonical_name: String,
    pub url: String,
    pub size: u64,
}

/// Successful response of the multipart upload interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

impl From<UploadedFile> for Attachment {
    fn from(file: UploadedFile) -> Self {
        Attachment {
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            url: file.url,
        }
    }
}

/// Error payload shared by the upload and download interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Uploaded(UploadedFile),
    Failed(ErrorBody),
}

pub fn human_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}
