//! Types used to define the fields of [`crate::config::Config`].

use serde::Deserialize;

/// 100 MB, the largest object the upload interface accepts.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// How long a completed upload stays visible in the progress list.
pub const DEFAULT_COMPLETED_DISPLAY_MS: u64 = 1500;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
];

/// Pre-flight limits applied to every selected file, from the `[upload]`
/// table of `config.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,

    #[serde(default = "default_completed_display_ms")]
    pub completed_display_ms: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: default_allowed_mime_types(),
            completed_display_ms: DEFAULT_COMPLETED_DISPLAY_MS,
        }
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_allowed_mime_types() -> Vec<String> {
    DEFAULT_ALLOWED_MIME_TYPES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_completed_display_ms() -> u64 {
    DEFAULT_COMPLETED_DISPLAY_MS
}
