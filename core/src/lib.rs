//! Root of the `huddle-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output must go through the appropriate abstraction (e.g.,
// the TUI or the tracing stack).
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod body;
pub mod config;
pub mod config_types;
pub mod error;
mod flags;
mod mentions;
mod pending_file;
mod send;
mod upload;
mod uploader;
pub mod user_agent;
pub mod validation;

pub use body::ParsedBody;
pub use body::parse_body;
pub use config::Config;
pub use config::ConfigOverrides;
pub use config_types::UploadLimits;
pub use error::HuddleErr;
pub use error::get_error_message_ui;
pub use mentions::extract_mentions;
pub use pending_file::PendingFile;
pub use send::HttpMessageSender;
pub use send::MessageSender;
pub use upload::NoProgress;
pub use upload::ProgressObserver;
pub use upload::UploadCoordinator;
pub use upload::UploadOutcome;
pub use uploader::ConfiguredUploader;
pub use uploader::FileUploader;
pub use uploader::StorageUploader;
pub use uploader::UploadEndpointClient;
pub use validation::validate;
