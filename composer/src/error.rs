use huddle_core::HuddleErr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComposerErr>;

/// Failures that abort a submit. Upload problems never end up here; they
/// are reported as notices and the message is sent without those files.
#[derive(Error, Debug)]
pub enum ComposerErr {
    #[error("failed to send message: {0}")]
    Send(#[source] HuddleErr),
}
