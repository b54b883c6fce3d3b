use reqwest::StatusCode;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageErr>;

#[derive(Error, Debug)]
pub enum StorageErr {
    /// The storage service rejected our credentials or session token.
    #[error("storage authorization failed ({0}): {1}")]
    Unauthorized(StatusCode, String),

    /// No credentials were configured, so a session cannot be established.
    #[error("storage credentials are not configured: {0}")]
    MissingCredentials(&'static str),

    /// Unexpected HTTP status code.
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(StatusCode, String),

    /// Every retrieval tier failed for this object.
    #[error("file {filename} is not accessible. {suggestion}")]
    NotAccessible {
        filename: String,
        suggestion: String,
    },

    // -----------------------------------------------------------------
    // Automatic conversions for common external error types
    // -----------------------------------------------------------------
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StorageErr {
    /// Errors after which the cached session must be dropped and a fresh one
    /// acquired before the next authorized call.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, StorageErr::Unauthorized(..))
    }

    /// HTTP status this error maps to at the download boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            StorageErr::NotAccessible { .. } => StatusCode::NOT_FOUND,
            StorageErr::Unauthorized(status, _) | StorageErr::UnexpectedStatus(status, _) => {
                *status
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turn a non-2xx response into a typed error, keeping the body so callers
/// see what the service actually said.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StorageErr::Unauthorized(status, body));
    }
    Err(StorageErr::UnexpectedStatus(status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_authorization_failures_invalidate_the_session() {
        assert!(StorageErr::Unauthorized(StatusCode::UNAUTHORIZED, String::new()).is_auth_error());
        assert!(
            !StorageErr::UnexpectedStatus(StatusCode::BAD_GATEWAY, String::new()).is_auth_error()
        );
        assert!(!StorageErr::MissingCredentials("key_id").is_auth_error());
    }

    #[test]
    fn not_accessible_maps_to_404() {
        let err = StorageErr::NotAccessible {
            filename: "cat.png".to_string(),
            suggestion: "Check the bucket.".to_string(),
        };
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "file cat.png is not accessible. Check the bucket.");
    }
}
