use huddle_storage::StorageErr;
use reqwest::StatusCode;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HuddleErr>;

#[derive(Error, Debug)]
pub enum HuddleErr {
    /// Unexpected HTTP status code.
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(StatusCode, String),

    /// The upload interface answered with an `{error, details}` body.
    #[error("{}", upload_rejected_message(.error, .details.as_deref()))]
    UploadRejected {
        error: String,
        details: Option<String>,
    },

    /// No endpoint is configured for a required external interface.
    #[error("no {0} endpoint is configured")]
    MissingEndpoint(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] StorageErr),

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

fn upload_rejected_message(error: &str, details: Option<&str>) -> String {
    match details {
        Some(details) => format!("{error}: {details}"),
        None => error.to_string(),
    }
}

impl HuddleErr {
    /// HTTP status when the failure came from the remote side.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HuddleErr::UnexpectedStatus(status, _) => Some(*status),
            HuddleErr::Storage(err) => Some(err.status()),
            HuddleErr::Reqwest(err) => err.status(),
            _ => None,
        }
    }
}

/// Short, transient notification text for a failure.
pub fn get_error_message_ui(e: &HuddleErr) -> String {
    match e {
        HuddleErr::UploadRejected { error, .. } => error.clone(),
        HuddleErr::UnexpectedStatus(status, body) if body.trim().is_empty() => {
            format!("request failed ({status})")
        }
        HuddleErr::UnexpectedStatus(status, body) => {
            format!("request failed ({status}): {}", body.trim())
        }
        HuddleErr::Reqwest(err) if err.is_connect() || err.is_timeout() => {
            "could not reach the server".to_string()
        }
        _ => e.to_string(),
    }
}

/// Turn a non-2xx response into [`HuddleErr::UnexpectedStatus`] carrying
/// the response body.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(HuddleErr::UnexpectedStatus(status, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn upload_rejected_includes_details_when_present() {
        let err = HuddleErr::UploadRejected {
            error: "File type not allowed".to_string(),
            details: Some("application/x-msdownload".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "File type not allowed: application/x-msdownload"
        );
        assert_eq!(get_error_message_ui(&err), "File type not allowed");
    }

    #[test]
    fn status_errors_render_body_for_users() {
        let err = HuddleErr::UnexpectedStatus(StatusCode::BAD_REQUEST, "channel missing\n".into());
        assert_eq!(
            get_error_message_ui(&err),
            "request failed (400 Bad Request): channel missing"
        );
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }
}
