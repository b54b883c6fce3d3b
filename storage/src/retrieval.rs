use bytes::Bytes;
use huddle_protocol::ErrorBody;
use reqwest::StatusCode;

use crate::content_type::ContentHeaders;
use crate::error::StorageErr;

pub(crate) const NOT_ACCESSIBLE_SUGGESTION: &str =
    "Check that the storage bucket allows public reads or that the configured key can read it.";

/// Which retrieval tier produced a URL for the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Scoped, time-limited URL signed with a download authorization.
    Authorized { url: String },
    /// Unsigned URL on the public download host.
    Public { url: String },
}

impl Retrieval {
    pub fn url(&self) -> &str {
        match self {
            Retrieval::Authorized { url } | Retrieval::Public { url } => url,
        }
    }
}

/// Object bytes streamed through one of the retrieval tiers.
#[derive(Debug, Clone)]
pub struct FetchedObject {
    pub name: String,
    pub headers: ContentHeaders,
    pub body: Bytes,
    pub via: Retrieval,
}

/// Framework-agnostic answer to a `GET` for an object by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectResponse {
    Redirect {
        location: String,
        headers: ContentHeaders,
    },
    Error {
        status: StatusCode,
        body: ErrorBody,
    },
}

impl ObjectResponse {
    pub fn status(&self) -> StatusCode {
        match self {
            ObjectResponse::Redirect { .. } => StatusCode::FOUND,
            ObjectResponse::Error { status, .. } => *status,
        }
    }

    pub(crate) fn from_error(name: &str, err: &StorageErr) -> Self {
        let body = match err {
            StorageErr::NotAccessible {
                filename,
                suggestion,
            } => ErrorBody {
                error: "File not accessible".to_string(),
                details: None,
                filename: Some(filename.clone()),
                suggestion: Some(suggestion.clone()),
            },
            other => ErrorBody {
                error: "Failed to retrieve file".to_string(),
                details: Some(other.to_string()),
                filename: Some(name.to_string()),
                suggestion: None,
            },
        };
        let status = match err {
            StorageErr::NotAccessible { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ObjectResponse::Error { status, body }
    }
}
