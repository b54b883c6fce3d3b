use std::future::Future;
use std::sync::Arc;

use huddle_protocol::Attachment;
use huddle_protocol::UploadResponse;
use huddle_storage::StorageGateway;
use reqwest::multipart::Form;
use reqwest::multipart::Part;

use crate::config::Config;
use crate::error::HuddleErr;
use crate::error::Result;
use crate::pending_file::PendingFile;
use crate::user_agent::build_http_client;

/// Uploads a single file and returns the attachment reference for it.
pub trait FileUploader: Send + Sync {
    fn upload_file(&self, file: &PendingFile) -> impl Future<Output = Result<Attachment>> + Send;
}

impl<T: FileUploader> FileUploader for Arc<T> {
    fn upload_file(&self, file: &PendingFile) -> impl Future<Output = Result<Attachment>> + Send {
        (**self).upload_file(file)
    }
}

/// Client for the multipart upload interface.
#[derive(Debug, Clone)]
pub struct UploadEndpointClient {
    client: reqwest::Client,
    endpoint: String,
}

impl UploadEndpointClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(build_http_client(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl FileUploader for UploadEndpointClient {
    async fn upload_file(&self, file: &PendingFile) -> Result<Attachment> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);

        let resp = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        // The interface answers `{error, details?}` on failure, usually with a
        // 4xx/5xx status. Honour that body whatever the status is.
        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(UploadResponse::Failed(err)) => Err(HuddleErr::UploadRejected {
                error: err.error,
                details: err.details,
            }),
            Ok(UploadResponse::Uploaded(uploaded)) if status.is_success() => Ok(uploaded.into()),
            Ok(UploadResponse::Uploaded(_)) => Err(HuddleErr::UnexpectedStatus(status, body)),
            Err(_) if !status.is_success() => Err(HuddleErr::UnexpectedStatus(status, body)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Uploads straight to object storage, bypassing the upload interface.
pub struct StorageUploader {
    gateway: Arc<StorageGateway>,
    download_endpoint: Option<String>,
}

impl StorageUploader {
    /// With a `download_endpoint`, attachment URLs point at the download
    /// interface (`{endpoint}?file={canonical_name}`) instead of storage.
    pub fn new(gateway: Arc<StorageGateway>, download_endpoint: Option<String>) -> Self {
        Self {
            gateway,
            download_endpoint,
        }
    }
}

impl FileUploader for StorageUploader {
    async fn upload_file(&self, file: &PendingFile) -> Result<Attachment> {
        let stored = self
            .gateway
            .upload(file.bytes.clone(), &file.name, &file.mime_type)
            .await?;
        let url = match &self.download_endpoint {
            Some(endpoint) => format!(
                "{endpoint}?file={}",
                urlencoding::encode(&stored.canonical_name)
            ),
            None => stored.url,
        };
        Ok(Attachment {
            name: file.name.clone(),
            size: stored.size,
            mime_type: file.mime_type.clone(),
            url,
        })
    }
}

/// The uploader selected by configuration: the upload interface when one
/// is configured, direct storage otherwise.
pub enum ConfiguredUploader {
    Endpoint(UploadEndpointClient),
    Storage(StorageUploader),
}

impl ConfiguredUploader {
    pub fn from_config(config: &Config) -> Self {
        match &config.upload_endpoint {
            Some(endpoint) => Self::Endpoint(UploadEndpointClient::new(endpoint.clone())),
            None => Self::Storage(StorageUploader::new(
                Arc::new(StorageGateway::new(build_http_client(), &config.storage)),
                config.download_endpoint.clone(),
            )),
        }
    }
}

impl FileUploader for ConfiguredUploader {
    async fn upload_file(&self, file: &PendingFile) -> Result<Attachment> {
        match self {
            Self::Endpoint(client) => client.upload_file(file).await,
            Self::Storage(uploader) => uploader.upload_file(file).await,
        }
    }
}
