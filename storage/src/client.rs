use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use huddle_protocol::StoredObject;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use sha1::Digest;
use sha1::Sha1;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config_types::StorageConfig;
use crate::content_type::ContentHeaders;
use crate::error::Result;
use crate::error::StorageErr;
use crate::error::check_status;
use crate::object_name::canonical_object_name;
use crate::object_name::now_millis;
use crate::retrieval::FetchedObject;
use crate::retrieval::NOT_ACCESSIBLE_SUGGESTION;
use crate::retrieval::ObjectResponse;
use crate::retrieval::Retrieval;
use crate::session::Authorization;
use crate::session::StorageSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrl {
    upload_url: String,
    authorization_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedObject {
    file_id: String,
    file_name: String,
    content_length: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadAuthorization {
    authorization_token: String,
}

/// Client for the object-storage service: uploads, tiered retrieval and
/// best-effort deletion, all sharing one injected [`StorageSession`].
pub struct StorageGateway {
    client: reqwest::Client,
    session: Arc<StorageSession>,
    bucket_id: String,
    bucket_name: String,
    public_download_url: Option<String>,
    download_ttl_secs: u64,
}

impl StorageGateway {
    pub fn new(client: reqwest::Client, config: &StorageConfig) -> Self {
        let session = Arc::new(StorageSession::new(client.clone(), config));
        Self::with_session(client, session, config)
    }

    /// Build a gateway around an existing session, e.g. one shared with
    /// another gateway instance.
    pub fn with_session(
        client: reqwest::Client,
        session: Arc<StorageSession>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            client,
            session,
            bucket_id: config.bucket_id.clone(),
            bucket_name: config.bucket_name.clone(),
            public_download_url: config
                .download_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            download_ttl_secs: config.download_authorization_ttl_secs,
        }
    }

    pub fn session(&self) -> &Arc<StorageSession> {
        &self.session
    }

    /// Store `data` under a canonical name derived from `name`.
    pub async fn upload(&self, data: Bytes, name: &str, content_type: &str) -> Result<StoredObject> {
        let canonical_name = canonical_object_name(name, now_millis());
        debug!(name, %canonical_name, size = data.len(), "uploading object");
        let data = &data;
        let object_name = canonical_name.as_str();
        let (uploaded, auth) = self
            .with_session_retry(move |auth| async move {
                let uploaded = self
                    .try_upload(&auth, data, object_name, content_type)
                    .await?;
                Ok((uploaded, auth))
            })
            .await?;
        info!(file_id = %uploaded.file_id, name = %uploaded.file_name, "object stored");
        let url = self.object_url(&auth.download_url, &uploaded.file_name);
        Ok(StoredObject {
            file_id: uploaded.file_id,
            canonical_name: uploaded.file_name,
            url,
            size: uploaded.content_length,
        })
    }

    /// Resolve a URL for `name`, trying in order:
    /// 1. a scoped download authorization,
    /// 2. the public download URL, validated with `HEAD`.
    ///
    /// If neither works the object is reported as not accessible.
    pub async fn resolve(&self, name: &str) -> Result<Retrieval> {
        match self.authorized_url(name).await {
            Ok(url) => return Ok(Retrieval::Authorized { url }),
            Err(err) => warn!("download authorization for {name} failed, trying public url: {err}"),
        }

        let not_accessible = || StorageErr::NotAccessible {
            filename: name.to_string(),
            suggestion: NOT_ACCESSIBLE_SUGGESTION.to_string(),
        };
        let Some(base) = self.public_base().await else {
            warn!("no public download host known for {name}");
            return Err(not_accessible());
        };
        let url = self.object_url(&base, name);
        match self.client.head(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(Retrieval::Public { url }),
            Ok(resp) => {
                warn!(status = %resp.status(), "public url for {name} failed validation");
                Err(not_accessible())
            }
            Err(err) => {
                warn!("public url for {name} unreachable: {err}");
                Err(not_accessible())
            }
        }
    }

    /// Stream the object through whichever tier [`Self::resolve`] picks.
    pub async fn fetch(&self, name: &str) -> Result<FetchedObject> {
        let via = self.resolve(name).await?;
        let resp = self.client.get(via.url()).send().await?;
        let resp = check_status(resp).await?;
        let reported = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;
        Ok(FetchedObject {
            name: name.to_string(),
            headers: ContentHeaders::for_object(name, reported.as_deref()),
            body,
            via,
        })
    }

    /// Answer a download request for `name` with a redirect or an error
    /// payload shaped for the HTTP boundary.
    pub async fn serve(&self, name: &str) -> ObjectResponse {
        match self.resolve(name).await {
            Ok(retrieval) => ObjectResponse::Redirect {
                location: retrieval.url().to_string(),
                headers: ContentHeaders::for_object(name, None),
            },
            Err(err) => ObjectResponse::from_error(name, &err),
        }
    }

    /// Best-effort deletion. Failures are returned, never retried; an
    /// authorization failure still drops the cached session.
    pub async fn delete(&self, file_id: &str, name: &str) -> Result<()> {
        let auth = self.session.authorization().await?;
        let url = format!("{}/b2api/v2/b2_delete_file_version", auth.api_url);
        debug!(url, file_id, name, "POST");
        let result = async {
            let resp = self
                .client
                .post(&url)
                .header(AUTHORIZATION, &auth.authorization_token)
                .json(&json!({ "fileName": name, "fileId": file_id }))
                .send()
                .await?;
            check_status(resp).await
        }
        .await;
        match result {
            Ok(_) => {
                info!(file_id, name, "object deleted");
                Ok(())
            }
            Err(err) => {
                if err.is_auth_error() {
                    self.session.invalidate().await;
                }
                warn!("failed to delete {name} ({file_id}): {err}");
                Err(err)
            }
        }
    }

    async fn try_upload(
        &self,
        auth: &Authorization,
        data: &Bytes,
        canonical_name: &str,
        content_type: &str,
    ) -> Result<UploadedObject> {
        let url = format!("{}/b2api/v2/b2_get_upload_url", auth.api_url);
        debug!(url, "POST");
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &auth.authorization_token)
            .json(&json!({ "bucketId": self.bucket_id }))
            .send()
            .await?;
        let target: UploadUrl = check_status(resp).await?.json().await?;

        let resp = self
            .client
            .post(&target.upload_url)
            .header(AUTHORIZATION, &target.authorization_token)
            .header("X-Bz-File-Name", urlencoding::encode(canonical_name).into_owned())
            .header(CONTENT_TYPE, content_type)
            .header("X-Bz-Content-Sha1", sha1_hex(data))
            .body(data.clone())
            .send()
            .await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn authorized_url(&self, name: &str) -> Result<String> {
        self.with_session_retry(move |auth| async move {
            let url = format!("{}/b2api/v2/b2_get_download_authorization", auth.api_url);
            debug!(url, name, "POST");
            let resp = self
                .client
                .post(&url)
                .header(AUTHORIZATION, &auth.authorization_token)
                .json(&json!({
                    "bucketId": self.bucket_id,
                    "fileNamePrefix": name,
                    "validDurationInSeconds": self.download_ttl_secs,
                }))
                .send()
                .await?;
            let grant: DownloadAuthorization = check_status(resp).await?.json().await?;
            Ok(format!(
                "{}?Authorization={}",
                self.object_url(&auth.download_url, name),
                urlencoding::encode(&grant.authorization_token)
            ))
        })
        .await
    }

    /// Run `op` with the cached session; on an authorization failure drop the
    /// session and retry exactly once with a fresh one.
    async fn with_session_retry<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(Arc<Authorization>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let auth = self.session.authorization().await?;
        match op(auth).await {
            Err(err) if err.is_auth_error() => {
                warn!("storage token rejected, re-authorizing: {err}");
                self.session.invalidate().await;
                let auth = self.session.authorization().await?;
                op(auth).await
            }
            other => other,
        }
    }

    async fn public_base(&self) -> Option<String> {
        if let Some(url) = &self.public_download_url {
            return Some(url.clone());
        }
        self.session
            .cached()
            .await
            .map(|auth| auth.download_url.trim_end_matches('/').to_string())
    }

    fn object_url(&self, base: &str, name: &str) -> String {
        format!(
            "{}/file/{}/{}",
            base.trim_end_matches('/'),
            self.bucket_name,
            urlencoding::encode(name)
        )
    }
}

fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let sha1 = hasher.finalize();
    format!("{sha1:x}")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::body_partial_json;
    use wiremock::matchers::header;
    use wiremock::matchers::header_exists;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::matchers::path_regex;

    fn config_for(server: &MockServer) -> StorageConfig {
        StorageConfig {
            api_url: server.uri(),
            key_id: Some("key".to_string()),
            application_key: Some("secret".to_string()),
            bucket_id: "bucket-1".to_string(),
            bucket_name: "files".to_string(),
            ..StorageConfig::default()
        }
    }

    async fn mount_authorize(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/b2api/v2/b2_authorize_account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accountId": "acc-1",
                "authorizationToken": token,
                "apiUrl": server.uri(),
                "downloadUrl": server.uri(),
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn mount_upload_path(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/b2api/v2/b2_get_upload_url"))
            .and(body_partial_json(json!({ "bucketId": "bucket-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "uploadUrl": format!("{}/upload/bucket-1", server.uri()),
                "authorizationToken": "upload-token",
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/upload/bucket-1"))
            .and(header("authorization", "upload-token"))
            .and(header("content-type", "image/png"))
            .and(header(
                "x-bz-content-sha1",
                "a9993e364706816aba3e25717850c26c9cd0d89d",
            ))
            .and(header_exists("x-bz-file-name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fileId": "4_z123",
                "fileName": "1700000000000-cat.png",
                "contentLength": 3,
                "contentType": "image/png",
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn uploads_reuse_one_session() {
        let server = MockServer::start().await;
        mount_authorize(&server, "t1", 1).await;
        mount_upload_path(&server).await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config_for(&server));
        let first = gateway
            .upload(Bytes::from_static(b"abc"), "cat.png", "image/png")
            .await
            .expect("first upload");
        gateway
            .upload(Bytes::from_static(b"abc"), "cat.png", "image/png")
            .await
            .expect("second upload");

        assert_eq!(
            first,
            StoredObject {
                file_id: "4_z123".to_string(),
                canonical_name: "1700000000000-cat.png".to_string(),
                url: format!("{}/file/files/1700000000000-cat.png", server.uri()),
                size: 3,
            }
        );
    }

    #[tokio::test]
    async fn requests_go_through_the_injected_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b2api/v2/b2_authorize_account"))
            .and(header("user-agent", "huddle_test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accountId": "acc-1",
                "authorizationToken": "t1",
                "apiUrl": server.uri(),
                "downloadUrl": server.uri(),
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_upload_path(&server).await;

        let client = reqwest::Client::builder()
            .user_agent("huddle_test/1.0")
            .build()
            .unwrap();
        let gateway = StorageGateway::new(client, &config_for(&server));
        gateway
            .upload(Bytes::from_static(b"abc"), "cat.png", "image/png")
            .await
            .expect("upload with the injected client");
    }

    #[tokio::test]
    async fn expired_token_is_reacquired_once() {
        let server = MockServer::start().await;
        mount_authorize(&server, "t1", 2).await;
        Mock::given(method("POST"))
            .and(path("/b2api/v2/b2_get_upload_url"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired_auth_token"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_upload_path(&server).await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config_for(&server));
        let stored = gateway
            .upload(Bytes::from_static(b"abc"), "cat.png", "image/png")
            .await
            .expect("upload succeeds after re-authorization");
        assert_eq!(stored.file_id, "4_z123");
    }

    #[tokio::test]
    async fn resolve_prefers_authorized_url() {
        let server = MockServer::start().await;
        mount_authorize(&server, "t1", 1).await;
        Mock::given(method("POST"))
            .and(path("/b2api/v2/b2_get_download_authorization"))
            .and(body_partial_json(json!({
                "bucketId": "bucket-1",
                "fileNamePrefix": "cat.png",
                "validDurationInSeconds": 3600,
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "authorizationToken": "dl-1" })),
            )
            .mount(&server)
            .await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config_for(&server));
        let retrieval = gateway.resolve("cat.png").await.expect("resolve");
        assert_eq!(
            retrieval,
            Retrieval::Authorized {
                url: format!("{}/file/files/cat.png?Authorization=dl-1", server.uri())
            }
        );
    }

    #[tokio::test]
    async fn resolve_falls_back_to_public_url() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.key_id = None;
        config.download_url = Some(server.uri());
        Mock::given(method("HEAD"))
            .and(path("/file/files/cat.png"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config);
        let retrieval = gateway.resolve("cat.png").await.expect("resolve");
        assert_eq!(
            retrieval,
            Retrieval::Public {
                url: format!("{}/file/files/cat.png", server.uri())
            }
        );
    }

    #[tokio::test]
    async fn resolve_reports_not_accessible_when_every_tier_fails() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.key_id = None;
        config.download_url = Some(server.uri());
        Mock::given(method("HEAD"))
            .and(path_regex("^/file/files/.*"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config);
        let err = gateway.resolve("gone.png").await.unwrap_err();
        assert!(
            matches!(&err, StorageErr::NotAccessible { filename, .. } if filename == "gone.png"),
            "got {err:?}"
        );

        let response = gateway.serve("gone.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fetch_infers_type_when_storage_reports_octet_stream() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.key_id = None;
        config.download_url = Some(server.uri());
        Mock::given(method("HEAD"))
            .and(path("/file/files/report.pdf"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file/files/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"%PDF-1.7".to_vec(), "application/octet-stream"),
            )
            .mount(&server)
            .await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config);
        let fetched = gateway.fetch("report.pdf").await.expect("fetch");
        assert_eq!(fetched.headers.content_type, "application/pdf");
        assert_eq!(
            fetched.headers.content_disposition,
            "inline; filename=\"report.pdf\""
        );
        assert_eq!(fetched.body.as_ref(), b"%PDF-1.7");
    }

    #[tokio::test]
    async fn delete_surfaces_errors_without_retry() {
        let server = MockServer::start().await;
        mount_authorize(&server, "t1", 1).await;
        Mock::given(method("POST"))
            .and(path("/b2api/v2/b2_delete_file_version"))
            .and(body_partial_json(json!({ "fileName": "cat.png", "fileId": "4_z123" })))
            .respond_with(ResponseTemplate::new(400).set_body_string("file_not_present"))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = StorageGateway::new(reqwest::Client::new(), &config_for(&server));
        let err = gateway.delete("4_z123", "cat.png").await.unwrap_err();
        assert!(
            matches!(err, StorageErr::UnexpectedStatus(StatusCode::BAD_REQUEST, ref body) if body == "file_not_present")
        );
    }

    #[test]
    fn sha1_matches_known_digest() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
