use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use tracing::info;

use crate::config_types::StorageConfig;
use crate::error::Result;
use crate::error::StorageErr;
use crate::error::check_status;

/// Account-level authorization returned by `b2_authorize_account`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    pub account_id: String,
    pub authorization_token: String,
    pub api_url: String,
    pub download_url: String,
}

/// Cached storage session shared by every call a [`crate::StorageGateway`]
/// makes.
///
/// The first caller to need a token performs the authorization while holding
/// the lock, so concurrent uploads never race to authorize twice. Callers
/// that observe an authorization error call [`StorageSession::invalidate`];
/// the next call to [`StorageSession::authorization`] re-acquires.
pub struct StorageSession {
    client: reqwest::Client,
    api_url: String,
    key_id: Option<String>,
    application_key: Option<String>,
    cached: Mutex<Option<Arc<Authorization>>>,
}

impl StorageSession {
    pub fn new(client: reqwest::Client, config: &StorageConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            application_key: config.application_key.clone(),
            cached: Mutex::new(None),
        }
    }

    /// Return the cached authorization, establishing one first if needed.
    pub async fn authorization(&self) -> Result<Arc<Authorization>> {
        let mut guard = self.cached.lock().await;
        if let Some(auth) = guard.as_ref() {
            return Ok(Arc::clone(auth));
        }
        let auth = Arc::new(self.authorize().await?);
        info!(account_id = %auth.account_id, "storage session established");
        *guard = Some(Arc::clone(&auth));
        Ok(auth)
    }

    /// Peek at the current authorization without establishing one.
    pub async fn cached(&self) -> Option<Arc<Authorization>> {
        self.cached.lock().await.clone()
    }

    pub async fn invalidate(&self) {
        let mut guard = self.cached.lock().await;
        if guard.take().is_some() {
            info!("storage session invalidated");
        }
    }

    async fn authorize(&self) -> Result<Authorization> {
        let key_id = self
            .key_id
            .as_deref()
            .ok_or(StorageErr::MissingCredentials("key_id"))?;
        let application_key = self
            .application_key
            .as_deref()
            .ok_or(StorageErr::MissingCredentials("application_key"))?;

        let url = format!("{}/b2api/v2/b2_authorize_account", self.api_url);
        debug!(url, "GET");
        let resp = self
            .client
            .get(&url)
            .basic_auth(key_id, Some(application_key))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json::<Authorization>().await?)
    }
}
