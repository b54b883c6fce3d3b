use serde::Deserialize;

pub const DEFAULT_STORAGE_API_URL: &str = "https://api.backblazeb2.com";

/// Lifetime of a scoped download authorization when none is configured.
pub const DEFAULT_DOWNLOAD_AUTHORIZATION_TTL_SECS: u64 = 3600;

/// Connection settings for the object-storage service, read from the
/// `[storage]` table of `config.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub key_id: Option<String>,

    #[serde(default)]
    pub application_key: Option<String>,

    #[serde(default)]
    pub bucket_id: String,

    #[serde(default)]
    pub bucket_name: String,

    /// Public download host (e.g. `https://f000.backblazeb2.com`). Used for
    /// direct URLs when no session can be established.
    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default = "default_download_authorization_ttl_secs")]
    pub download_authorization_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            key_id: None,
            application_key: None,
            bucket_id: String::new(),
            bucket_name: String::new(),
            download_url: None,
            download_authorization_ttl_secs: DEFAULT_DOWNLOAD_AUTHORIZATION_TTL_SECS,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_STORAGE_API_URL.to_string()
}

fn default_download_authorization_ttl_secs() -> u64 {
    DEFAULT_DOWNLOAD_AUTHORIZATION_TTL_SECS
}
