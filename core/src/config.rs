use crate::config_types::UploadLimits;
use crate::flags::HUDDLE_STORAGE_APPLICATION_KEY;
use crate::flags::HUDDLE_STORAGE_KEY_ID;
use dirs::home_dir;
use huddle_storage::StorageConfig;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name messages are sent under.
    pub user_name: String,

    /// URL of the message-send interface.
    pub send_endpoint: Option<String>,

    /// URL of the upload interface. When unset, files go straight to
    /// object storage.
    pub upload_endpoint: Option<String>,

    /// Base URL of the download interface; uploaded files are addressed as
    /// `{download_endpoint}?file={canonical_name}` when set.
    pub download_endpoint: Option<String>,

    pub upload: UploadLimits,

    pub storage: StorageConfig,

    /// Directory containing all Huddle state (defaults to `~/.huddle` but can
    /// be overridden by the `HUDDLE_HOME` environment variable).
    pub huddle_home: PathBuf,
}

/// Base config deserialized from ~/.huddle/config.toml.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ConfigToml {
    pub user_name: Option<String>,
    pub send_endpoint: Option<String>,
    pub upload_endpoint: Option<String>,
    pub download_endpoint: Option<String>,

    #[serde(default)]
    pub upload: UploadLimits,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub user_name: Option<String>,
    pub send_endpoint: Option<String>,
    pub upload_endpoint: Option<String>,
}

impl Config {
    /// Load configuration, optionally applying overrides (CLI flags). Merges
    /// ~/.huddle/config.toml, environment fallbacks for storage credentials
    /// and any values provided in `overrides` (highest precedence).
    pub fn load_with_overrides(overrides: ConfigOverrides) -> std::io::Result<Self> {
        let huddle_home = find_huddle_home()?;
        let cfg = load_config_as_toml(&huddle_home)?;
        tracing::debug!("Config parsed from config.toml: {cfg:?}");
        Ok(Self::load_from_base_config_with_overrides(
            cfg,
            overrides,
            huddle_home,
        ))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        huddle_home: PathBuf,
    ) -> Self {
        // Destructure ConfigOverrides fully to ensure all overrides are applied.
        let ConfigOverrides {
            user_name,
            send_endpoint,
            upload_endpoint,
        } = overrides;

        let mut storage = cfg.storage;
        if storage.key_id.is_none() {
            storage.key_id = (*HUDDLE_STORAGE_KEY_ID).map(str::to_string);
        }
        if storage.application_key.is_none() {
            storage.application_key = (*HUDDLE_STORAGE_APPLICATION_KEY).map(str::to_string);
        }

        Self {
            user_name: user_name
                .or(cfg.user_name)
                .unwrap_or_else(whoami::username),
            send_endpoint: send_endpoint.or(cfg.send_endpoint),
            upload_endpoint: upload_endpoint.or(cfg.upload_endpoint),
            download_endpoint: cfg.download_endpoint,
            upload: cfg.upload,
            storage,
            huddle_home,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.huddle_home.join("log")
    }
}

/// Returns the path to the Huddle configuration directory, which can be
/// specified by the `HUDDLE_HOME` environment variable. If not set, defaults
/// to `~/.huddle`.
///
/// - If `HUDDLE_HOME` is set, the value will be canonicalized and this
///   function will Err if the path does not exist.
/// - If `HUDDLE_HOME` is not set, this function does not verify that the
///   directory exists.
pub fn find_huddle_home() -> std::io::Result<PathBuf> {
    if let Ok(val) = std::env::var("HUDDLE_HOME")
        && !val.is_empty()
    {
        return PathBuf::from(val).canonicalize();
    }

    let mut p = home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".huddle");
    Ok(p)
}

/// Read `config.toml` from `huddle_home`. A missing file yields the default
/// (empty) config.
pub fn load_config_as_toml(huddle_home: &Path) -> std::io::Result<ConfigToml> {
    let config_toml_path = huddle_home.join("config.toml");
    match std::fs::read_to_string(&config_toml_path) {
        Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|e| {
            tracing::error!("Failed to parse config.toml: {e}");
            std::io::Error::new(std::io::ErrorKind::InvalidData, e)
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("config.toml not found, using defaults");
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read config.toml: {e}");
            Err(e)
        }
    }
}
