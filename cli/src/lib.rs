pub mod object;
pub mod send;

use std::path::PathBuf;

use clap::Parser;
use huddle_core::config::Config;
use huddle_core::config::ConfigOverrides;
use tracing_subscriber::EnvFilter;

/// Overrides for values normally read from `~/.huddle/config.toml`.
#[derive(Debug, Default, Parser)]
pub struct ConfigArgs {
    /// Name to post as.
    #[arg(long = "user-name", short = 'u')]
    pub user_name: Option<String>,

    /// Send-message endpoint.
    #[arg(long = "send-endpoint")]
    pub send_endpoint: Option<String>,

    /// Multipart upload endpoint. Without one, files go straight to object
    /// storage.
    #[arg(long = "upload-endpoint")]
    pub upload_endpoint: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> std::io::Result<Config> {
        Config::load_with_overrides(ConfigOverrides {
            user_name: self.user_name.clone(),
            send_endpoint: self.send_endpoint.clone(),
            upload_endpoint: self.upload_endpoint.clone(),
        })
    }
}

#[derive(Debug, Parser)]
pub struct SendCommand {
    /// Channel to post to.
    #[arg(long, short = 'c')]
    pub channel: String,

    /// File(s) to attach.
    #[arg(long = "file", short = 'f', value_name = "FILE", action = clap::ArgAction::Append)]
    pub files: Vec<PathBuf>,

    /// Id of the message being replied to.
    #[arg(long = "reply-to", requires_all = ["reply_content", "reply_user"])]
    pub reply_to: Option<String>,

    /// Content of the message being replied to.
    #[arg(long = "reply-content", requires = "reply_to")]
    pub reply_content: Option<String>,

    /// Author of the message being replied to.
    #[arg(long = "reply-user", requires = "reply_to")]
    pub reply_user: Option<String>,

    /// Print the request that was sent as JSON instead of just the message id.
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,

    #[clap(flatten)]
    pub config: ConfigArgs,

    /// Message text. May be omitted when files are attached.
    #[arg(trailing_var_arg = true)]
    pub text: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct FetchCommand {
    /// Object name in storage.
    pub name: String,

    /// Download the object here instead of printing where it can be fetched.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct DeleteCommand {
    /// Storage file id returned by the upload.
    pub file_id: String,

    /// Object name in storage.
    pub name: String,
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
