use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Channel messages are posted to.
    #[arg(long, short = 'c', default_value = "general")]
    pub channel: String,

    /// Name to post as. Defaults to the configured user name.
    #[arg(long = "user-name", short = 'u')]
    pub user_name: Option<String>,

    /// Workspace members offered as @mention suggestions.
    #[arg(long = "member", short = 'm', value_name = "NAME", value_delimiter = ',', num_args = 1..)]
    pub members: Vec<String>,

    /// File(s) to attach to the first message.
    #[arg(long = "file", short = 'f', value_name = "FILE", value_delimiter = ',', num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Override the send-message endpoint from config.toml.
    #[arg(long = "send-endpoint")]
    pub send_endpoint: Option<String>,

    /// Override the upload endpoint from config.toml.
    #[arg(long = "upload-endpoint")]
    pub upload_endpoint: Option<String>,

    /// Id of the message being replied to.
    #[arg(long = "reply-to", requires_all = ["reply_content", "reply_user"])]
    pub reply_to: Option<String>,

    /// Content of the message being replied to.
    #[arg(long = "reply-content", requires = "reply_to")]
    pub reply_content: Option<String>,

    /// Author of the message being replied to.
    #[arg(long = "reply-user", requires = "reply_to")]
    pub reply_user: Option<String>,
}
