// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// Anything printed while the alternate screen is up corrupts the display;
// the few places that run before or after it opt out locally via `expect`.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use app::App;
use app::AppParams;
use huddle_core::config::Config;
use huddle_core::config::ConfigOverrides;
use huddle_protocol::ActiveUser;
use huddle_protocol::ReplyContext;
use std::fs::OpenOptions;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod app_event;
mod app_event_sender;
mod bottom_pane;
mod caret;
mod cli;
mod tui;

pub use cli::Cli;

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    let config = {
        // Load configuration and support CLI overrides.
        let overrides = ConfigOverrides {
            user_name: cli.user_name.clone(),
            send_endpoint: cli.send_endpoint.clone(),
            upload_endpoint: cli.upload_endpoint.clone(),
        };
        #[allow(clippy::print_stderr)]
        match Config::load_with_overrides(overrides) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error loading configuration: {err}");
                std::process::exit(1);
            }
        }
    };

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    // Open (or create) your log file, appending to it.
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join("huddle-tui.log"))?;

    // Wrap file in non‑blocking writer.
    let (non_blocking, _guard) = non_blocking(log_file);

    // use RUST_LOG env var, default to info for huddle crates.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "huddle_core=info,huddle_composer=info,huddle_storage=info,huddle_tui=info",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    try_run_ratatui_app(cli, config).await;
    Ok(())
}

#[expect(
    clippy::print_stderr,
    reason = "Resort to stderr in exceptional situations."
)]
async fn try_run_ratatui_app(cli: Cli, config: Config) {
    if let Err(report) = run_ratatui_app(cli, config).await {
        eprintln!("Error: {report:?}");
    }
}

async fn run_ratatui_app(cli: Cli, config: Config) -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Route panic reports through tracing; the default hook writes to
    // stderr, which would corrupt the alternate screen.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
    }));
    let mut terminal = tui::init()?;
    terminal.clear()?;

    let Cli {
        channel,
        members,
        files,
        reply_to,
        reply_content,
        reply_user,
        ..
    } = cli;
    let reply = match (reply_to, reply_content, reply_user) {
        (Some(message_id), Some(content), Some(user_name)) => Some(ReplyContext {
            message_id,
            content,
            user_name,
        }),
        _ => None,
    };
    let params = AppParams {
        channel_id: channel,
        active_users: members.into_iter().map(ActiveUser::new).collect(),
        files,
        reply,
    };

    let app_result = App::run(&mut terminal, config, params).await;

    restore();
    app_result
}

#[expect(
    clippy::print_stderr,
    reason = "TUI should no longer be displayed, so we can write to stderr."
)]
fn restore() {
    if let Err(err) = tui::restore() {
        eprintln!(
            "failed to restore terminal. Run `reset` or restart your terminal to recover: {err}"
        );
    }
}
