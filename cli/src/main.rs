use clap::ArgAction;
use clap::Parser;
use huddle_cli::DeleteCommand;
use huddle_cli::FetchCommand;
use huddle_cli::SendCommand;
use huddle_cli::init_logging;
use huddle_tui::Cli as TuiCli;

/// Huddle CLI
///
/// If no subcommand is specified, options will be forwarded to the interactive composer.
#[derive(Debug, Parser)]
#[clap(
    author,
    version,
    // If a sub‑command is given, ignore requirements of the default args.
    subcommand_negates_reqs = true
)]
struct MultitoolCli {
    #[clap(flatten)]
    interactive: TuiCli,

    /// Log more to stderr (-v info, -vv debug). Subcommands only.
    #[arg(long = "verbose", short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Post one message, uploading any attached files first.
    #[clap(visible_alias = "s")]
    Send(SendCommand),

    /// Resolve where a stored object can be downloaded, or download it.
    Fetch(FetchCommand),

    /// Delete a stored object.
    Delete(DeleteCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MultitoolCli::parse();

    match cli.subcommand {
        None => {
            huddle_tui::run_main(cli.interactive).await?;
        }
        Some(Subcommand::Send(send_cli)) => {
            init_logging(cli.verbose);
            huddle_cli::send::run_send(send_cli).await?;
        }
        Some(Subcommand::Fetch(fetch_cli)) => {
            init_logging(cli.verbose);
            huddle_cli::object::run_fetch(fetch_cli).await?;
        }
        Some(Subcommand::Delete(delete_cli)) => {
            init_logging(cli.verbose);
            huddle_cli::object::run_delete(delete_cli).await?;
        }
    }

    Ok(())
}
