use clap::Parser;
use huddle_tui::Cli;
use huddle_tui::run_main;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    run_main(cli).await?;
    Ok(())
}
