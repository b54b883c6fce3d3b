use anyhow::Context;
use huddle_core::config::Config;
use huddle_core::config::ConfigOverrides;
use huddle_core::user_agent::build_http_client;
use huddle_storage::ObjectResponse;
use huddle_storage::StorageGateway;

use crate::DeleteCommand;
use crate::FetchCommand;

fn gateway() -> anyhow::Result<StorageGateway> {
    let config = Config::load_with_overrides(ConfigOverrides::default())?;
    Ok(StorageGateway::new(build_http_client(), &config.storage))
}

pub async fn run_fetch(cmd: FetchCommand) -> anyhow::Result<()> {
    let gateway = gateway()?;

    if let Some(output) = cmd.output {
        let fetched = gateway.fetch(&cmd.name).await?;
        tokio::fs::write(&output, &fetched.body)
            .await
            .with_context(|| format!("failed to write {}", output.display()))?;
        eprintln!(
            "{} -> {} ({} bytes, {})",
            fetched.name,
            output.display(),
            fetched.body.len(),
            fetched.headers.content_type
        );
        return Ok(());
    }

    match gateway.serve(&cmd.name).await {
        ObjectResponse::Redirect { location, headers } => {
            println!("Location: {location}");
            println!("Content-Type: {}", headers.content_type);
            println!("Content-Disposition: {}", headers.content_disposition);
            Ok(())
        }
        ObjectResponse::Error { status, body } => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            anyhow::bail!("{} could not be retrieved ({status})", cmd.name)
        }
    }
}

pub async fn run_delete(cmd: DeleteCommand) -> anyhow::Result<()> {
    gateway()?.delete(&cmd.file_id, &cmd.name).await?;
    println!("deleted {}", cmd.name);
    Ok(())
}
