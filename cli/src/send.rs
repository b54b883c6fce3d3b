use anyhow::Context;
use huddle_composer::ComposerEvent;
use huddle_composer::ComposerEventSender;
use huddle_composer::ComposerOrchestrator;
use huddle_composer::Draft;
use huddle_composer::NoticeLevel;
use huddle_composer::SubmitOutcome;
use huddle_core::ConfiguredUploader;
use huddle_core::HttpMessageSender;
use huddle_core::PendingFile;
use huddle_protocol::Delta;
use huddle_protocol::ReplyContext;
use huddle_protocol::UploadStatus;
use tokio::sync::mpsc::unbounded_channel;
use tracing::info;

use crate::SendCommand;

pub async fn run_send(cmd: SendCommand) -> anyhow::Result<()> {
    let config = cmd.config.load()?;

    let mut files = Vec::with_capacity(cmd.files.len());
    for path in &cmd.files {
        let file = PendingFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    let text = cmd.text.join(" ");
    let body = Delta::from_text(text).to_json()?;
    let reply = match (cmd.reply_to, cmd.reply_content, cmd.reply_user) {
        (Some(message_id), Some(content), Some(user_name)) => Some(ReplyContext {
            message_id,
            content,
            user_name,
        }),
        _ => None,
    };
    let draft = Draft {
        channel_id: cmd.channel,
        body,
        files,
        reply,
    };

    let (tx, mut rx) = unbounded_channel::<ComposerEvent>();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            report(event);
        }
    });

    let orchestrator = ComposerOrchestrator::new(
        ConfiguredUploader::from_config(&config),
        HttpMessageSender::from_config(&config)?,
        config.upload.clone(),
        config.user_name.clone(),
        ComposerEventSender::new(tx),
    );
    let outcome = orchestrator.submit(&draft).await;
    // Dropping the orchestrator closes the channel so the reporter drains
    // and exits.
    drop(orchestrator);
    let _ = reporter.await;

    match outcome? {
        SubmitOutcome::Sent(sent) => {
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&sent.request)?);
            } else {
                println!("{}", sent.message_id);
            }
            Ok(())
        }
        SubmitOutcome::Skipped => {
            anyhow::bail!("nothing to send: give message text or at least one --file")
        }
        SubmitOutcome::NothingSent { .. } => {
            anyhow::bail!("no file could be uploaded; nothing was sent")
        }
    }
}

fn report(event: ComposerEvent) {
    match event {
        ComposerEvent::Notice(notice) => {
            let prefix = match notice.level {
                NoticeLevel::Warning => "warning: ",
                NoticeLevel::Error => "error: ",
            };
            eprintln!("{prefix}{}", notice.message);
        }
        ComposerEvent::UploadProgress(tasks) => {
            for task in tasks.iter().filter(|t| t.status != UploadStatus::Pending) {
                info!(
                    file = %task.file_name,
                    status = %task.status,
                    progress = task.progress,
                    error = task.error.as_deref().unwrap_or_default(),
                    "upload"
                );
            }
        }
    }
}
