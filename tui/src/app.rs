use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEventKind;
use huddle_composer::ComposerEvent;
use huddle_composer::ComposerEventSender;
use huddle_composer::ComposerOrchestrator;
use huddle_composer::Notice;
use huddle_composer::NoticeLevel;
use huddle_composer::SubmitOutcome;
use huddle_core::ConfiguredUploader;
use huddle_core::HttpMessageSender;
use huddle_core::PendingFile;
use huddle_core::config::Config;
use huddle_protocol::ActiveUser;
use huddle_protocol::ReplyContext;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Widget;
use tokio::select;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::info;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::bottom_pane::BottomPane;
use crate::bottom_pane::BottomPaneParams;
use crate::bottom_pane::InputResult;
use crate::tui::Tui;

type Orchestrator = ComposerOrchestrator<ConfiguredUploader, HttpMessageSender>;

/// How often expired notices and finished upload rows are swept.
const TICK_INTERVAL: Duration = Duration::from_millis(250);
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Startup state taken from the command line.
pub(crate) struct AppParams {
    pub(crate) channel_id: String,
    pub(crate) active_users: Vec<ActiveUser>,
    pub(crate) files: Vec<PathBuf>,
    pub(crate) reply: Option<ReplyContext>,
}

pub(crate) struct App {
    app_event_tx: AppEventSender,
    bottom_pane: BottomPane,
    orchestrator: Arc<Orchestrator>,
    user_name: String,

    /// Messages sent during this session.
    transcript: Vec<Line<'static>>,
    notices: Vec<(Notice, Instant)>,

    exit: bool,
}

impl App {
    pub async fn run(terminal: &mut Tui, config: Config, params: AppParams) -> Result<()> {
        let (app_event_tx, mut app_event_rx) = unbounded_channel();
        let app_event_tx = AppEventSender::new(app_event_tx);

        let (composer_tx, mut composer_rx) = unbounded_channel::<ComposerEvent>();

        let orchestrator = ComposerOrchestrator::new(
            ConfiguredUploader::from_config(&config),
            HttpMessageSender::from_config(&config)?,
            config.upload.clone(),
            config.user_name.clone(),
            ComposerEventSender::new(composer_tx),
        );

        let mut bottom_pane = BottomPane::new(BottomPaneParams {
            channel_id: params.channel_id,
            active_users: params.active_users,
            completed_display: Duration::from_millis(config.upload.completed_display_ms),
        });
        bottom_pane.set_reply(params.reply);

        let mut app = Self {
            app_event_tx,
            bottom_pane,
            orchestrator: Arc::new(orchestrator),
            user_name: config.user_name,
            transcript: Vec::new(),
            notices: Vec::new(),
            exit: false,
        };
        for path in params.files {
            app.load_file(path);
        }

        let mut terminal_events = EventStream::new();
        let mut tick = tokio::time::interval(TICK_INTERVAL);

        while !app.exit {
            terminal.draw(|frame| app.render(frame))?;
            select! {
                Some(event) = app_event_rx.recv() => {
                    app.handle_event(event);
                }
                Some(event) = composer_rx.recv() => {
                    app.handle_event(AppEvent::Composer(event));
                }
                Some(event) = terminal_events.next() => {
                    app.handle_terminal_event(event?);
                }
                _ = tick.tick() => {
                    app.on_tick(Instant::now());
                }
            }
        }
        terminal.clear()?;
        Ok(())
    }

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::Paste(pasted) => {
                // Many terminals convert newlines to \r when pasting.
                let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
                self.bottom_pane.handle_paste(pasted);
            }
            Event::Mouse(mouse) => {
                if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                    self.bottom_pane.handle_click(mouse.column, mouse.row);
                }
            }
            _ => {}
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        match key_event {
            KeyEvent {
                code: KeyCode::Char('c' | 'd'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.app_event_tx.send(AppEvent::ExitRequest);
            }
            _ => match self.bottom_pane.handle_key_event(key_event).0 {
                InputResult::Submitted(draft) => {
                    self.bottom_pane.set_submitting(true);
                    let orchestrator = self.orchestrator.clone();
                    let app_event_tx = self.app_event_tx.clone();
                    tokio::spawn(async move {
                        let result = orchestrator
                            .submit(&draft)
                            .await
                            .map_err(|e| e.to_string());
                        app_event_tx.send(AppEvent::SubmitFinished(result));
                    });
                }
                InputResult::Attach(path) => self.load_file(path),
                InputResult::None => {}
            },
        }
    }

    fn load_file(&self, path: PathBuf) {
        let app_event_tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let result = PendingFile::from_path(&path)
                .await
                .map_err(|e| format!("{}: {e}", path.display()));
            app_event_tx.send(AppEvent::FileLoaded(result));
        });
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Composer(ComposerEvent::UploadProgress(tasks)) => {
                self.bottom_pane.update_upload_progress(tasks);
            }
            AppEvent::Composer(ComposerEvent::Notice(notice)) => self.push_notice(notice),
            AppEvent::SubmitFinished(result) => {
                self.bottom_pane.set_submitting(false);
                match result {
                    Ok(outcome) => self.on_submit_outcome(outcome),
                    // The orchestrator has already raised a notice.
                    Err(e) => debug!("submit failed: {e}"),
                }
            }
            AppEvent::FileLoaded(Ok(file)) => {
                info!(name = %file.name, size = file.size(), "file attached");
                self.bottom_pane.attach(file);
            }
            AppEvent::FileLoaded(Err(e)) => {
                self.push_notice(Notice::error(format!("Could not attach {e}")));
            }
            AppEvent::ExitRequest => {
                self.exit = true;
            }
        }
    }

    fn on_submit_outcome(&mut self, outcome: SubmitOutcome) {
        self.bottom_pane.apply_outcome(&outcome);
        if let SubmitOutcome::Sent(sent) = outcome {
            let request = &sent.request;
            self.transcript.push(Line::from(vec![
                Span::from(format!("{}: ", self.user_name)).bold(),
                Span::from(request.content.clone()),
            ]));
            if let Some(rich) = &request.rich_content {
                for attachment in rich.attachments() {
                    let line = format!("  📎 {} {}", attachment.name, attachment.url);
                    self.transcript.push(Line::from(line).dim());
                }
            }
        }
    }

    fn push_notice(&mut self, notice: Notice) {
        debug!(?notice.level, "{}", notice.message);
        self.notices.push((notice, Instant::now()));
    }

    fn on_tick(&mut self, now: Instant) {
        self.notices
            .retain(|(_, at)| now.saturating_duration_since(*at) < NOTICE_TTL);
        self.bottom_pane.on_tick(now);
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let pane_height = self.bottom_pane.desired_height(area.width).min(area.height);
        let notice_height = (self.notices.len() as u16).min(area.height - pane_height);
        let [transcript_area, notice_area, pane_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(notice_height),
            Constraint::Length(pane_height),
        ])
        .areas(area);

        let skip = self
            .transcript
            .len()
            .saturating_sub(transcript_area.height as usize);
        Paragraph::new(self.transcript[skip..].to_vec())
            .render(transcript_area, frame.buffer_mut());

        let notices: Vec<Line> = self
            .notices
            .iter()
            .map(|(notice, _)| {
                let color = match notice.level {
                    NoticeLevel::Warning => Color::Yellow,
                    NoticeLevel::Error => Color::Red,
                };
                Line::from(notice.message.clone()).style(Style::default().fg(color))
            })
            .collect();
        Paragraph::new(notices).render(notice_area, frame.buffer_mut());

        frame.render_widget_ref(&self.bottom_pane, pane_area);
        if let Some((x, y)) = self.bottom_pane.cursor_pos(pane_area) {
            frame.set_cursor_position((x, y));
        }
    }
}
