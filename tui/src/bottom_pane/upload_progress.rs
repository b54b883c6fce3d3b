//! Per-file upload rows shown above the composer while a submit runs.

use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use huddle_protocol::UploadStatus;
use huddle_protocol::UploadTask;
use huddle_protocol::human_size;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;

pub(crate) struct UploadProgressView {
    tasks: Vec<UploadTask>,
    /// When each task (by index) was first seen completed.
    completed_at: HashMap<usize, Instant>,
    /// How long a completed row lingers before it is pruned.
    display: Duration,
}

impl UploadProgressView {
    pub(crate) fn new(display: Duration) -> Self {
        Self {
            tasks: Vec::new(),
            completed_at: HashMap::new(),
            display,
        }
    }

    /// Replace the rows with a fresh snapshot. An all-pending snapshot marks
    /// the start of a new submit and drops leftovers from the previous one.
    pub(crate) fn update(&mut self, tasks: Vec<UploadTask>, now: Instant) {
        if tasks.iter().all(|t| t.status == UploadStatus::Pending) {
            self.completed_at.clear();
        }
        for task in &tasks {
            if task.status == UploadStatus::Completed {
                self.completed_at.entry(task.index).or_insert(now);
            }
        }
        self.tasks = tasks;
        self.prune(now);
    }

    /// Drop completed rows that have been shown long enough. Returns whether
    /// anything was removed.
    pub(crate) fn prune(&mut self, now: Instant) -> bool {
        let before = self.tasks.len();
        let completed_at = &self.completed_at;
        let display = self.display;
        self.tasks.retain(|task| match completed_at.get(&task.index) {
            Some(at) => now.saturating_duration_since(*at) < display,
            None => true,
        });
        self.tasks.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn desired_height(&self) -> u16 {
        self.tasks.len() as u16
    }
}

fn task_line(task: &UploadTask) -> Line<'static> {
    let (icon, style) = match task.status {
        UploadStatus::Pending => ("·", Style::default().add_modifier(Modifier::DIM)),
        UploadStatus::Uploading => ("↑", Style::default().fg(Color::Cyan)),
        UploadStatus::Completed => ("✓", Style::default().fg(Color::Green)),
        UploadStatus::Error => ("✗", Style::default().fg(Color::Red)),
    };
    let mut spans = vec![
        Span::styled(format!("{icon} "), style),
        Span::raw(task.file_name.clone()),
        format!(" ({})", human_size(task.size)).dim(),
    ];
    match task.status {
        UploadStatus::Error => {
            let reason = task.error.as_deref().unwrap_or("upload failed");
            spans.push(Span::styled(format!("  {reason}"), style));
        }
        status => spans.push(Span::styled(format!("  {status} {}%", task.progress), style)),
    }
    Line::from(spans)
}

impl WidgetRef for UploadProgressView {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self.tasks.iter().map(task_line).collect();
        Paragraph::new(lines).render_ref(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(index: usize, status: UploadStatus) -> UploadTask {
        let mut task = UploadTask::new(index, format!("f{index}.png"), 2048, "image/png");
        if status != UploadStatus::Pending {
            task.start();
        }
        match status {
            UploadStatus::Completed => {
                task.complete();
            }
            UploadStatus::Error => {
                task.fail("HTTP 500");
            }
            _ => {}
        }
        task
    }

    #[test]
    fn completed_rows_linger_then_disappear() {
        let start = Instant::now();
        let mut view = UploadProgressView::new(Duration::from_millis(1500));
        view.update(
            vec![
                task(0, UploadStatus::Completed),
                task(1, UploadStatus::Error),
            ],
            start,
        );
        assert_eq!(view.desired_height(), 2);

        assert!(!view.prune(start + Duration::from_millis(1000)));
        assert!(view.prune(start + Duration::from_millis(1500)));
        let remaining: Vec<usize> = view.tasks.iter().map(|t| t.index).collect();
        assert_eq!(remaining, vec![1]);
    }

    #[test]
    fn completion_time_is_first_sighting() {
        let start = Instant::now();
        let mut view = UploadProgressView::new(Duration::from_millis(1500));
        view.update(
            vec![
                task(0, UploadStatus::Completed),
                task(1, UploadStatus::Uploading),
            ],
            start,
        );
        view.update(
            vec![
                task(0, UploadStatus::Completed),
                task(1, UploadStatus::Completed),
            ],
            start + Duration::from_millis(1000),
        );
        view.prune(start + Duration::from_millis(1600));
        let remaining: Vec<usize> = view.tasks.iter().map(|t| t.index).collect();
        assert_eq!(remaining, vec![1]);
    }

    #[test]
    fn new_submit_replaces_old_rows() {
        let start = Instant::now();
        let mut view = UploadProgressView::new(Duration::from_millis(1500));
        view.update(vec![task(0, UploadStatus::Error)], start);
        view.update(
            vec![task(0, UploadStatus::Pending), task(1, UploadStatus::Pending)],
            start,
        );
        assert_eq!(view.desired_height(), 2);
        assert!(view.tasks.iter().all(|t| t.error.is_none()));
    }

    #[test]
    fn renders_error_reason() {
        let mut view = UploadProgressView::new(Duration::from_millis(1500));
        view.update(vec![task(3, UploadStatus::Error)], Instant::now());
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        view.render_ref(area, &mut buf);
        let row: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(row.contains("f3.png"), "{row}");
        assert!(row.contains("HTTP 500"), "{row}");
    }
}
