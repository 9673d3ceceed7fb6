use crate::application::view::{
    DashboardView, DayView, MonthView, Notice, NoticeKind, TaskActionKind,
};
use crate::domain::calendar_grid::DAYS_PER_WEEK;
use crate::domain::models::{format_long_date, Achievement, GamificationSummary, ValidationErrors};
use std::io::Write;

const WEEKDAY_HEADER: &str = "  Su  Mo  Tu  We  Th  Fr  Sa";
const PROGRESS_BAR_WIDTH: usize = 20;

/// Plain-text rendering of the dashboard onto any writer.
pub struct TerminalView<W: Write> {
    out: W,
    show_grid: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_grid: true,
        }
    }

    /// Suppresses the month grid; used by one-shot commands.
    pub fn without_grid(mut self) -> Self {
        self.show_grid = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(error) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            log::debug!("terminal write failed: {error}");
        }
    }
}

impl<W: Write> DashboardView for TerminalView<W> {
    fn render_month(&mut self, month: &MonthView) {
        if !self.show_grid {
            return;
        }

        let mut text = format!("{:^28}\n{WEEKDAY_HEADER}\n", month.title);
        for week in month.cells.chunks(DAYS_PER_WEEK) {
            for cell in week {
                if cell.is_current_month() {
                    let marker = if cell.has_tasks() { '*' } else { ' ' };
                    text.push_str(&format!(" {:>2}{marker}", cell.day_number));
                } else {
                    text.push_str(&format!("({:>2})", cell.day_number));
                }
            }
            text.push('\n');
        }

        let busy_days = month
            .cells
            .iter()
            .filter(|cell| cell.is_current_month() && cell.has_tasks())
            .collect::<Vec<_>>();
        if !busy_days.is_empty() {
            text.push_str("\n* = tasks due\n");
            for cell in busy_days {
                text.push_str(&format!("  {}\n", cell.describe()));
            }
        }
        self.emit(&text);
    }

    fn render_day(&mut self, day: &DayView) {
        let mut text = format!("\nTasks for {}\n", format_long_date(day.date));
        if day.entries.is_empty() {
            text.push_str("  No tasks due.\n");
        }
        for entry in &day.entries {
            let check = if entry.task.is_completed() { 'x' } else { ' ' };
            let actions = entry
                .actions
                .iter()
                .map(|action| match action {
                    TaskActionKind::Complete => "complete",
                    TaskActionKind::Delete => "delete",
                })
                .collect::<Vec<_>>()
                .join(", ");
            text.push_str(&format!(
                "  [{check}] {}  {}  ({})  actions: {actions}\n",
                entry.task.id, entry.task.title, entry.task.status
            ));
            if let Some(description) = entry.task.description.as_deref() {
                text.push_str(&format!("        {description}\n"));
            }
        }
        self.emit(&text);
    }

    fn close_day(&mut self) {}

    fn show_notice(&mut self, notice: &Notice) {
        let prefix = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        self.emit(&format!("{prefix}: {}\n", notice.message));
    }

    fn show_field_errors(&mut self, errors: &ValidationErrors) {
        let mut text = String::from("Please fix the following:\n");
        if let Some(message) = errors.title.as_deref() {
            text.push_str(&format!("  title: {message}\n"));
        }
        if let Some(message) = errors.due_date.as_deref() {
            text.push_str(&format!("  due date: {message}\n"));
        }
        self.emit(&text);
    }

    fn render_profile(&mut self, summary: &GamificationSummary, achievement: Achievement) {
        let percent = summary.progress_percent();
        let filled = usize::from(percent) * PROGRESS_BAR_WIDTH / 100;
        let text = format!(
            "Level {}  ({} XP, {} XP to next level)\n[{}{}] {percent}%\nStreak: {} days  |  Days logged: {}\nBadge: {achievement}\n",
            summary.level,
            summary.xp,
            summary.xp_for_next_level,
            "#".repeat(filled),
            ".".repeat(PROGRESS_BAR_WIDTH - filled),
            summary.streak,
            summary.total_days_logged,
        );
        self.emit(&text);
    }

    fn show_motivation(&mut self, message: &str) {
        self.emit(&format!("> {message}\n"));
    }
}
