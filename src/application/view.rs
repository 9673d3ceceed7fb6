use crate::domain::calendar_grid::{DayCell, MonthCursor};
use crate::domain::models::{Achievement, GamificationSummary, Task, ValidationErrors};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthView {
    pub title: String,
    pub cursor: MonthCursor,
    pub cells: Vec<DayCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskActionKind {
    Complete,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    pub task: Task,
    pub actions: Vec<TaskActionKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub date: NaiveDate,
    pub entries: Vec<TaskEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Rendering side of the dashboard. Implementations only display what they
/// are given; all state lives in the dashboard.
pub trait DashboardView {
    fn render_month(&mut self, month: &MonthView);

    fn render_day(&mut self, day: &DayView);

    fn close_day(&mut self);

    fn show_notice(&mut self, notice: &Notice);

    fn show_field_errors(&mut self, errors: &ValidationErrors);

    fn render_profile(&mut self, summary: &GamificationSummary, achievement: Achievement);

    fn show_motivation(&mut self, message: &str);
}
