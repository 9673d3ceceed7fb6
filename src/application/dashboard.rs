use crate::application::view::{
    DashboardView, DayView, MonthView, Notice, TaskActionKind, TaskEntry,
};
use crate::domain::calendar_grid::{generate_with_index, MonthCursor};
use crate::domain::models::{GamificationSummary, NewTaskForm, Task, TaskId, TaskStatus};
use crate::domain::task_index::TaskIndex;
use crate::infrastructure::command_log::CommandLog;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::TaskStoreClient;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

type TodayProvider = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

const LOAD_FAILED: &str = "Failed to load tasks. Please refresh the page.";
const CREATE_FAILED: &str = "Failed to create task. Please try again.";
const UPDATE_FAILED: &str = "Failed to update task. Please try again.";
const DELETE_FAILED: &str = "Failed to delete task. Please try again.";
const PROFILE_FAILED: &str = "Failed to load your progress. Please refresh the page.";
const TASK_CREATED: &str = "Task created successfully!";
const TASK_UPDATED: &str = "Task updated successfully!";
const TASK_DELETED: &str = "Task deleted successfully!";

/// Input emitted by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    Reload,
    NavigateMonth(i32),
    DaySelected(NaiveDate),
    OpenNewTask,
    CloseDay,
    SubmitTask(NewTaskForm),
    TaskAction(TaskId, TaskActionKind),
    RefreshProfile,
}

/// Owns the task index and the displayed month, and keeps both consistent
/// with the remote store.
///
/// Every remote operation follows the same sequence: await the call, mutate
/// the index only on success, then re-render. Failures leave the index as it
/// was and are reported to the view as a notice.
pub struct CalendarDashboard<C, V>
where
    C: TaskStoreClient,
    V: DashboardView,
{
    client: Arc<C>,
    view: V,
    index: TaskIndex,
    cursor: MonthCursor,
    selected_date: Option<NaiveDate>,
    profile: Option<GamificationSummary>,
    command_log: Option<Arc<CommandLog>>,
    today_provider: TodayProvider,
}

impl<C, V> CalendarDashboard<C, V>
where
    C: TaskStoreClient,
    V: DashboardView,
{
    pub fn new(client: Arc<C>, view: V) -> Self {
        let today_provider: TodayProvider = Arc::new(|| Local::now().date_naive());
        let cursor = MonthCursor::containing(today_provider());
        Self {
            client,
            view,
            index: TaskIndex::default(),
            cursor,
            selected_date: None,
            profile: None,
            command_log: None,
            today_provider,
        }
    }

    /// Replaces the clock and moves the displayed month to the new "today".
    pub fn with_today_provider(mut self, today_provider: TodayProvider) -> Self {
        self.cursor = MonthCursor::containing(today_provider());
        self.today_provider = today_provider;
        self
    }

    pub fn with_month(mut self, cursor: MonthCursor) -> Self {
        self.set_month(cursor);
        self
    }

    /// Moves the displayed month without rendering.
    pub fn set_month(&mut self, cursor: MonthCursor) {
        self.cursor = cursor;
    }

    pub fn with_command_log(mut self, command_log: Arc<CommandLog>) -> Self {
        self.command_log = Some(command_log);
        self
    }

    pub fn index(&self) -> &TaskIndex {
        &self.index
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn profile(&self) -> Option<&GamificationSummary> {
        self.profile.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn today(&self) -> NaiveDate {
        (self.today_provider)()
    }

    pub async fn dispatch(&mut self, command: DashboardCommand) -> Result<(), InfraError> {
        match command {
            DashboardCommand::Reload => self.load_tasks().await.map(|_| ()),
            DashboardCommand::NavigateMonth(delta) => self.navigate_month(delta),
            DashboardCommand::DaySelected(date) => {
                self.select_day(date);
                Ok(())
            }
            DashboardCommand::OpenNewTask => {
                self.open_new_task();
                Ok(())
            }
            DashboardCommand::CloseDay => {
                self.close_day();
                Ok(())
            }
            DashboardCommand::SubmitTask(form) => self.create_task(form).await.map(|_| ()),
            DashboardCommand::TaskAction(task_id, TaskActionKind::Complete) => {
                self.complete_task(&task_id).await.map(|_| ())
            }
            DashboardCommand::TaskAction(task_id, TaskActionKind::Delete) => {
                self.delete_task(&task_id).await
            }
            DashboardCommand::RefreshProfile => self.refresh_profile().await.map(|_| ()),
        }
    }

    /// Replaces the whole index with the remote task list. Returns the number
    /// of tasks loaded.
    pub async fn load_tasks(&mut self) -> Result<usize, InfraError> {
        let result = self.client.fetch_tasks().await;
        match result {
            Ok(tasks) => {
                self.index.reload(tasks.into_iter().filter(|task| match task.validate() {
                    Ok(()) => true,
                    Err(reason) => {
                        log::warn!("skipping task from store: {reason}");
                        false
                    }
                }));
                self.log_info(
                    "load_tasks",
                    &format!(
                        "loaded {} tasks across {} days",
                        self.index.len(),
                        self.index.date_count()
                    ),
                );
                self.refresh_views()?;
                Ok(self.index.len())
            }
            Err(error) => Err(self.surface_failure("load_tasks", LOAD_FAILED, error)),
        }
    }

    pub fn navigate_month(&mut self, delta: i32) -> Result<(), InfraError> {
        self.cursor = self.cursor.shift(delta).map_err(InfraError::InvalidDate)?;
        self.render_month()
    }

    pub fn month_view(&self) -> Result<MonthView, InfraError> {
        let cells = generate_with_index(self.cursor, &self.index).map_err(InfraError::InvalidDate)?;
        Ok(MonthView {
            title: self.cursor.title(),
            cursor: self.cursor,
            cells,
        })
    }

    /// Task list of one date, freshly read from the index.
    pub fn day_view(&self, date: NaiveDate) -> DayView {
        let today = self.today();
        let entries = self
            .index
            .lookup_date(date)
            .iter()
            .map(|task| TaskEntry {
                task: task.clone(),
                actions: actions_for(task, today),
            })
            .collect();
        DayView { date, entries }
    }

    pub fn select_day(&mut self, date: NaiveDate) {
        self.selected_date = Some(date);
        let day = self.day_view(date);
        self.view.render_day(&day);
    }

    /// Selects today and returns a form prefilled with today's date.
    pub fn open_new_task(&mut self) -> NewTaskForm {
        let today = self.today();
        self.select_day(today);
        NewTaskForm::for_date(today)
    }

    pub fn close_day(&mut self) {
        self.selected_date = None;
        self.view.close_day();
    }

    pub async fn create_task(&mut self, form: NewTaskForm) -> Result<Task, InfraError> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                log::debug!("create_task rejected locally: {errors}");
                self.view.show_field_errors(&errors);
                return Err(InfraError::Validation(errors));
            }
        };

        let result = self.client.create_task(&request).await;
        match result {
            Ok(task) => {
                self.log_info(
                    "create_task",
                    &format!("created task_id={} due={}", task.id, task.date_key()),
                );
                self.index.insert(task.clone());
                self.render_month()?;
                self.close_day();
                self.view.show_notice(&Notice::success(TASK_CREATED));
                Ok(task)
            }
            Err(error) => {
                let message = error.server_message().unwrap_or(CREATE_FAILED).to_string();
                Err(self.surface_failure("create_task", &message, error))
            }
        }
    }

    pub async fn complete_task(&mut self, task_id: &TaskId) -> Result<Task, InfraError> {
        let result = self
            .client
            .update_task_status(task_id, &TaskStatus::Completed)
            .await;
        match result {
            Ok(task) => {
                if !self.index.update(task.clone()) {
                    log::warn!("completed task_id={task_id} was not in the local index");
                }
                self.log_info("complete_task", &format!("completed task_id={task_id}"));
                self.refresh_views()?;
                self.view.show_notice(&Notice::success(TASK_UPDATED));
                Ok(task)
            }
            Err(error) => Err(self.surface_failure("complete_task", UPDATE_FAILED, error)),
        }
    }

    pub async fn delete_task(&mut self, task_id: &TaskId) -> Result<(), InfraError> {
        let result = self.client.delete_task(task_id).await;
        match result {
            Ok(()) => {
                if self.index.remove(task_id).is_none() {
                    log::warn!("deleted task_id={task_id} was not in the local index");
                }
                self.log_info("delete_task", &format!("deleted task_id={task_id}"));
                self.refresh_views()?;
                self.view.show_notice(&Notice::success(TASK_DELETED));
                Ok(())
            }
            Err(error) => Err(self.surface_failure("delete_task", DELETE_FAILED, error)),
        }
    }

    pub async fn refresh_profile(&mut self) -> Result<GamificationSummary, InfraError> {
        let result = self.client.fetch_gamification_summary().await;
        match result {
            Ok(summary) => {
                let achievement = summary.achievement();
                self.log_info(
                    "refresh_profile",
                    &format!(
                        "level={} xp={} streak={} badge={achievement}",
                        summary.level, summary.xp, summary.streak
                    ),
                );
                self.view.render_profile(&summary, achievement);
                self.profile = Some(summary.clone());
                Ok(summary)
            }
            Err(error) => Err(self.surface_failure("refresh_profile", PROFILE_FAILED, error)),
        }
    }

    pub fn show_motivation(&mut self, message: &str) {
        self.view.show_motivation(message);
    }

    fn render_month(&mut self) -> Result<(), InfraError> {
        let month = self.month_view()?;
        self.view.render_month(&month);
        Ok(())
    }

    fn refresh_views(&mut self) -> Result<(), InfraError> {
        self.render_month()?;
        if let Some(date) = self.selected_date {
            let day = self.day_view(date);
            self.view.render_day(&day);
        }
        Ok(())
    }

    fn surface_failure(&mut self, command: &str, message: &str, error: InfraError) -> InfraError {
        self.log_error(command, &error.to_string());
        self.view.show_notice(&Notice::error(message));
        error
    }

    fn log_info(&self, command: &str, message: &str) {
        match &self.command_log {
            Some(command_log) => command_log.log_info(command, message),
            None => log::info!("{command}: {message}"),
        }
    }

    fn log_error(&self, command: &str, message: &str) {
        match &self.command_log {
            Some(command_log) => command_log.log_error(command, message),
            None => log::error!("{command}: {message}"),
        }
    }
}

fn actions_for(task: &Task, today: NaiveDate) -> Vec<TaskActionKind> {
    let mut actions = Vec::with_capacity(2);
    if task.can_complete_on(today) {
        actions.push(TaskActionKind::Complete);
    }
    actions.push(TaskActionKind::Delete);
    actions
}
