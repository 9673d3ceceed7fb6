//! Scripted task store and recording view shared by the unit tests.

use crate::application::view::{DashboardView, DayView, MonthView, Notice};
use crate::domain::models::{
    parse_due_date, Achievement, CreateTaskRequest, GamificationSummary, Task, TaskId,
    TaskStatus, ValidationErrors,
};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::TaskStoreClient;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

pub fn task(id: i64, due_date: &str) -> Task {
    Task {
        id: TaskId::from(id),
        title: format!("task {id}"),
        description: None,
        due_date: parse_due_date(due_date).expect("valid due date"),
        status: TaskStatus::Pending,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchTasks,
    CreateTask,
    UpdateStatus,
    DeleteTask,
    Motivation,
    Gamification,
}

#[derive(Debug, Clone)]
pub enum FakeFailure {
    Http { status: u16, message: Option<String> },
    Network,
    MalformedBody,
}

impl FakeFailure {
    fn to_error(&self) -> InfraError {
        match self {
            Self::Http { status, message } => InfraError::Http {
                status: *status,
                message: message.clone(),
            },
            Self::Network => InfraError::Network("connection refused".to_string()),
            Self::MalformedBody => InfraError::InvalidPayload("unexpected end of input".to_string()),
        }
    }
}

/// In-memory stand-in for the backend that behaves like the real API and
/// counts every call.
#[derive(Debug)]
pub struct FakeTaskStore {
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicI64,
    failures: Mutex<HashMap<StoreOperation, FakeFailure>>,
    calls: Mutex<HashMap<StoreOperation, usize>>,
    messages: Mutex<VecDeque<Result<String, FakeFailure>>>,
    summary: Mutex<GamificationSummary>,
}

impl FakeTaskStore {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            next_id: AtomicI64::new(1000),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            messages: Mutex::new(VecDeque::new()),
            summary: Mutex::new(GamificationSummary::from_xp(0, 0, 0)),
        }
    }

    pub fn fail(&self, operation: StoreOperation, failure: FakeFailure) {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .insert(operation, failure);
    }

    pub fn recover(&self, operation: StoreOperation) {
        self.failures
            .lock()
            .expect("failures lock poisoned")
            .remove(&operation);
    }

    pub fn calls(&self, operation: StoreOperation) -> usize {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn push_message(&self, message: Result<&str, FakeFailure>) {
        self.messages
            .lock()
            .expect("messages lock poisoned")
            .push_back(message.map(ToOwned::to_owned));
    }

    pub fn set_summary(&self, summary: GamificationSummary) {
        *self.summary.lock().expect("summary lock poisoned") = summary;
    }

    pub fn remote_tasks(&self) -> Vec<Task> {
        self.tasks.lock().expect("tasks lock poisoned").clone()
    }

    fn enter(&self, operation: StoreOperation) -> Result<(), InfraError> {
        *self
            .calls
            .lock()
            .expect("calls lock poisoned")
            .entry(operation)
            .or_insert(0) += 1;
        match self
            .failures
            .lock()
            .expect("failures lock poisoned")
            .get(&operation)
        {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn not_found() -> InfraError {
        InfraError::Http {
            status: 404,
            message: Some("Task not found".to_string()),
        }
    }
}

#[async_trait]
impl TaskStoreClient for FakeTaskStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, InfraError> {
        self.enter(StoreOperation::FetchTasks)?;
        Ok(self.remote_tasks())
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, InfraError> {
        self.enter(StoreOperation::CreateTask)?;
        let task = Task {
            id: TaskId::from(self.next_id.fetch_add(1, Ordering::SeqCst)),
            title: request.title.clone(),
            description: request.description.clone(),
            due_date: request.due_date,
            status: TaskStatus::Pending,
        };
        self.tasks
            .lock()
            .expect("tasks lock poisoned")
            .push(task.clone());
        Ok(task)
    }

    async fn update_task_status(
        &self,
        task_id: &TaskId,
        status: &TaskStatus,
    ) -> Result<Task, InfraError> {
        self.enter(StoreOperation::UpdateStatus)?;
        let mut tasks = self.tasks.lock().expect("tasks lock poisoned");
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == task_id)
            .ok_or_else(Self::not_found)?;
        task.status = status.clone();
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), InfraError> {
        self.enter(StoreOperation::DeleteTask)?;
        let mut tasks = self.tasks.lock().expect("tasks lock poisoned");
        let position = tasks
            .iter()
            .position(|task| &task.id == task_id)
            .ok_or_else(Self::not_found)?;
        tasks.remove(position);
        Ok(())
    }

    async fn fetch_motivational_message(&self) -> Result<String, InfraError> {
        self.enter(StoreOperation::Motivation)?;
        let next = self
            .messages
            .lock()
            .expect("messages lock poisoned")
            .pop_front();
        match next {
            Some(Ok(message)) => Ok(message),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(format!(
                "Keep going! (#{})",
                self.calls(StoreOperation::Motivation)
            )),
        }
    }

    async fn fetch_gamification_summary(&self) -> Result<GamificationSummary, InfraError> {
        self.enter(StoreOperation::Gamification)?;
        Ok(self.summary.lock().expect("summary lock poisoned").clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Month(MonthView),
    Day(DayView),
    DayClosed,
    Notice(Notice),
    FieldErrors(ValidationErrors),
    Profile(GamificationSummary, Achievement),
    Motivation(String),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn last_month(&self) -> Option<&MonthView> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::Month(month) => Some(month),
            _ => None,
        })
    }

    pub fn last_day(&self) -> Option<&DayView> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::Day(day) => Some(day),
            _ => None,
        })
    }

    pub fn notices(&self) -> Vec<&Notice> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices().last().copied()
    }
}

impl DashboardView for RecordingView {
    fn render_month(&mut self, month: &MonthView) {
        self.events.push(ViewEvent::Month(month.clone()));
    }

    fn render_day(&mut self, day: &DayView) {
        self.events.push(ViewEvent::Day(day.clone()));
    }

    fn close_day(&mut self) {
        self.events.push(ViewEvent::DayClosed);
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.events.push(ViewEvent::Notice(notice.clone()));
    }

    fn show_field_errors(&mut self, errors: &ValidationErrors) {
        self.events.push(ViewEvent::FieldErrors(errors.clone()));
    }

    fn render_profile(&mut self, summary: &GamificationSummary, achievement: Achievement) {
        self.events
            .push(ViewEvent::Profile(summary.clone(), achievement));
    }

    fn show_motivation(&mut self, message: &str) {
        self.events.push(ViewEvent::Motivation(message.to_string()));
    }
}
