use crate::domain::models::{CreateTaskRequest, GamificationSummary, Task, TaskId, TaskStatus};
use crate::infrastructure::config::DashboardConfig;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

const TASKS_SEGMENTS: &[&str] = &["api", "tasks"];
const MOTIVATION_SEGMENTS: &[&str] = &["api", "motivation"];
const GAMIFICATION_SEGMENTS: &[&str] = &["api", "gamification"];

/// Remote source of truth for tasks and the progress summary.
#[async_trait]
pub trait TaskStoreClient: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, InfraError>;

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, InfraError>;

    async fn update_task_status(
        &self,
        task_id: &TaskId,
        status: &TaskStatus,
    ) -> Result<Task, InfraError>;

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), InfraError>;

    async fn fetch_motivational_message(&self) -> Result<String, InfraError>;

    async fn fetch_gamification_summary(&self) -> Result<GamificationSummary, InfraError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTaskStoreClient {
    client: Client,
    base_url: Url,
    session_cookie: Option<String>,
}

impl ReqwestTaskStoreClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session_cookie: None,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|error| InfraError::Network(format!("failed to build http client: {error}")))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    pub fn with_session_cookie(mut self, session_cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(session_cookie.into());
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                InfraError::InvalidConfig("api base URL cannot be a base".to_string())
            })?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn task_endpoint(&self, task_id: &TaskId) -> Result<Url, InfraError> {
        let mut segments = TASKS_SEGMENTS.to_vec();
        segments.push(task_id.as_str());
        self.endpoint(&segments)
    }

    fn http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                ["message", "error"].into_iter().find_map(|field| {
                    value
                        .get(field)
                        .and_then(serde_json::Value::as_str)
                        .map(str::trim)
                        .filter(|message| !message.is_empty())
                        .map(ToOwned::to_owned)
                })
            });
        InfraError::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// Attaches the session cookie, when one is configured.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session_cookie.as_deref() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    /// Sends the request and returns the body of a successful response.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<String, InfraError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|error| InfraError::Network(format!("network error while {action}: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Network(format!("failed reading response while {action}: {error}")))?;

        if !status.is_success() {
            log::debug!("{action} rejected with http {}: {body}", status.as_u16());
            return Err(Self::http_error(status, &body));
        }
        Ok(body)
    }

    fn parse<T: DeserializeOwned>(body: &str, action: &str) -> Result<T, InfraError> {
        serde_json::from_str(body).map_err(|error| {
            InfraError::InvalidPayload(format!("invalid payload while {action}: {error}; body={body}"))
        })
    }
}

#[derive(Debug, serde::Serialize)]
struct StatusUpdateRequest<'a> {
    status: &'a TaskStatus,
}

#[derive(Debug, serde::Deserialize)]
struct MotivationResponse {
    message: Option<String>,
}

#[async_trait]
impl TaskStoreClient for ReqwestTaskStoreClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, InfraError> {
        let action = "listing tasks";
        let endpoint = self.endpoint(TASKS_SEGMENTS)?;
        let body = self.send(self.client.get(endpoint), action).await?;
        Self::parse(&body, action)
    }

    async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task, InfraError> {
        let action = "creating task";
        let endpoint = self.endpoint(TASKS_SEGMENTS)?;
        let body = self
            .send(self.client.post(endpoint).json(request), action)
            .await?;
        Self::parse(&body, action)
    }

    async fn update_task_status(
        &self,
        task_id: &TaskId,
        status: &TaskStatus,
    ) -> Result<Task, InfraError> {
        let action = "updating task status";
        let endpoint = self.task_endpoint(task_id)?;
        let body = self
            .send(
                self.client.put(endpoint).json(&StatusUpdateRequest { status }),
                action,
            )
            .await?;
        Self::parse(&body, action)
    }

    async fn delete_task(&self, task_id: &TaskId) -> Result<(), InfraError> {
        let endpoint = self.task_endpoint(task_id)?;
        self.send(self.client.delete(endpoint), "deleting task").await?;
        Ok(())
    }

    async fn fetch_motivational_message(&self) -> Result<String, InfraError> {
        let action = "fetching motivational message";
        let endpoint = self.endpoint(MOTIVATION_SEGMENTS)?;
        let body = self.send(self.client.get(endpoint), action).await?;
        let parsed: MotivationResponse = Self::parse(&body, action)?;
        parsed
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .ok_or_else(|| InfraError::InvalidPayload("motivation response did not include a message".to_string()))
    }

    async fn fetch_gamification_summary(&self) -> Result<GamificationSummary, InfraError> {
        let action = "fetching gamification summary";
        let endpoint = self.endpoint(GAMIFICATION_SEGMENTS)?;
        let body = self.send(self.client.get(endpoint), action).await?;
        Self::parse(&body, action)
    }
}
