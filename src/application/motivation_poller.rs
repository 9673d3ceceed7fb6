use crate::infrastructure::error::InfraError;
use crate::infrastructure::task_store_client::TaskStoreClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(10);

/// Periodically refreshes the motivational message.
///
/// The latest message is published on a watch channel. A failed fetch keeps
/// the previous message and the schedule keeps running. The first fetch
/// happens one full period after `start`.
pub struct MotivationPoller<C>
where
    C: TaskStoreClient + 'static,
{
    client: Arc<C>,
    period: Duration,
    message_tx: Arc<watch::Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl<C> MotivationPoller<C>
where
    C: TaskStoreClient + 'static,
{
    pub fn new(client: Arc<C>, period: Duration) -> Self {
        let (message_tx, _) = watch::channel(String::new());
        Self {
            client,
            period: if period.is_zero() {
                DEFAULT_REFRESH_PERIOD
            } else {
                period
            },
            message_tx: Arc::new(message_tx),
            handle: None,
        }
    }

    pub fn with_initial_message(self, message: impl Into<String>) -> Self {
        self.message_tx.send_replace(message.into());
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.message_tx.subscribe()
    }

    pub fn current(&self) -> String {
        self.message_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Spawns the refresh loop on the current runtime. No-op when already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let client = Arc::clone(&self.client);
        let message_tx = Arc::clone(&self.message_tx);
        let period = self.period;
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let _ = refresh(client.as_ref(), &message_tx).await;
            }
        }));
        log::debug!("motivation poller started, period={period:?}");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("motivation poller stopped");
        }
    }

    /// Fetches immediately, outside the schedule.
    pub async fn refresh_once(&self) -> Result<String, InfraError> {
        refresh(self.client.as_ref(), &self.message_tx).await
    }
}

impl<C> Drop for MotivationPoller<C>
where
    C: TaskStoreClient + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

async fn refresh<C>(client: &C, message_tx: &watch::Sender<String>) -> Result<String, InfraError>
where
    C: TaskStoreClient + ?Sized,
{
    match client.fetch_motivational_message().await {
        Ok(message) => {
            message_tx.send_replace(message.clone());
            Ok(message)
        }
        Err(error) => {
            log::warn!("motivation refresh failed: {error}");
            Err(error)
        }
    }
}
