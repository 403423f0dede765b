use crate::core::feed::FeedProvider;
use crate::core::outcome::{Outcome, StageError};
use crate::providers::util::with_retry;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const FETCH_ATTEMPTS: usize = 3;
pub const FETCH_BACKOFF: Duration = Duration::from_secs(1);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the daily reference feed with a fixed-interval retry policy.
///
/// Total wall time is bounded by `attempts * (timeout + backoff)`.
pub struct EcbFeedClient {
    url: String,
    timeout: Duration,
    attempts: usize,
    backoff: Duration,
}

impl EcbFeedClient {
    pub fn new(url: &str) -> Self {
        EcbFeedClient {
            url: url.to_string(),
            timeout: FETCH_TIMEOUT,
            attempts: FETCH_ATTEMPTS,
            backoff: FETCH_BACKOFF,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn fetch_once(&self, client: &reqwest::Client, attempt: usize) -> Outcome<String> {
        debug!("Requesting feed from {} (attempt {})", self.url, attempt);

        let response = client.get(&self.url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("Request timed out after {:?}", self.timeout)
            } else {
                format!("Request error: {e}")
            };
            StageError::Fetch {
                status: None,
                message,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StageError::Fetch {
                status: Some(status.as_u16()),
                message: format!("Feed returned HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(|e| StageError::Fetch {
            status: Some(status.as_u16()),
            message: format!("Failed to read feed body: {e}"),
        })?;

        if body.trim().is_empty() {
            return Err(StageError::Fetch {
                status: Some(status.as_u16()),
                message: "Received empty feed document".to_string(),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl FeedProvider for EcbFeedClient {
    #[instrument(name = "FeedFetch", skip(self), fields(url = %self.url))]
    async fn fetch_document(&self) -> Outcome<String> {
        let client = reqwest::Client::builder()
            .user_agent("eurofx/0.1")
            .timeout(self.timeout)
            .build()
            .map_err(|e| StageError::Fetch {
                status: None,
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        // Status of the most recent attempt that got an HTTP response
        let last_status = Mutex::new(None::<u16>);
        let result = with_retry(
            |attempt| {
                let (client, last_status) = (&client, &last_status);
                async move {
                    let outcome = self.fetch_once(client, attempt).await;
                    if let Err(e) = &outcome
                        && let Some(code) = e.code()
                        && let Ok(mut last) = last_status.lock()
                    {
                        *last = Some(code);
                    }
                    outcome
                }
            },
            self.attempts,
            self.backoff,
        )
        .await;

        match result {
            Ok(body) => {
                info!("Fetched feed document ({} bytes)", body.len());
                Ok(body)
            }
            Err(err) => Err(StageError::Fetch {
                status: last_status.lock().ok().and_then(|last| *last),
                message: format!(
                    "Failed to fetch feed after {} attempts: {}",
                    self.attempts, err
                ),
            }),
        }
    }
}
