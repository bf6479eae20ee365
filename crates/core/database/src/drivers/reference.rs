use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use getdb_result::Result;

database_derived!(
    /// In-memory mock database, stands in for a real server in tests
    #[derive(Debug, Default)]
    pub struct ReferenceDb {
        name: String,
        fail_with: Option<String>,
        latency: Option<Duration>,
        connect_attempts: Arc<AtomicUsize>,
    }
);

impl ReferenceDb {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Mock whose connections take `latency` to establish, keeping the
    /// attempt in flight long enough for other requests to pile up on it
    pub fn with_latency(name: impl Into<String>, latency: Duration) -> Self {
        Self {
            name: name.into(),
            latency: Some(latency),
            ..Default::default()
        }
    }

    /// Mock that refuses every connection with the given driver message
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fail_with: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many connection attempts this mock has seen
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    pub(crate) async fn establish(&self) -> Result<ReferenceDb> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(message) = &self.fail_with {
            return Err(create_error!(ConnectionFailed {
                message: message.clone()
            }));
        }

        Ok(self.clone())
    }
}
