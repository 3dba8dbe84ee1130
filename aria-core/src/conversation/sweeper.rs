//! Periodic eviction of idle conversations

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::store::ConversationStore;
use crate::clock::Clock;

/// Background task that calls [`ConversationStore::sweep`] on a fixed period
///
/// The first sweep happens one full interval after `start`. `stop` cancels
/// the task and waits for it to finish.
pub struct SweepService {
    store: Arc<ConversationStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    state: RwLock<Option<Running>>,
}

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweepService {
    pub fn new(store: Arc<ConversationStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
            state: RwLock::new(None),
        }
    }

    /// Start sweeping; a second call while running is a no-op
    pub async fn start(&self) {
        let mut state = self.state.write().await;
        if state.is_some() {
            debug!("Sweep service already running");
            return;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.interval,
            cancel.clone(),
        ));

        *state = Some(Running { cancel, task });
        info!("Conversation sweep started (every {:?})", self.interval);
    }

    /// Stop sweeping
    pub async fn stop(&self) {
        let running = self.state.write().await.take();
        if let Some(running) = running {
            running.cancel.cancel();
            let _ = running.task.await;
            info!("Conversation sweep stopped");
        }
    }

    /// Check if the service is running
    pub async fn is_running(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// Get service status
    pub async fn status(&self) -> serde_json::Value {
        serde_json::json!({
            "running": self.is_running().await,
            "interval_s": self.interval.as_secs(),
            "retention_h": self.store.retention().num_hours(),
            "active_conversations": self.store.size(),
        })
    }
}

async fn run_loop(
    store: Arc<ConversationStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let Some(start) = tokio::time::Instant::now().checked_add(interval) else {
        // period too large to ever elapse
        cancel.cancelled().await;
        return;
    };
    let mut ticker = tokio::time::interval_at(start, interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                store.sweep(clock.now());
            }
        }
    }
}
