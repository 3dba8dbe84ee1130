use std::sync::Arc;

use aria_agent::CompletionGateway;
use aria_core::conversation::SweepService;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CompletionGateway>,
    pub sweeper: Arc<SweepService>,
    /// Take the client id from `X-Forwarded-For` instead of the peer address
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(
        gateway: Arc<CompletionGateway>,
        sweeper: Arc<SweepService>,
        trust_forwarded_for: bool,
    ) -> Self {
        Self {
            gateway,
            sweeper,
            trust_forwarded_for,
        }
    }
}
