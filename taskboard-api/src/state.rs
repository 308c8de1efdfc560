//! Shared request state

use std::sync::Arc;
use std::time::Duration;
use taskboard_core::core_board::{AsyncBoardManager, BoardManagerImpl, InMemoryDirectory};

/// Server state shared across requests
#[derive(Clone)]
pub struct AppState {
    /// Board sharing service
    pub boards: AsyncBoardManager,

    /// Profiles shown in member listings, written through `PUT /users/me`
    pub directory: Arc<InMemoryDirectory>,

    /// Upper bound for a single request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(manager: BoardManagerImpl, directory: Arc<InMemoryDirectory>, request_timeout: Duration) -> Self {
        Self {
            boards: AsyncBoardManager::new(manager),
            directory,
            request_timeout,
        }
    }
}
