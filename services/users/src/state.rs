//! Application state shared across handlers

use std::sync::Arc;

use common::config::ServiceConfig;

use crate::repositories::UserRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub user_repository: UserRepository,
}

impl AppState {
    pub fn new(config: ServiceConfig, user_repository: UserRepository) -> Self {
        Self {
            config: Arc::new(config),
            user_repository,
        }
    }
}
