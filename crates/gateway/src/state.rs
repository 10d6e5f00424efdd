//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::AuthService;
use user_service_lib::UserService;

use crate::dispatch::Dispatcher;
use crate::handlers::HealthCheck;
use crate::validation::RuleRegistry;

/// Application state shared across handlers.
///
/// Built once at startup; nothing in it is mutated while serving.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub database: Arc<dyn HealthCheck>,
    pub rules: Arc<RuleRegistry>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        database: Arc<dyn HealthCheck>,
        rules: RuleRegistry,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            database,
            rules: Arc::new(rules),
            dispatcher,
        }
    }
}
