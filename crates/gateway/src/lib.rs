//! API Gateway Library
//!
//! HTTP surface of the user management API: the validation pipeline, the
//! dispatch wrapper that answers every request exactly once, bearer-token
//! authentication, and the user and login handlers.

pub mod clients;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use mockable::DefaultClock;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use auth_service_lib::{Argon2Hasher, Authenticator, TokenService};
use common::{ClassifiedError, ErrorCode};
use user_service_lib::{Database, UserManager, UserStore};

use crate::clients::UserServiceDirectory;
use crate::config::AppConfig;
use crate::dispatch::Dispatcher;
use crate::handlers::dto::request_rule_names;
use crate::routes::create_router;
use crate::state::AppState;
use crate::validation::RuleRegistry;

/// Wire every component from `config` into the application state.
pub fn build_state(config: &AppConfig, database: Database) -> Result<AppState, ClassifiedError> {
    let rules = RuleRegistry::with_domain_rules()
        .and_then(|rules| rules.ensure_registered(request_rule_names()).map(|()| rules))
        .map_err(|err| {
            let err = ClassifiedError::from(err);
            error!(error = %err, event = "custom_validation_failed", "Rule registration failed");
            err
        })?;

    let hasher = Arc::new(Argon2Hasher::new());
    let store = Arc::new(UserStore::new(database.get_connection()));
    let user_service = Arc::new(UserManager::new(store, hasher.clone()));

    let tokens = TokenService::new(&config.jwt, Arc::new(DefaultClock));
    let directory = Arc::new(UserServiceDirectory::new(user_service.clone()));
    let auth_service = Arc::new(Authenticator::new(directory, hasher, tokens));

    Ok(AppState::new(
        auth_service,
        user_service,
        Arc::new(database),
        rules,
        Dispatcher::new(config.request_timeout),
    ))
}

/// Connect to the database and serve the API until the process stops.
pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let database = Database::connect(&config.database).await.map_err(|e| {
        let err = ErrorCode::DatabaseInitialize
            .with_detail("Failed to connect to the database")
            .with_cause(e);
        error!(error = %err, cause = ?err.cause().map(|c| c.to_string()), "Database initialization failed");
        err
    })?;

    let state = build_state(&config, database)?;

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Build address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Gateway listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
