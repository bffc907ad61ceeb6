//! HTTP route handlers
//!
//! The chat-bot front ends, the dispatch worker and the web dashboard all
//! talk to the core through these routes.

pub mod dispatch;
pub mod health;
pub mod intake;
pub mod reminders;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::database::DatabasePool;
use crate::services::ServiceFactory;

/// Shared application state for all routes
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub pool: DatabasePool,
}

impl AppState {
    pub fn new(services: ServiceFactory, pool: DatabasePool) -> Self {
        Self {
            services: Arc::new(services),
            pool,
        }
    }
}

/// Build the router with all routes
pub fn router() -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/health", get(health::health))
        // Chat-bot intake
        .route(
            "/api/webhook/message",
            post(intake::message_webhook).get(intake::describe),
        )
        // Dispatcher pull + push-back
        .route(
            "/api/webhook/reminder",
            get(dispatch::due_reminders).post(dispatch::update_status),
        )
        // Web dashboard CRUD
        .route(
            "/api/reminders",
            get(reminders::list_reminders).post(reminders::create_reminder),
        )
        .route("/api/reminders/:id", delete(reminders::delete_reminder))
}
