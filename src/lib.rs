pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod signature;

pub use config::Config;
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatcher: services::WebhookDispatcher,
    pub results: services::ResultStore,
}
