// Outbound dispatch and inbound result storage

pub mod dispatcher;
pub mod result_store;

pub use dispatcher::WebhookDispatcher;
pub use result_store::{ResultStore, MAX_RESULTS};
