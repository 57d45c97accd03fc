use std::sync::Arc;

use crate::settings::Settings;

pub mod api;
pub mod bridge;
pub mod http;
pub mod mock;

pub use api::{Api, ApiError};
pub use bridge::EventBridge;

/// Builds the facade selected by configuration: the real HTTP client, or the
/// in-memory mock that fabricates responses and simulated server push.
pub fn build_api(settings: &Settings) -> Arc<dyn Api> {
    if settings.client.use_mock {
        log::info!("API facade running in mock mode.");
        Arc::new(mock::MockApi::new(settings.economy))
    } else {
        Arc::new(http::HttpApi::new(
            settings.client.base_url.clone(),
            settings.client.ws_url.clone(),
        ))
    }
}
