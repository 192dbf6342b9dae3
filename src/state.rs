use std::sync::Arc;

use axum::extract::FromRef;

use crate::{backend::Backend, config::Config, mutations::InFlight};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub config: Config,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        Self {
            backend,
            config,
            in_flight: InFlight::default(),
        }
    }
}

impl FromRef<AppState> for Arc<dyn Backend> {
    fn from_ref(state: &AppState) -> Self {
        state.backend.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
