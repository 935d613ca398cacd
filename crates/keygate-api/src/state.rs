//! Application state

use keygate_auth::{AuthGate, AuthService};
use std::sync::Arc;

/// Prometheus handle used to render `/metrics`
pub use metrics_exporter_prometheus::PrometheusHandle as MetricsHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, gate: Arc<AuthGate>) -> Self {
        Self { auth, gate }
    }
}
