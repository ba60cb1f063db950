use crate::dashboard::{Dashboard, SessionRegistry};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gateways wired at startup; shared by every session.
    pub dashboard: Dashboard,
    pub sessions: SessionRegistry,
}
