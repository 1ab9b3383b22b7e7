use std::sync::Arc;

use crate::catalog::CompetencyCatalog;
use crate::llm_client::Assessor;
use crate::session::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only competency data shared by every session.
    pub catalog: Arc<CompetencyCatalog>,
    /// Remote assessor. `GeminiClient` in production, a scripted double in tests.
    pub assessor: Arc<dyn Assessor>,
    pub sessions: SessionStore,
}
