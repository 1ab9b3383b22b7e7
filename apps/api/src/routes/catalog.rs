use axum::{extract::State, Json};
use serde::Serialize;

use crate::catalog::Unit;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub qualification: String,
    pub target_units: Vec<Unit>,
}

/// GET /api/v1/catalog
/// Lists the target units and their performance criteria in catalog order.
pub async fn handle_get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        qualification: state.catalog.qualification.clone(),
        target_units: state.catalog.target_units().into_iter().cloned().collect(),
    })
}
