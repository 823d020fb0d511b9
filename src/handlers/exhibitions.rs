use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Exhibition;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExhibitionsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ExhibitionsResponse {
    pub categories: Vec<String>,
    pub exhibitions: Vec<Exhibition>,
}

// GET /api/exhibitions
pub async fn list_exhibitions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExhibitionsQuery>,
) -> Json<ExhibitionsResponse> {
    let exhibitions = state
        .catalog
        .search(query.search.as_deref(), query.category.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Json(ExhibitionsResponse {
        categories: state.catalog.categories(),
        exhibitions,
    })
}

// GET /api/exhibitions/:id
pub async fn get_exhibition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> Result<Json<Exhibition>, AppError> {
    state
        .catalog
        .get(id)
        .cloned()
        .map(Json)
        .ok_or(AppError::ExhibitionNotFound(id))
}
