//! Axum route handlers for the résumé collection (dashboard actions).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::render::{html::to_html, render};
use crate::routes::OwnerQuery;
use crate::state::AppState;
use crate::store::{sort_for_dashboard, SeedContact};

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

/// Renders `record` as JSON (default) or as the flowing HTML document.
pub(crate) fn render_response(
    record: &ResumeRecord,
    format: Option<&str>,
) -> Result<Response, AppError> {
    let document = render(record);
    match format.map(str::trim) {
        None | Some("") | Some("json") => Ok(Json(document).into_response()),
        Some("html") => Ok(Html(to_html(&document)).into_response()),
        Some(other) => Err(AppError::Validation(format!(
            "Unsupported render format '{other}'"
        ))),
    }
}

/// GET /api/v1/resumes
///
/// Lists the owner's résumés, most recently modified first.
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    let owner = query.owner_key()?;
    let mut records = state.store.load(&owner).await;
    sort_for_dashboard(&mut records);
    Ok(Json(records))
}

/// POST /api/v1/resumes
///
/// Holds the owner's session lock across the store's read-modify-write so
/// concurrent writes for one owner never lose an update.
pub async fn handle_create(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(seed): Json<SeedContact>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let owner = query.owner_key()?;
    let created = {
        let session = state.sessions.for_owner(&owner).await;
        let mut session = session.lock().await;
        let created = state.store.create(&owner, &seed).await;
        if let Ok(record) = &created {
            session.track(record.clone());
        }
        created
    };
    state.sessions.release_if_idle(&owner).await;
    Ok((StatusCode::CREATED, Json(created?)))
}

/// DELETE /api/v1/resumes/:id
///
/// Idempotent. Closes the owner's session if it had this résumé open.
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<StatusCode, AppError> {
    let owner = query.owner_key()?;
    let deleted = {
        let session = state.sessions.for_owner(&owner).await;
        let mut session = session.lock().await;
        let deleted = state.store.delete(&owner, id).await;
        if deleted.is_ok() {
            session.forget(id);
        }
        deleted
    };
    state.sessions.release_if_idle(&owner).await;
    deleted?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let owner = query.owner_key()?;
    let duplicated = {
        let session = state.sessions.for_owner(&owner).await;
        let mut session = session.lock().await;
        let duplicated = state.store.duplicate(&owner, id).await;
        if let Ok(Some(copy)) = &duplicated {
            session.track(copy.clone());
        }
        duplicated
    };
    state.sessions.release_if_idle(&owner).await;

    let copy = duplicated?.ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// GET /api/v1/resumes/:id/render
///
/// Renders the persisted copy. `?format=html` returns the HTML document.
pub async fn handle_render(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
    Query(format): Query<FormatQuery>,
) -> Result<Response, AppError> {
    let owner = query.owner_key()?;
    let records = state.store.load(&owner).await;
    let record = records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    render_response(record, format.format.as_deref())
}
