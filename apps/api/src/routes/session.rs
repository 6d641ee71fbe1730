//! Axum route handlers for the active-document session (editor actions).

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::routes::resumes::{render_response, FormatQuery};
use crate::routes::OwnerQuery;
use crate::session::path::{FieldPath, FieldValue};
use crate::session::{ActiveDocument, DocumentState, EditSession};
use crate::state::AppState;
use crate::store::{OwnerKey, SeedContact};

#[derive(Debug, Serialize)]
pub struct ActiveDocumentResponse {
    pub state: DocumentState,
    pub record: Arc<ResumeRecord>,
}

impl From<&ActiveDocument> for ActiveDocumentResponse {
    fn from(doc: &ActiveDocument) -> Self {
        Self {
            state: doc.state,
            record: Arc::clone(&doc.record),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub path: String,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResponsibilityEdit {
    Insert {
        experience: usize,
        position: usize,
        text: String,
    },
    Remove {
        experience: usize,
        position: usize,
    },
}

fn no_active_document() -> AppError {
    AppError::NotFound("No resume is open".to_string())
}

/// The owner's existing session. Never creates one, so a lookup for an
/// unknown owner costs nothing.
async fn existing_session(
    state: &AppState,
    owner: &OwnerKey,
) -> Result<Arc<Mutex<EditSession>>, AppError> {
    state.sessions.get(owner).await.ok_or_else(no_active_document)
}

fn active_response(session: &EditSession) -> Result<Json<ActiveDocumentResponse>, AppError> {
    session
        .active()
        .map(|doc| Json(doc.into()))
        .ok_or_else(no_active_document)
}

/// POST /api/v1/session/open/:id
///
/// Reloads the owner's collection and opens `id` for editing.
pub async fn handle_open(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let opened = {
        let session = state.sessions.for_owner(&owner).await;
        let mut session = session.lock().await;
        session.refresh(&state.store, &owner).await;
        session.set_active_by_id(id).map(ActiveDocumentResponse::from)
    };

    match opened {
        Some(doc) => Ok(Json(doc)),
        None => {
            state.sessions.release_if_idle(&owner).await;
            Err(AppError::NotFound(format!("Resume {id} not found")))
        }
    }
}

/// POST /api/v1/session/draft
///
/// Opens a blank résumé that is not written until the first save.
pub async fn handle_new_draft(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(seed): Json<SeedContact>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let session = state.sessions.for_owner(&owner).await;
    let mut session = session.lock().await;

    session.open_unsaved(seed.blank_record());
    active_response(&session)
}

/// GET /api/v1/session
pub async fn handle_get_active(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let session = existing_session(&state, &owner).await?;
    let session = session.lock().await;
    active_response(&session)
}

/// PATCH /api/v1/session/field
///
/// In-memory edit only; call save to persist.
pub async fn handle_update_field(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(update): Json<FieldUpdate>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let path = FieldPath::parse(&update.path)?;
    let session = existing_session(&state, &owner).await?;
    let mut session = session.lock().await;

    if !session.update_field(&path, update.value)? {
        return Err(no_active_document());
    }
    active_response(&session)
}

/// POST /api/v1/session/responsibilities
pub async fn handle_edit_responsibility(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(edit): Json<ResponsibilityEdit>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let session = existing_session(&state, &owner).await?;
    let mut session = session.lock().await;

    let applied = match edit {
        ResponsibilityEdit::Insert {
            experience,
            position,
            text,
        } => session.insert_responsibility(experience, position, &text)?,
        ResponsibilityEdit::Remove {
            experience,
            position,
        } => session.remove_responsibility(experience, position)?,
    };
    if !applied {
        return Err(no_active_document());
    }
    active_response(&session)
}

/// POST /api/v1/session/save
pub async fn handle_save(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ActiveDocumentResponse>, AppError> {
    let owner = query.owner_key()?;
    let session = existing_session(&state, &owner).await?;
    let mut session = session.lock().await;

    if !session.save(&state.store, &owner).await? {
        return Err(no_active_document());
    }
    active_response(&session)
}

/// GET /api/v1/session/render
///
/// Renders the in-memory document, including unsaved edits.
pub async fn handle_render_active(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Query(format): Query<FormatQuery>,
) -> Result<Response, AppError> {
    let owner = query.owner_key()?;
    let session = existing_session(&state, &owner).await?;
    let session = session.lock().await;

    let doc = session.active().ok_or_else(no_active_document)?;
    render_response(&doc.record, format.format.as_deref())
}
