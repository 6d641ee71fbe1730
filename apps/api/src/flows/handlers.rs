//! Axum route handlers for the AI flows.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::AppError;
use crate::flows::{
    generate_bullets, generate_cover_letter, generate_summary, score_ats, suggest_skills,
    AtsScoreRequest, AtsScoreResponse, BulletsRequest, BulletsResponse, CoverLetterRequest,
    CoverLetterResponse, SkillsRequest, SkillsResponse, SummaryRequest, SummaryResponse,
};
use crate::routes::OwnerQuery;
use crate::state::AppState;

/// POST /api/v1/ai/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<SummaryResponse>, AppError> {
    query.owner_key()?;
    let response = generate_summary(state.generator()?, &request).await?;
    Ok(Json(response))
}

/// POST /api/v1/ai/bullets
pub async fn handle_bullets(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(request): Json<BulletsRequest>,
) -> Result<Json<BulletsResponse>, AppError> {
    query.owner_key()?;
    let response = generate_bullets(state.generator()?, &request).await?;
    Ok(Json(response))
}

/// POST /api/v1/ai/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    query.owner_key()?;
    let response = generate_cover_letter(state.generator()?, &request).await?;
    Ok(Json(response))
}

/// POST /api/v1/ai/skills
pub async fn handle_skills(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    query.owner_key()?;
    let response = suggest_skills(state.generator()?, &request).await?;
    Ok(Json(response))
}

/// POST /api/v1/ai/ats-score
pub async fn handle_ats_score(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
    Json(request): Json<AtsScoreRequest>,
) -> Result<Json<AtsScoreResponse>, AppError> {
    query.owner_key()?;
    let response = score_ats(state.generator()?, &request).await?;
    Ok(Json(response))
}
