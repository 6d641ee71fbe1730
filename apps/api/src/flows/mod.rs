//! AI flows: fixed-shape request/response calls to the text-generation
//! service that the editor uses to fill content fields.
//!
//! A flow either returns a complete result or a single error. Flows never
//! read or write the document store; the editor decides what to apply.

pub mod handlers;
pub mod prompts;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::flows::prompts::{
    fill, ATS_PROMPT_TEMPLATE, BULLETS_PROMPT_TEMPLATE, COVER_LETTER_PROMPT_TEMPLATE,
    SKILLS_PROMPT_TEMPLATE, SUMMARY_PROMPT_TEMPLATE,
};
use crate::llm_client::prompts::{FACTUAL_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{complete_json, TextGenerator};
use crate::models::resume::ResumeRecord;
use crate::render::format::bullet_lines;

const MAX_SKILL_SUGGESTIONS: usize = 10;
const DEFAULT_COMPANY_NAME: &str = "the hiring team";

// ────────────────────────────────────────────────────────────────────────────
// Request / response shapes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub experience_level: String,
    pub job_title: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletsRequest {
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulletsResponse {
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub resume: ResumeRecord,
    pub job_description: String,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsRequest {
    pub job_title: String,
    #[serde(default)]
    pub existing_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreRequest {
    pub resume: ResumeRecord,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AtsScoreResponse {
    pub score: u8,
    pub suggestions: Vec<String>,
}

/// Raw model output before the score is clamped.
#[derive(Debug, Deserialize)]
struct RawAtsScore {
    score: f64,
    #[serde(default)]
    suggestions: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Flows
// ────────────────────────────────────────────────────────────────────────────

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn resume_json(record: &ResumeRecord) -> Result<String, AppError> {
    serde_json::to_string_pretty(record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume: {e}")))
}

pub async fn generate_summary(
    generator: &dyn TextGenerator,
    request: &SummaryRequest,
) -> Result<SummaryResponse, AppError> {
    require("jobTitle", &request.job_title)?;

    let skills = request.skills.join(", ");
    let prompt = fill(
        SUMMARY_PROMPT_TEMPLATE,
        &[
            ("factual_instruction", FACTUAL_INSTRUCTION),
            ("experience_level", request.experience_level.trim()),
            ("job_title", request.job_title.trim()),
            ("skills", skills.as_str()),
            ("experience_summary", request.experience_summary.trim()),
        ],
    );

    let response: SummaryResponse = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    info!("Generated summary for '{}'", request.job_title.trim());
    Ok(SummaryResponse {
        summary: response.summary.trim().to_string(),
    })
}

pub async fn generate_bullets(
    generator: &dyn TextGenerator,
    request: &BulletsRequest,
) -> Result<BulletsResponse, AppError> {
    require("jobTitle", &request.job_title)?;
    require("description", &request.description)?;

    let prompt = fill(
        BULLETS_PROMPT_TEMPLATE,
        &[
            ("factual_instruction", FACTUAL_INSTRUCTION),
            ("job_title", request.job_title.trim()),
            ("company", request.company.trim()),
            ("description", request.description.trim()),
        ],
    );

    let response: BulletsResponse = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    let bullets = response
        .bullets
        .iter()
        .flat_map(|bullet| bullet_lines(bullet))
        .collect();
    Ok(BulletsResponse { bullets })
}

pub async fn generate_cover_letter(
    generator: &dyn TextGenerator,
    request: &CoverLetterRequest,
) -> Result<CoverLetterResponse, AppError> {
    require("jobDescription", &request.job_description)?;

    let company = request
        .company_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_COMPANY_NAME);
    let resume = resume_json(&request.resume)?;
    let prompt = fill(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("factual_instruction", FACTUAL_INSTRUCTION),
            ("company_name", company),
            ("job_description", request.job_description.trim()),
            ("resume_json", resume.as_str()),
        ],
    );

    let response: CoverLetterResponse =
        complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    Ok(CoverLetterResponse {
        cover_letter: response.cover_letter.trim().to_string(),
    })
}

/// Suggested skills are deduplicated here, case-insensitively, and never
/// repeat a skill the résumé already lists. The store keeps whatever the
/// user entered.
pub async fn suggest_skills(
    generator: &dyn TextGenerator,
    request: &SkillsRequest,
) -> Result<SkillsResponse, AppError> {
    require("jobTitle", &request.job_title)?;

    let existing = request.existing_skills.join(", ");
    let prompt = fill(
        SKILLS_PROMPT_TEMPLATE,
        &[
            ("job_title", request.job_title.trim()),
            ("existing_skills", existing.as_str()),
        ],
    );

    let response: SkillsResponse = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    Ok(SkillsResponse {
        skills: dedupe_suggestions(response.skills, &request.existing_skills),
    })
}

pub async fn score_ats(
    generator: &dyn TextGenerator,
    request: &AtsScoreRequest,
) -> Result<AtsScoreResponse, AppError> {
    require("jobDescription", &request.job_description)?;

    let resume = resume_json(&request.resume)?;
    let prompt = fill(
        ATS_PROMPT_TEMPLATE,
        &[
            ("job_description", request.job_description.trim()),
            ("resume_json", resume.as_str()),
        ],
    );

    let raw: RawAtsScore = complete_json(generator, &prompt, JSON_ONLY_SYSTEM).await?;
    let score = raw.score.clamp(0.0, 100.0).round() as u8;
    info!("ATS score {score} for resume {}", request.resume.id);
    Ok(AtsScoreResponse {
        score,
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

/// Keeps the first spelling of each skill, drops blanks and anything in
/// `existing`, and caps the list.
fn dedupe_suggestions(suggested: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.trim().to_lowercase()).collect();
    suggested
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .take(MAX_SKILL_SUGGESTIONS)
        .collect()
}
