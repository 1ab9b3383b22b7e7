//! Axum route handlers for the questionnaire session API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assessment::mapping::MappingNotice;
use crate::errors::AppError;
use crate::models::assessment::{MappingResults, UnitRelevance};
use crate::models::evidence::EvidenceKind;
use crate::report::render_report;
use crate::session::store::SessionHandle;
use crate::session::{Session, Stage};
use crate::state::AppState;

const WELCOME_GUIDANCE: &str = "This tool helps you understand what evidence you might need \
    for your Recognition of Prior Learning (RPL) application for the Cert IV in Training and \
    Assessment (TAE40122). 1. Tell us briefly about your training and assessment experience. \
    2. The AI suggests relevant units and types of evidence. 3. Provide mock examples of your \
    evidence as text snippets. 4. The AI shows how your evidence might map to specific criteria \
    and highlights any gaps.";

const EXPERIENCE_GUIDANCE: &str = "Please provide a brief summary (2-3 sentences, or a short \
    paragraph) of your professional experience related to training and assessment.";

const EVIDENCE_GUIDANCE: &str = "Paste or type a brief description or snippet for each type of \
    evidence you might have, then build your map.";

const NO_UNITS_GUIDANCE: &str = "The AI could not identify relevant units or suggestions based \
    on your input. Please provide more detail about your experience.";

const NO_SUGGESTIONS_NOTE: &str = "No specific suggestions provided by AI based on relevance.";

const REPORT_GUIDANCE: &str = "Here's how your evidence could map to the core units. \
    Start over to try a different narrative.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitExperienceRequest {
    pub experience_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SetEvidenceRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EvidenceField {
    pub kind: EvidenceKind,
    pub label: &'static str,
    pub content: String,
}

/// A unit from the experience analysis, with a note when it came back without suggestions.
#[derive(Debug, Serialize)]
pub struct UnitAssessmentView {
    #[serde(flatten)]
    pub assessment: UnitRelevance,
    pub note: Option<&'static str>,
}

impl From<&UnitRelevance> for UnitAssessmentView {
    fn from(assessment: &UnitRelevance) -> Self {
        Self {
            note: assessment.suggestions.is_empty().then_some(NO_SUGGESTIONS_NOTE),
            assessment: assessment.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub stage: Stage,
    pub analysis_done: bool,
    pub guidance: &'static str,
    pub experience_text: String,
    pub evidence: Vec<EvidenceField>,
    pub relevant_units_assessment: Vec<UnitAssessmentView>,
    pub mapping_results: Option<MappingResults>,
}

impl SessionView {
    fn new(handle: &SessionHandle, session: &Session) -> Self {
        Self {
            id: handle.id,
            created_at: handle.created_at,
            stage: session.stage(),
            analysis_done: session.analysis_done(),
            guidance: guidance(session),
            experience_text: session.experience_text().to_string(),
            evidence: session
                .evidence()
                .iter()
                .map(|(kind, content)| EvidenceField {
                    kind,
                    label: kind.label(),
                    content: content.to_string(),
                })
                .collect(),
            relevant_units_assessment: session
                .relevant_units_assessment()
                .iter()
                .map(UnitAssessmentView::from)
                .collect(),
            mapping_results: session.mapping_results().cloned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub session: SessionView,
    pub notices: Vec<MappingNotice>,
    pub calls_made: usize,
}

fn guidance(session: &Session) -> &'static str {
    match session.stage() {
        Stage::Welcome => WELCOME_GUIDANCE,
        Stage::ExperienceInput => EXPERIENCE_GUIDANCE,
        Stage::EvidenceInput if session.relevant_units_assessment().is_empty() => NO_UNITS_GUIDANCE,
        Stage::EvidenceInput => EVIDENCE_GUIDANCE,
        Stage::Report => REPORT_GUIDANCE,
    }
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<SessionHandle>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let handle = state.sessions.create().await;
    info!(
        "Created session {} ({} active)",
        handle.id,
        state.sessions.len().await
    );
    let view = SessionView::new(&handle, &*handle.lock().await);
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionView::new(&handle, &session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        info!("Discarded session {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/start
pub async fn handle_start(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.start()?;
    Ok(Json(SessionView::new(&handle, &session)))
}

/// POST /api/v1/sessions/:id/experience
///
/// Sends the experience summary for analysis. On success the session moves to
/// evidence input with the suggested units attached.
pub async fn handle_submit_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitExperienceRequest>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session
        .submit_experience(
            &request.experience_text,
            &state.catalog,
            state.assessor.as_ref(),
        )
        .await?;
    Ok(Json(SessionView::new(&handle, &session)))
}

/// PUT /api/v1/sessions/:id/evidence/:kind
pub async fn handle_set_evidence(
    State(state): State<AppState>,
    Path((id, kind)): Path<(Uuid, String)>,
    Json(request): Json<SetEvidenceRequest>,
) -> Result<Json<SessionView>, AppError> {
    let kind = kind
        .parse::<EvidenceKind>()
        .map_err(|e| AppError::NotFound(e.to_string()))?;
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.set_evidence(kind, request.content)?;
    Ok(Json(SessionView::new(&handle, &session)))
}

/// POST /api/v1/sessions/:id/mapping
///
/// Runs the full evidence mapping pass (one model call per criterion) and moves
/// the session to the report stage. Per-criterion failures come back as notices.
pub async fn handle_build_mapping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MappingResponse>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    let run = session
        .build_mapping(&state.catalog, state.assessor.as_ref())
        .await?;
    Ok(Json(MappingResponse {
        session: SessionView::new(&handle, &session),
        notices: run.notices,
        calls_made: run.calls_made,
    }))
}

/// GET /api/v1/sessions/:id/report[?format=markdown]
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let handle = find_session(&state, id).await?;
    let session = handle.lock().await;
    let results = session.mapping_results().ok_or_else(|| {
        AppError::Conflict("The report is available once the evidence mapping has run.".to_string())
    })?;

    let report = render_report(results, &state.catalog);

    match query.format.as_deref() {
        Some("markdown") | Some("md") => Ok((
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            report.to_markdown(),
        )
            .into_response()),
        None | Some("json") => Ok(Json(report).into_response()),
        Some(other) => Err(AppError::Validation(format!(
            "Unsupported report format '{other}'. Use 'json' or 'markdown'."
        ))),
    }
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = find_session(&state, id).await?;
    let mut session = handle.lock().await;
    session.reset();
    info!("Session {id} reset");
    Ok(Json(SessionView::new(&handle, &session)))
}
