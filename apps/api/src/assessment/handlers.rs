//! Axum route handlers for the Assessment API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assessment::models::{
    AnswerAssessment, AnsweredQuestion, CandidateProfile, EvaluationResult, GenerationOptions,
    InterviewerSuggestion, OnlineQuestionRequest, OverallFeedback, Question, ResponseAnalysis,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub expected_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub criteria: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct FollowUpRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct FollowUpResponse {
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct OverallFeedbackRequest {
    #[serde(default)]
    pub answers: Vec<AnsweredQuestion>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub profile: CandidateProfile,
    #[serde(default)]
    pub current_question: Option<String>,
    #[serde(default)]
    pub answered_count: u32,
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessment/questions
///
/// Plain interview questions. A completion-service failure surfaces as an
/// LLM_ERROR so the caller can offer a retry.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(options): Json<GenerationOptions>,
) -> Result<Json<QuestionsResponse>, AppError> {
    options.validate().map_err(AppError::Validation)?;

    let questions = state.engine.generate_questions(&options).await?;

    Ok(Json(QuestionsResponse { questions }))
}

/// POST /api/v1/assessment/online-questions
pub async fn handle_online_questions(
    State(state): State<AppState>,
    Json(request): Json<OnlineQuestionRequest>,
) -> Result<Json<QuestionsResponse>, AppError> {
    request.validate().map_err(AppError::Validation)?;

    let questions = state
        .engine
        .generate_online_interview_questions(&request)
        .await;

    Ok(Json(QuestionsResponse { questions }))
}

/// POST /api/v1/assessment/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluationResult>, AppError> {
    require_text("question", &request.question)?;

    let evaluation = state
        .engine
        .evaluate_answer(
            &request.question,
            &request.answer,
            request.expected_answer.as_deref(),
        )
        .await;

    Ok(Json(evaluation))
}

/// POST /api/v1/assessment/assess
pub async fn handle_assess(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> Result<Json<AnswerAssessment>, AppError> {
    require_text("question", &request.question)?;

    let assessment = state
        .engine
        .assess_answer(&request.question, &request.answer, &request.criteria)
        .await;

    Ok(Json(assessment))
}

/// POST /api/v1/assessment/follow-up
pub async fn handle_follow_up(
    State(state): State<AppState>,
    Json(request): Json<FollowUpRequest>,
) -> Result<Json<FollowUpResponse>, AppError> {
    require_text("question", &request.question)?;
    require_text("answer", &request.answer)?;

    let follow_up_questions = state
        .engine
        .generate_follow_up(&request.question, &request.answer)
        .await;

    Ok(Json(FollowUpResponse {
        follow_up_questions,
    }))
}

/// POST /api/v1/assessment/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ResponseAnalysis>, AppError> {
    require_text("answer", &request.answer)?;

    Ok(Json(state.engine.analyze_response(&request.answer).await))
}

/// POST /api/v1/assessment/overall-feedback
pub async fn handle_overall_feedback(
    State(state): State<AppState>,
    Json(request): Json<OverallFeedbackRequest>,
) -> Result<Json<OverallFeedback>, AppError> {
    let feedback = state
        .engine
        .generate_overall_feedback(&request.answers, &request.skills)
        .await;

    Ok(Json(feedback))
}

/// POST /api/v1/assessment/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<InterviewerSuggestion>, AppError> {
    let suggestion = state
        .engine
        .generate_interviewer_suggestions(
            &request.profile,
            request.current_question.as_deref(),
            request.answered_count,
        )
        .await;

    Ok(Json(suggestion))
}
