//! Assessment engine — the public surface for question generation, answer
//! scoring, and session feedback.
//!
//! Every operation runs the same four steps with no state shared across calls:
//! build prompt → invoke completion client → decode → validate & return.
//! Invoke and decode failures are logged and replaced by a fallback, except on
//! `generate_questions`, where a completion failure propagates to the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::assessment::fallback;
use crate::assessment::models::{
    AnswerAssessment, AnsweredQuestion, CandidateProfile, EvaluationResult, GenerationOptions,
    InterviewerSuggestion, OnlineQuestionRequest, OverallFeedback, Question, QuestionMix,
    ResponseAnalysis,
};
use crate::assessment::prompts::{self, EVALUATION_SYSTEM, FOLLOW_UP_SYSTEM, QUESTION_SYSTEM};
use crate::assessment::schema::{
    self, RawAnalysis, RawAssessment, RawOverallFeedback, RawQuestionSet, RawSuggestion,
};
use crate::assessment::tagged;
use crate::llm_client::{CompletionClient, CompletionRequest, LlmError};

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("completion service failed: {0}")]
    Completion(#[from] LlmError),

    #[error("completion was not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("completion had the wrong shape: {0}")]
    Shape(String),
}

/// Sampling settings for one operation.
#[derive(Debug, Clone, Copy)]
struct Sampling {
    temperature: f32,
    max_tokens: u32,
}

const QUESTION_SAMPLING: Sampling = Sampling {
    temperature: 0.7,
    max_tokens: 2000,
};
const EVALUATION_SAMPLING: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 800,
};
const ASSESSMENT_SAMPLING: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 1000,
};
const FOLLOW_UP_SAMPLING: Sampling = Sampling {
    temperature: 0.6,
    max_tokens: 300,
};
const ANALYSIS_SAMPLING: Sampling = Sampling {
    temperature: 0.2,
    max_tokens: 500,
};
const OVERALL_FEEDBACK_SAMPLING: Sampling = Sampling {
    temperature: 0.3,
    max_tokens: 1200,
};
const SUGGESTION_SAMPLING: Sampling = Sampling {
    temperature: 0.5,
    max_tokens: 800,
};

/// Stateless orchestrator over a completion client. Safe to share across
/// tasks; the only configuration it carries is the model id.
#[derive(Clone)]
pub struct AssessmentEngine {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl AssessmentEngine {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(
        &self,
        system: &str,
        prompt: &str,
        sampling: Sampling,
    ) -> Result<String, AssessmentError> {
        let text = self
            .client
            .complete(CompletionRequest {
                model: &self.model,
                system,
                prompt,
                temperature: sampling.temperature,
                max_tokens: sampling.max_tokens,
            })
            .await?;
        Ok(text)
    }

    async fn invoke_json<T: DeserializeOwned>(
        &self,
        role: &str,
        prompt: &str,
        sampling: Sampling,
    ) -> Result<T, AssessmentError> {
        let system = prompts::json_system(role);
        let text = self.invoke(&system, prompt, sampling).await?;
        schema::decode(&text)
    }

    /// Generates questions for a plain interview.
    ///
    /// A completion failure is returned as an error: there is no generic
    /// question set that stands in for an arbitrary skill/resume combination.
    /// Output with no usable blocks still falls back to the canonical pool.
    pub async fn generate_questions(
        &self,
        options: &GenerationOptions,
    ) -> Result<Vec<Question>, AssessmentError> {
        let prompt = prompts::question_prompt(options);
        let text = self
            .invoke(QUESTION_SYSTEM, &prompt, QUESTION_SAMPLING)
            .await
            .inspect_err(|e| warn!("Question generation failed: {e}"))?;

        let questions = tagged::parse_questions(&text, options);
        if questions.is_empty() {
            warn!("Question generation fell back: completion contained no question blocks");
            return Ok(fallback::questions(
                &options.skills,
                options.difficulty,
                options.question_type,
                options.question_count,
                options.time_per_question(),
            ));
        }

        debug!("Parsed {} generated questions", questions.len());
        Ok(questions)
    }

    /// Generates a mixed question set for an online interview. Never fails.
    pub async fn generate_online_interview_questions(
        &self,
        request: &OnlineQuestionRequest,
    ) -> Vec<Question> {
        let prompt = prompts::online_question_prompt(request);
        let result = self
            .invoke_json::<RawQuestionSet>(prompts::INTERVIEWER_ROLE, &prompt, QUESTION_SAMPLING)
            .await
            .and_then(|raw| schema::validate_questions(raw, request));

        match result {
            Ok(questions) => {
                debug!("Parsed {} online interview questions", questions.len());
                questions
            }
            Err(e) => {
                warn!("Online question generation fell back: {e}");
                fallback::questions(
                    &request.skills,
                    request.difficulty,
                    QuestionMix::Mixed,
                    request.question_count,
                    request.time_per_question(),
                )
            }
        }
    }

    /// Scores a single answer. Missing scores in the completion default to 5.
    pub async fn evaluate_answer(
        &self,
        question: &str,
        answer: &str,
        expected_answer: Option<&str>,
    ) -> EvaluationResult {
        let prompt = prompts::evaluation_prompt(question, answer, expected_answer);
        match self
            .invoke(EVALUATION_SYSTEM, &prompt, EVALUATION_SAMPLING)
            .await
        {
            Ok(text) => tagged::parse_evaluation(&text),
            Err(e) => {
                warn!("Answer evaluation fell back: {e}");
                fallback::evaluation()
            }
        }
    }

    /// Scores an answer against caller-supplied criteria.
    pub async fn assess_answer(
        &self,
        question: &str,
        answer: &str,
        criteria: &[String],
    ) -> AnswerAssessment {
        let prompt = prompts::assessment_prompt(question, answer, criteria);
        let result = self
            .invoke_json::<RawAssessment>(prompts::ASSESSOR_ROLE, &prompt, ASSESSMENT_SAMPLING)
            .await
            .and_then(|raw| schema::validate_assessment(raw, criteria));

        result.unwrap_or_else(|e| {
            warn!("Answer assessment fell back: {e}");
            fallback::assessment(criteria)
        })
    }

    /// Up to three follow-up questions probing the answer; empty on failure.
    pub async fn generate_follow_up(&self, question: &str, answer: &str) -> Vec<String> {
        let prompt = prompts::follow_up_prompt(question, answer);
        match self
            .invoke(FOLLOW_UP_SYSTEM, &prompt, FOLLOW_UP_SAMPLING)
            .await
        {
            Ok(text) => tagged::parse_follow_ups(&text),
            Err(e) => {
                warn!("Follow-up generation fell back: {e}");
                fallback::follow_ups()
            }
        }
    }

    pub async fn analyze_response(&self, answer: &str) -> ResponseAnalysis {
        let prompt = prompts::analysis_prompt(answer);
        let result = self
            .invoke_json::<RawAnalysis>(prompts::ANALYST_ROLE, &prompt, ANALYSIS_SAMPLING)
            .await
            .and_then(schema::validate_analysis);

        result.unwrap_or_else(|e| {
            warn!("Response analysis fell back: {e}");
            fallback::analysis()
        })
    }

    pub async fn generate_overall_feedback(
        &self,
        answers: &[AnsweredQuestion],
        skills: &[String],
    ) -> OverallFeedback {
        let prompt = prompts::overall_feedback_prompt(answers, skills);
        let result = self
            .invoke_json::<RawOverallFeedback>(
                prompts::HIRING_ROLE,
                &prompt,
                OVERALL_FEEDBACK_SAMPLING,
            )
            .await
            .and_then(schema::validate_overall_feedback);

        result.unwrap_or_else(|e| {
            warn!("Overall feedback fell back: {e}");
            fallback::overall_feedback(answers, skills)
        })
    }

    pub async fn generate_interviewer_suggestions(
        &self,
        profile: &CandidateProfile,
        current_question: Option<&str>,
        answered: u32,
    ) -> InterviewerSuggestion {
        let prompt = prompts::suggestion_prompt(profile, current_question, answered);
        let result = self
            .invoke_json::<RawSuggestion>(prompts::COACH_ROLE, &prompt, SUGGESTION_SAMPLING)
            .await
            .and_then(schema::validate_suggestion);

        result.unwrap_or_else(|e| {
            warn!("Interviewer suggestions fell back: {e}");
            fallback::suggestions()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::assessment::models::{
        CommunicationQuality, ConfidenceLevel, Difficulty, Experience, InterviewMode,
        QuestionCategory, Recommendation, Sentiment,
    };

    /// Canned completion client. Records every request it receives.
    struct StubClient {
        reply: Result<String, u16>,
        seen: Mutex<Vec<(String, String, f32, u32)>>,
    }

    impl StubClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push((
                request.model.to_string(),
                request.prompt.to_string(),
                request.temperature,
                request.max_tokens,
            ));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "service unavailable".to_string(),
                }),
            }
        }
    }

    fn engine(client: Arc<StubClient>) -> AssessmentEngine {
        AssessmentEngine::new(client, "test-model")
    }

    fn options(count: u32) -> GenerationOptions {
        GenerationOptions {
            skills: vec!["Rust".to_string(), "Tokio".to_string()],
            resume_text: None,
            difficulty: Difficulty::Intermediate,
            question_count: count,
            question_type: QuestionMix::Technical,
            experience: Experience::OneToThree,
            interview_mode: InterviewMode::InPerson,
            duration_minutes: 30,
        }
    }

    fn online_request(count: u32) -> OnlineQuestionRequest {
        OnlineQuestionRequest {
            skills: vec!["Go".to_string()],
            difficulty: Difficulty::Advanced,
            question_count: count,
            experience: Experience::FiveToTen,
            duration_minutes: 40,
        }
    }

    #[tokio::test]
    async fn test_generate_questions_propagates_completion_failure() {
        let result = engine(StubClient::failing(503))
            .generate_questions(&options(3))
            .await;
        assert!(matches!(result, Err(AssessmentError::Completion(_))));
    }

    #[tokio::test]
    async fn test_generate_questions_parses_blocks() {
        let stub = StubClient::replying(
            "Q: What is a future?\nExpected: poll, waker\n---\nQ: Explain Send.\n---\n",
        );
        let questions = engine(stub.clone())
            .generate_questions(&options(5))
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].expected_keywords, vec!["poll", "waker"]);
        assert_eq!(questions[1].skill, "Tokio");

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "test-model");
        assert!(seen[0].1.contains("Rust, Tokio"));
        assert_eq!(seen[0].2, 0.7);
    }

    #[tokio::test]
    async fn test_generate_questions_unparseable_output_falls_back() {
        let questions = engine(StubClient::replying("I'd rather not."))
            .generate_questions(&options(4))
            .await
            .unwrap();
        assert_eq!(questions.len(), 4);
        assert!(questions
            .iter()
            .all(|q| q.category == QuestionCategory::Technical));
    }

    #[tokio::test]
    async fn test_online_questions_never_exceed_count() {
        let text = r#"{"questions": [
            {"text": "A?", "type": "technical", "difficulty_score": 0},
            {"text": "B?", "type": "behavioral"},
            {"text": "C?", "type": "technical"}
        ]}"#;
        let questions = engine(StubClient::replying(text))
            .generate_online_interview_questions(&online_request(2))
            .await;
        assert_eq!(questions.len(), 2);
        for q in &questions {
            assert!(!q.text.is_empty());
            assert!((1..=10).contains(&q.difficulty_score));
        }
    }

    #[tokio::test]
    async fn test_online_questions_fall_back_on_failure() {
        let questions = engine(StubClient::failing(500))
            .generate_online_interview_questions(&online_request(3))
            .await;
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id, "fallback-1");
        assert_eq!(questions[0].difficulty_score, 7);
        assert_eq!(questions[0].time_limit_minutes, 13.0);
    }

    #[tokio::test]
    async fn test_online_questions_fall_back_on_prose() {
        let questions = engine(StubClient::replying("Here are your questions: 1. A"))
            .generate_online_interview_questions(&online_request(2))
            .await;
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.id.starts_with("fallback-")));
    }

    #[tokio::test]
    async fn test_evaluate_answer_parses_tagged_scores() {
        let text = "Score: 8\nTechnical Accuracy: 7\nCommunication: 9\nProblem Solving: 6\n\
                    Confidence: 8\nFeedback: Good answer. Consider edge cases.";
        let stub = StubClient::replying(text);
        let evaluation = engine(stub.clone())
            .evaluate_answer("What is RAII?", "Scope-bound cleanup.", None)
            .await;
        assert_eq!(evaluation.overall_score, 8);
        assert_eq!(evaluation.sub_scores.communication, 9);
        assert_eq!(evaluation.feedback, "Good answer. Consider edge cases.");
        assert_eq!(stub.seen.lock().unwrap()[0].2, 0.3);
    }

    #[tokio::test]
    async fn test_evaluate_answer_without_score_line_is_midpoint() {
        let evaluation = engine(StubClient::replying("Nice work overall."))
            .evaluate_answer("Q", "A", None)
            .await;
        assert_eq!(evaluation.overall_score, 5);
        for score in [
            evaluation.sub_scores.technical_accuracy,
            evaluation.sub_scores.communication,
            evaluation.sub_scores.problem_solving,
            evaluation.sub_scores.confidence,
        ] {
            assert!(score <= 10);
        }
    }

    #[tokio::test]
    async fn test_evaluate_answer_falls_back_on_failure() {
        let evaluation = engine(StubClient::failing(429))
            .evaluate_answer("Q", "A", Some("expected"))
            .await;
        assert_eq!(evaluation, fallback::evaluation());
    }

    #[tokio::test]
    async fn test_assess_answer_keyword_percent_in_range() {
        let text = r#"{"overall_score": 6, "criteria_scores": {"depth": 4},
                       "keyword_match_percent": -20}"#;
        let criteria = vec!["depth".to_string(), "clarity".to_string()];
        let assessment = engine(StubClient::replying(text))
            .assess_answer("Q", "A", &criteria)
            .await;
        assert_eq!(assessment.keyword_match_percent, 0);
        assert_eq!(assessment.overall_score, 6.0);
        assert_eq!(assessment.criteria_scores["clarity"], 5.0);

        let fallback = engine(StubClient::failing(500))
            .assess_answer("Q", "A", &criteria)
            .await;
        assert!(fallback.keyword_match_percent <= 100);
        assert_eq!(fallback.criteria_scores.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_follow_up() {
        let follow_ups = engine(StubClient::replying("1. Why?\n2. How?"))
            .generate_follow_up("Q", "A")
            .await;
        assert_eq!(follow_ups, vec!["Why?", "How?"]);

        let empty = engine(StubClient::failing(502))
            .generate_follow_up("Q", "A")
            .await;
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_response_malformed_json_falls_back() {
        let analysis = engine(StubClient::replying(r#"{"sentiment": "positive""#))
            .analyze_response("I optimized the query planner.")
            .await;
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert_eq!(analysis.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(analysis.clarity_score, 5);
        assert!(analysis.keywords.is_empty());
        assert_eq!(analysis.communication_quality, CommunicationQuality::Fair);
    }

    #[tokio::test]
    async fn test_analyze_response_valid_json() {
        let text = r#"{"sentiment":"positive","confidence_level":"high","clarity_score":8,
                      "keywords":["indexing"],"communication_quality":"good"}"#;
        let stub = StubClient::replying(text);
        let analysis = engine(stub.clone()).analyze_response("answer").await;
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.keywords, vec!["indexing"]);
        assert_eq!(stub.seen.lock().unwrap()[0].2, 0.2);
    }

    #[tokio::test]
    async fn test_overall_feedback_falls_back_on_wrong_shape() {
        let answers = vec![AnsweredQuestion {
            question: "Q1".to_string(),
            answer: "A1".to_string(),
            evaluation: Some(EvaluationResult {
                overall_score: 2,
                ..fallback::evaluation()
            }),
        }];
        let feedback = engine(StubClient::replying(r#"{"verdict": "hire"}"#))
            .generate_overall_feedback(&answers, &[])
            .await;
        assert_eq!(feedback.recommendation, Recommendation::StronglyNotRecommend);
    }

    #[tokio::test]
    async fn test_overall_feedback_valid_json() {
        let text = r#"{"overall_assessment": "Solid.", "strengths": ["a","b","c","d"],
                       "improvements": [], "recommendation": "recommend",
                       "technical_feedback": "Good Rust fundamentals."}"#;
        let feedback = engine(StubClient::replying(text))
            .generate_overall_feedback(&[], &["Rust".to_string()])
            .await;
        assert_eq!(feedback.recommendation, Recommendation::Recommend);
        assert_eq!(feedback.strengths.len(), 3);
    }

    #[tokio::test]
    async fn test_interviewer_suggestions_fall_back_on_failure() {
        let suggestion = engine(StubClient::failing(503))
            .generate_interviewer_suggestions(&CandidateProfile::default(), None, 0)
            .await;
        assert_eq!(suggestion.follow_up_questions.len(), 3);
        assert_eq!(suggestion.assessment_points.len(), 2);
        assert!(suggestion.red_flags.is_empty());
        assert_eq!(suggestion, fallback::suggestions());
    }

    #[tokio::test]
    async fn test_engine_is_shareable_across_tasks() {
        let engine = engine(StubClient::replying("Score: 9"));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .evaluate_answer(&format!("Q{i}"), "answer", None)
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().overall_score, 9);
        }
    }
}
