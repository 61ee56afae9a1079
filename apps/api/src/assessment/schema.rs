//! Embedded-JSON decoding with schema validation.
//!
//! The completion text is deserialized into permissive `Raw*` shapes (every
//! field optional, numbers as `f64`) and then validated into domain types.
//! A syntax error and a structurally wrong payload both come back as
//! `AssessmentError`, so the engine routes them to the same fallback.
//! No repair of malformed JSON is attempted beyond dropping code fences.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::assessment::engine::AssessmentError;
use crate::assessment::models::{
    AnswerAssessment, CommunicationQuality, ConfidenceLevel, InterviewerSuggestion,
    OnlineQuestionRequest, OverallFeedback, Question, QuestionCategory, QuestionMix,
    Recommendation, ResponseAnalysis, Sentiment, MIDPOINT_SCORE,
};
use crate::assessment::tagged::skill_at;
use crate::llm_client::strip_json_fences;

/// Most strengths or improvements kept in overall feedback.
pub const MAX_FEEDBACK_ITEMS: usize = 3;

/// Parses the whole completion text as a single JSON document.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, AssessmentError> {
    Ok(serde_json::from_str(strip_json_fences(text))?)
}

fn clamp_score(value: f64, min: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        min
    }
}

fn non_empty(items: Option<Vec<String>>) -> Vec<String> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Online questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawQuestionSet {
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default, alias = "question")]
    text: Option<String>,
    #[serde(default, rename = "type")]
    category: Option<String>,
    #[serde(default)]
    skill: Option<String>,
    #[serde(default, alias = "difficultyScore", alias = "difficulty")]
    difficulty_score: Option<f64>,
    #[serde(default, alias = "expectedKeywords")]
    expected_keywords: Option<Vec<String>>,
    #[serde(default, alias = "timeLimitMinutes", alias = "timeLimit")]
    time_limit_minutes: Option<f64>,
    #[serde(default, alias = "assessmentCriteria")]
    assessment_criteria: Option<Vec<String>>,
}

/// Validates an online question set. Items without text are dropped; the
/// result is truncated to the requested count and must not be empty.
pub fn validate_questions(
    raw: RawQuestionSet,
    request: &OnlineQuestionRequest,
) -> Result<Vec<Question>, AssessmentError> {
    let default_score = request.difficulty.default_score() as f64;

    let questions: Vec<Question> = raw
        .questions
        .into_iter()
        .filter_map(|mut q| {
            let text = q.text.take()?.trim().to_string();
            (!text.is_empty()).then_some((text, q))
        })
        .take(request.question_count as usize)
        .enumerate()
        .map(|(position, (text, q))| Question {
            id: Uuid::new_v4().to_string(),
            text,
            category: q
                .category
                .as_deref()
                .and_then(QuestionCategory::parse)
                .unwrap_or_else(|| QuestionMix::Mixed.category_at(position)),
            skill: q
                .skill
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| skill_at(&request.skills, position)),
            difficulty_score: clamp_score(q.difficulty_score.unwrap_or(default_score), 1.0, 10.0)
                .round() as u8,
            expected_keywords: non_empty(q.expected_keywords),
            time_limit_minutes: q
                .time_limit_minutes
                .filter(|t| t.is_finite() && *t > 0.0)
                .unwrap_or_else(|| request.time_per_question()),
            assessment_criteria: non_empty(q.assessment_criteria),
        })
        .collect();

    if questions.is_empty() {
        return Err(AssessmentError::Shape(
            "question set contained no usable questions".to_string(),
        ));
    }
    Ok(questions)
}

// ────────────────────────────────────────────────────────────────────────────
// Answer assessment
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawAssessment {
    #[serde(alias = "overallScore")]
    overall_score: f64,
    #[serde(default, alias = "criteriaScores")]
    criteria_scores: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    improvements: Option<Vec<String>>,
    #[serde(default)]
    feedback: Option<String>,
    #[serde(default, alias = "keywordMatchPercent", alias = "keywordMatch")]
    keyword_match_percent: Option<f64>,
}

/// Validates an answer assessment. Every requested criterion gets a score;
/// criteria the model skipped (or scored with a non-number) get the midpoint.
pub fn validate_assessment(
    raw: RawAssessment,
    criteria: &[String],
) -> Result<AnswerAssessment, AssessmentError> {
    let mut criteria_scores: BTreeMap<String, f32> = raw
        .criteria_scores
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| {
            let score = value.as_f64()?;
            Some((name, clamp_score(score, 0.0, 10.0) as f32))
        })
        .collect();

    for criterion in criteria {
        criteria_scores
            .entry(criterion.clone())
            .or_insert(MIDPOINT_SCORE as f32);
    }

    Ok(AnswerAssessment {
        overall_score: clamp_score(raw.overall_score, 0.0, 10.0) as f32,
        criteria_scores,
        strengths: non_empty(raw.strengths),
        improvements: non_empty(raw.improvements),
        feedback: raw.feedback.unwrap_or_default().trim().to_string(),
        keyword_match_percent: clamp_score(raw.keyword_match_percent.unwrap_or(0.0), 0.0, 100.0)
            .round() as u8,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Response analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    sentiment: Sentiment,
    #[serde(alias = "confidenceLevel")]
    confidence_level: ConfidenceLevel,
    #[serde(alias = "clarityScore")]
    clarity_score: f64,
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(alias = "communicationQuality")]
    communication_quality: CommunicationQuality,
}

pub fn validate_analysis(raw: RawAnalysis) -> Result<ResponseAnalysis, AssessmentError> {
    Ok(ResponseAnalysis {
        sentiment: raw.sentiment,
        confidence_level: raw.confidence_level,
        clarity_score: clamp_score(raw.clarity_score, 1.0, 10.0).round() as u8,
        keywords: non_empty(raw.keywords),
        communication_quality: raw.communication_quality,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Overall feedback
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawOverallFeedback {
    #[serde(alias = "overallAssessment")]
    overall_assessment: String,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    improvements: Option<Vec<String>>,
    recommendation: Recommendation,
    #[serde(default, alias = "technicalFeedback")]
    technical_feedback: Option<String>,
}

pub fn validate_overall_feedback(
    raw: RawOverallFeedback,
) -> Result<OverallFeedback, AssessmentError> {
    let overall_assessment = raw.overall_assessment.trim().to_string();
    if overall_assessment.is_empty() {
        return Err(AssessmentError::Shape(
            "overall_assessment is empty".to_string(),
        ));
    }

    let mut strengths = non_empty(raw.strengths);
    strengths.truncate(MAX_FEEDBACK_ITEMS);
    let mut improvements = non_empty(raw.improvements);
    improvements.truncate(MAX_FEEDBACK_ITEMS);

    Ok(OverallFeedback {
        overall_assessment,
        strengths,
        improvements,
        recommendation: raw.recommendation,
        technical_feedback: raw.technical_feedback.unwrap_or_default().trim().to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Interviewer suggestions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawSuggestion {
    #[serde(default, alias = "followUpQuestions")]
    follow_up_questions: Option<Vec<String>>,
    #[serde(default, alias = "assessmentPoints")]
    assessment_points: Option<Vec<String>>,
    #[serde(default, alias = "redFlags")]
    red_flags: Option<Vec<String>>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default, alias = "nextTopics")]
    next_topics: Option<Vec<String>>,
    #[serde(default, alias = "timeManagementNote", alias = "timeManagement")]
    time_management_note: Option<String>,
}

/// Validates interviewer suggestions. A payload with no follow-up questions
/// and no assessment points carries nothing usable and is rejected.
pub fn validate_suggestion(raw: RawSuggestion) -> Result<InterviewerSuggestion, AssessmentError> {
    let suggestion = InterviewerSuggestion {
        follow_up_questions: non_empty(raw.follow_up_questions),
        assessment_points: non_empty(raw.assessment_points),
        red_flags: non_empty(raw.red_flags),
        strengths: non_empty(raw.strengths),
        next_topics: non_empty(raw.next_topics),
        time_management_note: raw.time_management_note.unwrap_or_default().trim().to_string(),
    };

    if suggestion.follow_up_questions.is_empty() && suggestion.assessment_points.is_empty() {
        return Err(AssessmentError::Shape(
            "suggestions contained no follow-up questions or assessment points".to_string(),
        ));
    }
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::models::{Difficulty, Experience};

    fn online_request(count: u32) -> OnlineQuestionRequest {
        OnlineQuestionRequest {
            skills: vec!["Rust".to_string()],
            difficulty: Difficulty::Expert,
            question_count: count,
            experience: Experience::TenPlus,
            duration_minutes: 45,
        }
    }

    #[test]
    fn test_decode_rejects_truncated_json() {
        let result = decode::<RawAnalysis>(r#"{"sentiment": "positive""#);
        assert!(matches!(result, Err(AssessmentError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_prose_around_json() {
        let text = r#"Sure! Here is the analysis: {"sentiment": "positive"}"#;
        assert!(decode::<RawAnalysis>(text).is_err());
    }

    #[test]
    fn test_decode_accepts_fenced_json() {
        let text = "```json\n{\"sentiment\":\"negative\",\"confidence_level\":\"low\",\
                    \"clarity_score\":3,\"communication_quality\":\"poor\"}\n```";
        let raw = decode::<RawAnalysis>(text).unwrap();
        let analysis = validate_analysis(raw).unwrap();
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert!(analysis.keywords.is_empty());
    }

    #[test]
    fn test_analysis_rejects_unknown_enum_value() {
        let text = r#"{"sentiment":"ecstatic","confidence_level":"high",
                      "clarity_score":9,"communication_quality":"good"}"#;
        assert!(decode::<RawAnalysis>(text).is_err());
    }

    #[test]
    fn test_analysis_accepts_camel_case_and_clamps_clarity() {
        let text = r#"{"sentiment":"positive","confidenceLevel":"high","clarityScore":14,
                      "keywords":["tokio", " "],"communicationQuality":"excellent"}"#;
        let analysis = validate_analysis(decode(text).unwrap()).unwrap();
        assert_eq!(analysis.clarity_score, 10);
        assert_eq!(analysis.keywords, vec!["tokio"]);
        assert_eq!(analysis.confidence_level, ConfidenceLevel::High);
    }

    #[test]
    fn test_online_questions_validated_and_truncated() {
        let text = r#"{"questions": [
            {"text": "Explain Pin.", "type": "technical", "difficulty_score": 15,
             "expected_keywords": ["self-referential"], "time_limit_minutes": 8},
            {"text": "  ", "type": "technical"},
            {"question": "Describe a hard deadline.", "type": "weird"},
            {"text": "Extra question"}
        ]}"#;
        let raw: RawQuestionSet = decode(text).unwrap();
        let questions = validate_questions(raw, &online_request(2)).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].difficulty_score, 10);
        assert_eq!(questions[0].time_limit_minutes, 8.0);
        assert_eq!(questions[0].skill, "Rust");
        assert_eq!(questions[1].text, "Describe a hard deadline.");
        assert_eq!(questions[1].category, QuestionCategory::Behavioral);
        assert_eq!(questions[1].difficulty_score, 9);
        assert_eq!(questions[1].time_limit_minutes, 22.0);
    }

    #[test]
    fn test_online_questions_empty_set_is_shape_error() {
        let raw: RawQuestionSet = decode(r#"{"questions": []}"#).unwrap();
        assert!(matches!(
            validate_questions(raw, &online_request(3)),
            Err(AssessmentError::Shape(_))
        ));
    }

    #[test]
    fn test_online_questions_wrong_top_level_shape() {
        assert!(decode::<RawQuestionSet>(r#"[{"text": "Q"}]"#).is_err());
    }

    #[test]
    fn test_assessment_fills_missing_criteria_and_clamps() {
        let text = r#"{"overall_score": 11.5,
                       "criteria_scores": {"accuracy": 8, "depth": "high"},
                       "strengths": ["precise"],
                       "feedback": " Good. ",
                       "keyword_match_percent": 140.2}"#;
        let criteria = vec!["accuracy".to_string(), "depth".to_string(), "clarity".to_string()];
        let assessment = validate_assessment(decode(text).unwrap(), &criteria).unwrap();

        assert_eq!(assessment.overall_score, 10.0);
        assert_eq!(assessment.criteria_scores["accuracy"], 8.0);
        assert_eq!(assessment.criteria_scores["depth"], 5.0);
        assert_eq!(assessment.criteria_scores["clarity"], 5.0);
        assert_eq!(assessment.feedback, "Good.");
        assert_eq!(assessment.keyword_match_percent, 100);
        assert!(assessment.improvements.is_empty());
    }

    #[test]
    fn test_assessment_requires_overall_score() {
        assert!(decode::<RawAssessment>(r#"{"feedback": "ok"}"#).is_err());
    }

    #[test]
    fn test_overall_feedback_truncates_to_three() {
        let text = r#"{"overall_assessment": "Strong backend candidate.",
                       "strengths": ["a", "b", "c", "d"],
                       "improvements": ["x"],
                       "recommendation": "strongly_recommend"}"#;
        let feedback = validate_overall_feedback(decode(text).unwrap()).unwrap();
        assert_eq!(feedback.strengths, vec!["a", "b", "c"]);
        assert_eq!(feedback.recommendation, Recommendation::StronglyRecommend);
        assert!(feedback.technical_feedback.is_empty());
    }

    #[test]
    fn test_overall_feedback_rejects_blank_assessment() {
        let text = r#"{"overall_assessment": " ", "recommendation": "neutral"}"#;
        assert!(validate_overall_feedback(decode(text).unwrap()).is_err());
    }

    #[test]
    fn test_suggestion_defaults_missing_lists() {
        let text = r#"{"followUpQuestions": ["Why Redis?"], "time_management_note": "On track."}"#;
        let suggestion = validate_suggestion(decode(text).unwrap()).unwrap();
        assert_eq!(suggestion.follow_up_questions, vec!["Why Redis?"]);
        assert!(suggestion.red_flags.is_empty());
        assert!(suggestion.next_topics.is_empty());
        assert_eq!(suggestion.time_management_note, "On track.");
    }

    #[test]
    fn test_suggestion_with_nothing_usable_is_rejected() {
        assert!(validate_suggestion(decode("{}").unwrap()).is_err());
    }
}
