//! Value types shared by the assessment engine, its parsers, and the HTTP layer.
//!
//! Everything here is created fresh per call and owned by whoever receives it.
//! JSON field names are snake_case; enums serialize as their lowercase wire names.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Lowest and highest value of every 0–10 score.
pub const SCORE_MIN: u8 = 0;
pub const SCORE_MAX: u8 = 10;
/// Substituted for any score that is missing or unparseable.
pub const MIDPOINT_SCORE: u8 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Generation options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Expert => "expert",
        }
    }

    /// Default 1–10 difficulty score assigned to questions at this level.
    pub fn default_score(&self) -> u8 {
        match self {
            Difficulty::Beginner => 3,
            Difficulty::Intermediate => 5,
            Difficulty::Advanced => 7,
            Difficulty::Expert => 9,
        }
    }
}

/// The mix of questions a caller asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionMix {
    Technical,
    Behavioral,
    #[default]
    Mixed,
}

impl QuestionMix {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionMix::Technical => "technical",
            QuestionMix::Behavioral => "behavioral",
            QuestionMix::Mixed => "mixed",
        }
    }

    /// Category of the question at `position` in a generated set.
    /// Mixed sets alternate, starting with technical.
    pub fn category_at(&self, position: usize) -> QuestionCategory {
        match self {
            QuestionMix::Technical => QuestionCategory::Technical,
            QuestionMix::Behavioral => QuestionCategory::Behavioral,
            QuestionMix::Mixed if position % 2 == 0 => QuestionCategory::Technical,
            QuestionMix::Mixed => QuestionCategory::Behavioral,
        }
    }
}

/// The category of a single generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Technical,
    Behavioral,
}

impl QuestionCategory {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "technical" => Some(QuestionCategory::Technical),
            "behavioral" | "behavioural" => Some(QuestionCategory::Behavioral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Experience {
    #[serde(rename = "fresher")]
    Fresher,
    #[default]
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
    #[serde(rename = "5-10")]
    FiveToTen,
    #[serde(rename = "10+")]
    TenPlus,
}

impl Experience {
    /// Human-readable label embedded in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Experience::Fresher => "fresher (no professional experience)",
            Experience::OneToThree => "1-3 years",
            Experience::ThreeToFive => "3-5 years",
            Experience::FiveToTen => "5-10 years",
            Experience::TenPlus => "10+ years",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewMode {
    #[default]
    #[serde(rename = "online")]
    Online,
    #[serde(rename = "in-person")]
    InPerson,
}

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Online => "online",
            InterviewMode::InPerson => "in-person",
        }
    }
}

/// Configuration for the plain question-generation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub question_count: u32,
    #[serde(default)]
    pub question_type: QuestionMix,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub interview_mode: InterviewMode,
    pub duration_minutes: u32,
}

impl GenerationOptions {
    /// Checks the numeric invariants. Empty skills are allowed (generic questions).
    pub fn validate(&self) -> Result<(), String> {
        if self.question_count == 0 {
            return Err("question_count must be at least 1".to_string());
        }
        if self.duration_minutes == 0 {
            return Err("duration_minutes must be at least 1".to_string());
        }
        Ok(())
    }

    /// Per-question time budget derived from the session duration.
    pub fn time_per_question(&self) -> f64 {
        time_per_question(self.duration_minutes, self.question_count)
    }
}

/// Request for the online-interview question set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineQuestionRequest {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub question_count: u32,
    #[serde(default)]
    pub experience: Experience,
    pub duration_minutes: u32,
}

impl OnlineQuestionRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.question_count == 0 {
            return Err("question_count must be at least 1".to_string());
        }
        if self.duration_minutes == 0 {
            return Err("duration_minutes must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn time_per_question(&self) -> f64 {
        time_per_question(self.duration_minutes, self.question_count)
    }
}

fn time_per_question(duration_minutes: u32, question_count: u32) -> f64 {
    (duration_minutes / question_count.max(1)).max(1) as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// A single interview question. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub category: QuestionCategory,
    pub skill: String,
    /// 1–10
    pub difficulty_score: u8,
    pub expected_keywords: Vec<String>,
    pub time_limit_minutes: f64,
    pub assessment_criteria: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    #[serde(deserialize_with = "clamped_score")]
    pub technical_accuracy: u8,
    #[serde(deserialize_with = "clamped_score")]
    pub communication: u8,
    #[serde(deserialize_with = "clamped_score")]
    pub problem_solving: u8,
    #[serde(deserialize_with = "clamped_score")]
    pub confidence: u8,
}

impl Default for SubScores {
    fn default() -> Self {
        Self {
            technical_accuracy: MIDPOINT_SCORE,
            communication: MIDPOINT_SCORE,
            problem_solving: MIDPOINT_SCORE,
            confidence: MIDPOINT_SCORE,
        }
    }
}

/// Score and feedback for a single answer. Every score is within 0–10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(deserialize_with = "clamped_score")]
    pub overall_score: u8,
    pub sub_scores: SubScores,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl EvaluationResult {
    /// Overall score pulled into 0–10, for results built in-process.
    pub fn bounded_score(&self) -> u8 {
        self.overall_score.min(SCORE_MAX)
    }
}

/// Reads any JSON number as a 0–10 score. Evaluations come back from
/// callers (stored sessions, edited payloads), so the range is enforced here.
fn clamped_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Ok(MIDPOINT_SCORE);
    }
    Ok(value.clamp(SCORE_MIN as f64, SCORE_MAX as f64).round() as u8)
}

/// Answer assessment against caller-supplied criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerAssessment {
    /// 0.0 – 10.0
    pub overall_score: f32,
    /// criterion → 0.0 – 10.0
    pub criteria_scores: BTreeMap<String, f32>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub feedback: String,
    /// 0 – 100
    pub keyword_match_percent: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseAnalysis {
    pub sentiment: Sentiment,
    pub confidence_level: ConfidenceLevel,
    /// 1–10
    pub clarity_score: u8,
    pub keywords: Vec<String>,
    pub communication_quality: CommunicationQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StronglyRecommend,
    Recommend,
    Neutral,
    NotRecommend,
    StronglyNotRecommend,
}

impl Recommendation {
    /// Maps an average 0–10 score to a hiring recommendation.
    pub fn from_average(average: f32) -> Self {
        if average >= 8.0 {
            Recommendation::StronglyRecommend
        } else if average >= 6.5 {
            Recommendation::Recommend
        } else if average >= 5.0 {
            Recommendation::Neutral
        } else if average >= 3.0 {
            Recommendation::NotRecommend
        } else {
            Recommendation::StronglyNotRecommend
        }
    }
}

/// Whole-session feedback. `strengths` and `improvements` hold at most three items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallFeedback {
    pub overall_assessment: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendation: Recommendation,
    pub technical_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewerSuggestion {
    pub follow_up_questions: Vec<String>,
    pub assessment_points: Vec<String>,
    pub red_flags: Vec<String>,
    pub strengths: Vec<String>,
    pub next_topics: Vec<String>,
    pub time_management_note: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Operation inputs
// ────────────────────────────────────────────────────────────────────────────

/// One asked question with the candidate's answer and its evaluation, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub evaluation: Option<EvaluationResult>,
}

/// What the interviewer knows about the candidate during a live session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Experience,
    #[serde(default)]
    pub resume_summary: Option<String>,
}
