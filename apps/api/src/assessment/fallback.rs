//! Fallback synthesis — deterministic stand-ins returned when the completion
//! service fails or its output cannot be decoded.
//!
//! Every function here is pure: the same inputs always give deep-equal output,
//! and every result satisfies the full structural contract of its type.

use crate::assessment::models::{
    AnswerAssessment, AnsweredQuestion, CommunicationQuality, ConfidenceLevel, Difficulty,
    EvaluationResult, InterviewerSuggestion, OverallFeedback, Question, QuestionCategory,
    QuestionMix, Recommendation, ResponseAnalysis, Sentiment, SubScores, MIDPOINT_SCORE,
};
use crate::assessment::tagged::skill_at;

const TECHNICAL_TEMPLATES: &[&str] = &[
    "Walk me through a non-trivial problem you solved using {skill}. What trade-offs did you weigh?",
    "What are the most common mistakes people make with {skill}, and how do you avoid them?",
    "How would you explain the core concepts of {skill} to a new team member?",
];

const BEHAVIORAL_TEMPLATES: &[&str] = &[
    "Tell me about a time a project involving {skill} did not go as planned. What did you do?",
    "Describe a situation where you had to learn {skill} quickly to deliver on a deadline.",
];

const TECHNICAL_CRITERIA: &[&str] = &["technical accuracy", "depth of understanding", "clarity"];
const BEHAVIORAL_CRITERIA: &[&str] = &["situation and context", "actions taken", "outcome"];

/// Builds exactly `count` questions from the canonical template pool,
/// cycling through `skills` ("general" when empty).
pub fn questions(
    skills: &[String],
    difficulty: Difficulty,
    mix: QuestionMix,
    count: u32,
    time_limit_minutes: f64,
) -> Vec<Question> {
    (0..count as usize)
        .map(|position| {
            let category = mix.category_at(position);
            let skill = skill_at(skills, position);
            let (templates, criteria) = match category {
                QuestionCategory::Technical => (TECHNICAL_TEMPLATES, TECHNICAL_CRITERIA),
                QuestionCategory::Behavioral => (BEHAVIORAL_TEMPLATES, BEHAVIORAL_CRITERIA),
            };
            // Each skill gets a new template once the skill list wraps around.
            let round = position / skills.len().max(1);
            let template = templates[round % templates.len()];

            Question {
                id: format!("fallback-{}", position + 1),
                text: template.replace("{skill}", &skill),
                category,
                expected_keywords: if skill == "general" {
                    vec![]
                } else {
                    vec![skill.clone()]
                },
                skill,
                difficulty_score: difficulty.default_score(),
                time_limit_minutes,
                assessment_criteria: criteria.iter().map(|c| c.to_string()).collect(),
            }
        })
        .collect()
}

pub fn evaluation() -> EvaluationResult {
    EvaluationResult {
        overall_score: MIDPOINT_SCORE,
        sub_scores: SubScores::default(),
        feedback: "Automatic evaluation is unavailable for this answer. \
            A neutral score has been recorded; please review the answer manually."
            .to_string(),
        strengths: vec![],
        improvements: vec![],
    }
}

/// Midpoint scores for every requested criterion.
pub fn assessment(criteria: &[String]) -> AnswerAssessment {
    AnswerAssessment {
        overall_score: MIDPOINT_SCORE as f32,
        criteria_scores: criteria
            .iter()
            .map(|c| (c.clone(), MIDPOINT_SCORE as f32))
            .collect(),
        strengths: vec![],
        improvements: vec![
            "Provide concrete examples to support the answer.".to_string(),
        ],
        feedback: "Automatic assessment is unavailable for this answer. \
            Scores default to the midpoint pending manual review."
            .to_string(),
        keyword_match_percent: 0,
    }
}

pub fn follow_ups() -> Vec<String> {
    vec![]
}

pub fn analysis() -> ResponseAnalysis {
    ResponseAnalysis {
        sentiment: Sentiment::Neutral,
        confidence_level: ConfidenceLevel::Medium,
        clarity_score: MIDPOINT_SCORE,
        keywords: vec![],
        communication_quality: CommunicationQuality::Fair,
    }
}

/// Session summary derived from whatever evaluations the caller supplied.
pub fn overall_feedback(answers: &[AnsweredQuestion], skills: &[String]) -> OverallFeedback {
    let scores: Vec<f32> = answers
        .iter()
        .filter_map(|qa| qa.evaluation.as_ref())
        .map(|e| e.bounded_score() as f32)
        .collect();
    let answered = answers
        .iter()
        .filter(|qa| !qa.answer.trim().is_empty())
        .count();

    let (overall_assessment, recommendation) = if scores.is_empty() {
        (
            format!(
                "The candidate answered {answered} of {} questions. \
                No scored answers were available for an automatic summary.",
                answers.len()
            ),
            Recommendation::Neutral,
        )
    } else {
        let average = scores.iter().sum::<f32>() / scores.len() as f32;
        (
            format!(
                "The candidate answered {answered} of {} questions with an average score of {average:.1}/10.",
                answers.len()
            ),
            Recommendation::from_average(average),
        )
    };

    let technical_feedback = if skills.is_empty() {
        "No specific skills were listed for this interview.".to_string()
    } else {
        format!("Skills assessed: {}.", skills.join(", "))
    };

    OverallFeedback {
        overall_assessment,
        strengths: vec![],
        improvements: vec!["Review individual answers for detailed feedback.".to_string()],
        recommendation,
        technical_feedback,
    }
}

pub fn suggestions() -> InterviewerSuggestion {
    InterviewerSuggestion {
        follow_up_questions: vec![
            "Can you walk me through a specific example of that?".to_string(),
            "What would you do differently if you faced the same problem again?".to_string(),
            "How did you measure whether your approach worked?".to_string(),
        ],
        assessment_points: vec![
            "Depth of understanding beyond surface-level definitions".to_string(),
            "Clarity and structure of the explanation".to_string(),
        ],
        red_flags: vec![],
        strengths: vec![],
        next_topics: vec![],
        time_management_note: "Aim to keep each question to about five minutes and leave \
            time at the end for the candidate's questions."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills() -> Vec<String> {
        vec!["Rust".to_string(), "Kubernetes".to_string()]
    }

    #[test]
    fn test_fallback_evaluation_is_pure() {
        assert_eq!(evaluation(), evaluation());
        let e = evaluation();
        assert_eq!(e.overall_score, 5);
        assert_eq!(e.sub_scores, SubScores::default());
        assert!(!e.feedback.is_empty());
    }

    #[test]
    fn test_fallback_questions_padded_to_count() {
        let qs = questions(&skills(), Difficulty::Advanced, QuestionMix::Mixed, 5, 6.0);
        assert_eq!(qs.len(), 5);
        assert_eq!(qs[0].category, QuestionCategory::Technical);
        assert_eq!(qs[1].category, QuestionCategory::Behavioral);
        assert_eq!(qs[0].skill, "Rust");
        assert_eq!(qs[1].skill, "Kubernetes");
        assert_eq!(qs[2].skill, "Rust");
        assert_ne!(qs[0].text, qs[2].text, "wrapped skills get a new template");
        for q in &qs {
            assert!(!q.text.is_empty());
            assert!(!q.text.contains("{skill}"));
            assert!((1..=10).contains(&q.difficulty_score));
            assert_eq!(q.time_limit_minutes, 6.0);
        }
    }

    #[test]
    fn test_fallback_questions_are_deterministic() {
        let a = questions(&skills(), Difficulty::Beginner, QuestionMix::Technical, 3, 5.0);
        let b = questions(&skills(), Difficulty::Beginner, QuestionMix::Technical, 3, 5.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_questions_without_skills_are_general() {
        let qs = questions(&[], Difficulty::Intermediate, QuestionMix::Behavioral, 2, 10.0);
        assert!(qs.iter().all(|q| q.skill == "general"));
        assert!(qs.iter().all(|q| q.expected_keywords.is_empty()));
        assert!(qs.iter().all(|q| q.category == QuestionCategory::Behavioral));
    }

    #[test]
    fn test_fallback_assessment_scores_each_criterion() {
        let criteria = vec!["accuracy".to_string(), "clarity".to_string()];
        let a = assessment(&criteria);
        assert_eq!(a.criteria_scores.len(), 2);
        assert!(a.criteria_scores.values().all(|s| *s == 5.0));
        assert_eq!(a.keyword_match_percent, 0);
    }

    #[test]
    fn test_fallback_analysis_values() {
        let a = analysis();
        assert_eq!(a.sentiment, Sentiment::Neutral);
        assert_eq!(a.confidence_level, ConfidenceLevel::Medium);
        assert_eq!(a.clarity_score, 5);
        assert!(a.keywords.is_empty());
        assert_eq!(a.communication_quality, CommunicationQuality::Fair);
    }

    #[test]
    fn test_fallback_overall_feedback_uses_average() {
        let mut high = evaluation();
        high.overall_score = 9;
        let mut mid = evaluation();
        mid.overall_score = 7;
        let answers = vec![
            AnsweredQuestion {
                question: "Q1".to_string(),
                answer: "A1".to_string(),
                evaluation: Some(high),
            },
            AnsweredQuestion {
                question: "Q2".to_string(),
                answer: "A2".to_string(),
                evaluation: Some(mid),
            },
            AnsweredQuestion {
                question: "Q3".to_string(),
                answer: String::new(),
                evaluation: None,
            },
        ];
        let feedback = overall_feedback(&answers, &skills());
        assert_eq!(feedback.recommendation, Recommendation::StronglyRecommend);
        assert!(feedback.overall_assessment.contains("answered 2 of 3"));
        assert!(feedback.overall_assessment.contains("8.0/10"));
        assert_eq!(feedback.technical_feedback, "Skills assessed: Rust, Kubernetes.");
        assert!(feedback.strengths.len() <= 3 && feedback.improvements.len() <= 3);
    }

    #[test]
    fn test_fallback_overall_feedback_caps_out_of_range_scores() {
        let mut inflated = evaluation();
        inflated.overall_score = 200;
        let answers = vec![AnsweredQuestion {
            question: "Q1".to_string(),
            answer: "A1".to_string(),
            evaluation: Some(inflated),
        }];
        let feedback = overall_feedback(&answers, &[]);
        assert!(feedback.overall_assessment.contains("average score of 10.0/10"));
    }

    #[test]
    fn test_fallback_overall_feedback_from_payload_with_inflated_score() {
        let json = r#"[{"question": "Q1", "answer": "A1", "evaluation": {
            "overall_score": 200,
            "sub_scores": {"technical_accuracy": 5, "communication": 5,
                           "problem_solving": 5, "confidence": 5},
            "feedback": "", "strengths": [], "improvements": []}}]"#;
        let answers: Vec<AnsweredQuestion> = serde_json::from_str(json).unwrap();
        let feedback = overall_feedback(&answers, &[]);
        assert!(!feedback.overall_assessment.contains("200"));
        assert!(feedback.overall_assessment.contains("10.0/10"));
    }

    #[test]
    fn test_fallback_overall_feedback_without_scores_is_neutral() {
        let feedback = overall_feedback(&[], &[]);
        assert_eq!(feedback.recommendation, Recommendation::Neutral);
    }

    #[test]
    fn test_fallback_suggestions_shape() {
        let s = suggestions();
        assert_eq!(s.follow_up_questions.len(), 3);
        assert_eq!(s.assessment_points.len(), 2);
        assert!(s.red_flags.is_empty());
        assert_eq!(s, suggestions());
    }
}
