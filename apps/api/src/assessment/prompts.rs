// All LLM prompt constants and builders for the assessment engine.
// Builders are pure: they only substitute caller data into a template.

use crate::assessment::models::{
    AnsweredQuestion, CandidateProfile, GenerationOptions, OnlineQuestionRequest,
};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

/// System role for question generation in the line-tagged format.
pub const QUESTION_SYSTEM: &str = "You are an experienced technical interviewer. \
    You write clear, specific interview questions calibrated to the candidate's level. \
    Follow the requested output format exactly.";

/// System role for single-answer scoring in the line-tagged format.
pub const EVALUATION_SYSTEM: &str = "You are a fair, rigorous interview assessor. \
    You score answers consistently on a 0-10 scale and give actionable feedback. \
    Follow the requested output format exactly.";

/// System role for follow-up generation.
pub const FOLLOW_UP_SYSTEM: &str = "You are an experienced interviewer who digs into answers \
    for depth. Respond with questions only, one per line.";

/// System role for every operation that expects a JSON payload.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}

pub const ANALYST_ROLE: &str = "You are an expert in communication and interview analysis.";
pub const ASSESSOR_ROLE: &str = "You are a fair, rigorous interview assessor.";
pub const HIRING_ROLE: &str = "You are a senior hiring manager summarizing an interview.";
pub const COACH_ROLE: &str = "You are an interview coach advising a live interviewer.";
pub const INTERVIEWER_ROLE: &str = "You are an experienced technical interviewer.";

const QUESTION_PROMPT_TEMPLATE: &str = r#"Generate {count} {question_type} interview questions for a {mode} interview.

Candidate experience: {experience}
Difficulty: {difficulty}
Interview duration: {duration} minutes
Skills to cover: {skills}
{resume_section}
Write each question as a block in this EXACT format, separating blocks with a line containing only ---

Q: <the question text>
Type: <technical or behavioral>
Skill: <the single skill this question targets, or general>
Expected: <comma-separated keywords a strong answer mentions>
Criteria: <comma-separated criteria for assessing the answer>
---

Rules:
1. Every block MUST start with "Q:"
2. Match the question difficulty to the candidate experience
3. Spread the questions across the listed skills
4. Do NOT number the questions or add any text outside the blocks"#;

const ONLINE_QUESTION_PROMPT_TEMPLATE: &str = r#"Generate {count} interview questions for an online interview.

Candidate experience: {experience}
Difficulty: {difficulty}
Interview duration: {duration} minutes (about {per_question} minutes per question)
Skills to cover: {skills}

Mix technical and behavioral questions. Return a JSON object with this EXACT schema:
{
  "questions": [
    {
      "text": "How would you design a rate limiter for a public API?",
      "type": "technical",
      "skill": "system design",
      "difficulty_score": 6,
      "expected_keywords": ["token bucket", "sliding window"],
      "time_limit_minutes": 5,
      "assessment_criteria": ["correctness", "trade-off awareness"]
    }
  ]
}

Rules:
1. "type" is exactly "technical" or "behavioral"
2. "difficulty_score" is an integer from 1 to 10
3. Return exactly {count} questions"#;

const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate's answer to the interview question below.

QUESTION:
{question}

CANDIDATE ANSWER:
{answer}
{expected_section}
Respond in this EXACT format, one field per line, every score an integer from 0 to 10:

Score: <overall score>
Technical Accuracy: <score>
Communication: <score>
Problem Solving: <score>
Confidence: <score>
Strengths: <semicolon-separated strengths>
Improvements: <semicolon-separated improvements>
Feedback: <two or three sentences of feedback for the candidate>"#;

const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"Assess the candidate's answer against the listed criteria.

QUESTION:
{question}

CANDIDATE ANSWER:
{answer}

CRITERIA:
{criteria}

Return a JSON object with this EXACT schema:
{
  "overall_score": 7,
  "criteria_scores": {"<criterion>": 7},
  "strengths": ["..."],
  "improvements": ["..."],
  "feedback": "...",
  "keyword_match_percent": 60
}

Rules:
1. Every score is a number from 0 to 10
2. "criteria_scores" has one entry per listed criterion, keyed by the criterion text
3. "keyword_match_percent" is an integer from 0 to 100: the share of key concepts the answer covers"#;

const FOLLOW_UP_PROMPT_TEMPLATE: &str = r#"The candidate was asked:
{question}

They answered:
{answer}

Write 2 or 3 short follow-up questions that dig into the weakest or vaguest part of this answer.
Put each question on its own line. Do not add any other text."#;

const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the tone and clarity of this interview answer:

{answer}

Return a JSON object with this EXACT schema:
{
  "sentiment": "positive" | "neutral" | "negative",
  "confidence_level": "high" | "medium" | "low",
  "clarity_score": 7,
  "keywords": ["..."],
  "communication_quality": "excellent" | "good" | "fair" | "poor"
}

"clarity_score" is an integer from 1 to 10. "keywords" lists the key technical terms used."#;

const OVERALL_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Summarize this interview and make a hiring recommendation.

Skills assessed: {skills}

INTERVIEW TRANSCRIPT:
{transcript}

Return a JSON object with this EXACT schema:
{
  "overall_assessment": "...",
  "strengths": ["...", "...", "..."],
  "improvements": ["...", "...", "..."],
  "recommendation": "strongly_recommend" | "recommend" | "neutral" | "not_recommend" | "strongly_not_recommend",
  "technical_feedback": "..."
}

List at most 3 strengths and at most 3 improvements."#;

const SUGGESTION_PROMPT_TEMPLATE: &str = r#"You are assisting an interviewer during a live interview.

CANDIDATE:
{profile}

Current question: {current_question}
Questions answered so far: {answered}

Return a JSON object with this EXACT schema:
{
  "follow_up_questions": ["..."],
  "assessment_points": ["..."],
  "red_flags": ["..."],
  "strengths": ["..."],
  "next_topics": ["..."],
  "time_management_note": "..."
}

Keep every item to one sentence. Use empty arrays where nothing applies."#;

/// Builds the line-tagged question generation prompt.
pub fn question_prompt(options: &GenerationOptions) -> String {
    let resume_section = match options.resume_text.as_deref().map(str::trim) {
        Some(resume) if !resume.is_empty() => format!(
            "\nCandidate resume (tailor questions to it):\n{resume}\n"
        ),
        _ => String::new(),
    };

    fill(
        QUESTION_PROMPT_TEMPLATE,
        &[
            ("count", &options.question_count.to_string()),
            ("question_type", options.question_type.as_str()),
            ("mode", options.interview_mode.as_str()),
            ("experience", options.experience.label()),
            ("difficulty", options.difficulty.as_str()),
            ("duration", &options.duration_minutes.to_string()),
            ("skills", &skills_list(&options.skills)),
            ("resume_section", &resume_section),
        ],
    )
}

/// Builds the JSON question prompt for online interviews.
pub fn online_question_prompt(request: &OnlineQuestionRequest) -> String {
    fill(
        ONLINE_QUESTION_PROMPT_TEMPLATE,
        &[
            ("count", &request.question_count.to_string()),
            ("experience", request.experience.label()),
            ("difficulty", request.difficulty.as_str()),
            ("duration", &request.duration_minutes.to_string()),
            ("per_question", &request.time_per_question().to_string()),
            ("skills", &skills_list(&request.skills)),
        ],
    )
}

pub fn evaluation_prompt(question: &str, answer: &str, expected_answer: Option<&str>) -> String {
    let expected_section = match expected_answer.map(str::trim) {
        Some(expected) if !expected.is_empty() => {
            format!("\nREFERENCE ANSWER (for comparison only):\n{expected}\n")
        }
        _ => String::new(),
    };

    fill(
        EVALUATION_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("answer", answer),
            ("expected_section", &expected_section),
        ],
    )
}

pub fn assessment_prompt(question: &str, answer: &str, criteria: &[String]) -> String {
    let criteria = if criteria.is_empty() {
        "- overall quality".to_string()
    } else {
        criteria
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    fill(
        ASSESSMENT_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("answer", answer),
            ("criteria", &criteria),
        ],
    )
}

pub fn follow_up_prompt(question: &str, answer: &str) -> String {
    fill(
        FOLLOW_UP_PROMPT_TEMPLATE,
        &[
            ("question", question),
            ("answer", answer),
        ],
    )
}

pub fn analysis_prompt(answer: &str) -> String {
    fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("answer", answer),
        ],
    )
}

pub fn overall_feedback_prompt(answers: &[AnsweredQuestion], skills: &[String]) -> String {
    let transcript = if answers.is_empty() {
        "(no questions were answered)".to_string()
    } else {
        answers
            .iter()
            .enumerate()
            .map(|(i, qa)| {
                let score = qa
                    .evaluation
                    .as_ref()
                    .map(|e| format!("{}/10", e.bounded_score()))
                    .unwrap_or_else(|| "not scored".to_string());
                format!(
                    "Q{}: {}\nA{}: {}\nScore: {}",
                    i + 1,
                    qa.question,
                    i + 1,
                    if qa.answer.trim().is_empty() {
                        "(no answer)"
                    } else {
                        qa.answer.as_str()
                    },
                    score
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    fill(
        OVERALL_FEEDBACK_PROMPT_TEMPLATE,
        &[
            ("skills", &skills_list(skills)),
            ("transcript", &transcript),
        ],
    )
}

pub fn suggestion_prompt(
    profile: &CandidateProfile,
    current_question: Option<&str>,
    answered: u32,
) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &profile.name {
        lines.push(format!("Name: {name}"));
    }
    if let Some(position) = &profile.position {
        lines.push(format!("Position: {position}"));
    }
    lines.push(format!("Experience: {}", profile.experience.label()));
    lines.push(format!("Skills: {}", skills_list(&profile.skills)));
    if let Some(summary) = &profile.resume_summary {
        lines.push(format!("Resume summary: {summary}"));
    }

    fill(
        SUGGESTION_PROMPT_TEMPLATE,
        &[
            ("profile", &lines.join("\n")),
            ("current_question", current_question.unwrap_or("(none yet)")),
            ("answered", &answered.to_string()),
        ],
    )
}

/// Fills `{name}` placeholders in one left-to-right pass over the template.
/// Substituted values are never rescanned, so caller text containing a
/// placeholder token is embedded as-is. Unknown `{...}` runs are kept.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn skills_list(skills: &[String]) -> String {
    if skills.is_empty() {
        "general software engineering".to_string()
    } else {
        skills.join(", ")
    }
}
