//! Line-tagged decoding for question and evaluation completions.
//!
//! The model writes one field per line behind a literal tag (`Score: 8`).
//! Each output type declares a tag table; the scanner matches tags
//! case-insensitively at the start of a trimmed line and hands the remainder
//! to the tag's setter. Unknown lines are ignored unless they follow a
//! continuing tag (`Feedback:`), in which case they extend that field.
//!
//! Decoding never fails. Missing numeric fields keep the midpoint score.

use uuid::Uuid;

use crate::assessment::models::{
    EvaluationResult, GenerationOptions, Question, QuestionCategory, SubScores, MIDPOINT_SCORE,
    SCORE_MAX, SCORE_MIN,
};

/// Line that separates multi-item outputs.
const BLOCK_DELIMITER: &str = "---";
/// Most follow-up questions returned for one answer.
pub const MAX_FOLLOW_UPS: usize = 3;

/// One entry of a tag table.
pub struct Tag<T> {
    pub prefix: &'static str,
    pub apply: fn(&mut T, &str),
    /// Unrecognized lines after this tag are fed to `apply` as well.
    pub continues: bool,
}

/// Scans `block` line by line, dispatching tagged lines through `table`.
pub fn scan<T>(block: &str, table: &[Tag<T>], target: &mut T) {
    let mut continuing: Option<&Tag<T>> = None;

    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match table.iter().find(|tag| has_prefix(line, tag.prefix)) {
            Some(tag) => {
                (tag.apply)(target, line[tag.prefix.len()..].trim());
                if tag.continues {
                    continuing = Some(tag);
                }
            }
            None => {
                if let Some(tag) = continuing {
                    (tag.apply)(target, line);
                }
            }
        }
    }
}

/// Splits raw text into blocks on lines consisting only of `---`.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim() == BLOCK_DELIMITER {
            blocks.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    blocks.push(current);

    blocks.retain(|b| !b.trim().is_empty());
    blocks
}

fn has_prefix(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parses the leading base-10 integer of `raw` (`"8/10"` → 8, `"7.5"` → 7),
/// substituting the midpoint when there is none, and clamps to 0–10.
pub fn parse_score(raw: &str) -> u8 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    let digits = &digits[..end];
    if digits.is_empty() {
        return MIDPOINT_SCORE;
    }
    if negative {
        return SCORE_MIN;
    }
    // An all-digit run only fails to parse on overflow, which saturates.
    digits
        .parse::<u64>()
        .map_or(SCORE_MAX, |value| value.min(SCORE_MAX as u64) as u8)
}

/// Splits a comma- or semicolon-separated list, dropping empty items.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct QuestionDraft {
    text: String,
    category: Option<QuestionCategory>,
    skill: Option<String>,
    expected_keywords: Vec<String>,
    assessment_criteria: Vec<String>,
}

const QUESTION_TAGS: &[Tag<QuestionDraft>] = &[
    Tag {
        prefix: "Q:",
        apply: |d, v| d.text = v.to_string(),
        continues: false,
    },
    Tag {
        prefix: "Type:",
        apply: |d, v| d.category = QuestionCategory::parse(v),
        continues: false,
    },
    Tag {
        prefix: "Skill:",
        apply: |d, v| d.skill = Some(v.to_string()).filter(|s| !s.is_empty()),
        continues: false,
    },
    Tag {
        prefix: "Expected:",
        apply: |d, v| d.expected_keywords = parse_list(v),
        continues: false,
    },
    Tag {
        prefix: "Criteria:",
        apply: |d, v| d.assessment_criteria = parse_list(v),
        continues: false,
    },
];

/// Decodes a line-tagged question completion into at most
/// `options.question_count` questions. Blocks without a `Q:` line are dropped.
pub fn parse_questions(text: &str, options: &GenerationOptions) -> Vec<Question> {
    split_blocks(text)
        .iter()
        .map(|block| {
            let mut draft = QuestionDraft::default();
            scan(block, QUESTION_TAGS, &mut draft);
            draft
        })
        .filter(|draft| !draft.text.is_empty())
        .take(options.question_count as usize)
        .enumerate()
        .map(|(position, draft)| Question {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            category: draft
                .category
                .unwrap_or_else(|| options.question_type.category_at(position)),
            skill: draft
                .skill
                .unwrap_or_else(|| skill_at(&options.skills, position)),
            difficulty_score: options.difficulty.default_score(),
            expected_keywords: draft.expected_keywords,
            time_limit_minutes: options.time_per_question(),
            assessment_criteria: draft.assessment_criteria,
        })
        .collect()
}

/// Round-robin skill for the question at `position`, or "general".
pub fn skill_at(skills: &[String], position: usize) -> String {
    if skills.is_empty() {
        "general".to_string()
    } else {
        skills[position % skills.len()].clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

const EVALUATION_TAGS: &[Tag<EvaluationResult>] = &[
    Tag {
        prefix: "Score:",
        apply: |e, v| e.overall_score = parse_score(v),
        continues: false,
    },
    Tag {
        prefix: "Technical Accuracy:",
        apply: |e, v| e.sub_scores.technical_accuracy = parse_score(v),
        continues: false,
    },
    Tag {
        prefix: "Communication:",
        apply: |e, v| e.sub_scores.communication = parse_score(v),
        continues: false,
    },
    Tag {
        prefix: "Problem Solving:",
        apply: |e, v| e.sub_scores.problem_solving = parse_score(v),
        continues: false,
    },
    Tag {
        prefix: "Confidence:",
        apply: |e, v| e.sub_scores.confidence = parse_score(v),
        continues: false,
    },
    Tag {
        prefix: "Strengths:",
        apply: |e, v| e.strengths = parse_list(v),
        continues: false,
    },
    Tag {
        prefix: "Improvements:",
        apply: |e, v| e.improvements = parse_list(v),
        continues: false,
    },
    Tag {
        prefix: "Feedback:",
        apply: append_feedback,
        continues: true,
    },
];

fn append_feedback(evaluation: &mut EvaluationResult, text: &str) {
    if text.is_empty() {
        return;
    }
    if !evaluation.feedback.is_empty() {
        evaluation.feedback.push(' ');
    }
    evaluation.feedback.push_str(text);
}

/// Decodes a line-tagged evaluation completion. Absent scores stay at 5.
pub fn parse_evaluation(text: &str) -> EvaluationResult {
    let mut evaluation = EvaluationResult {
        overall_score: MIDPOINT_SCORE,
        sub_scores: SubScores::default(),
        feedback: String::new(),
        strengths: Vec::new(),
        improvements: Vec::new(),
    };
    scan(text, EVALUATION_TAGS, &mut evaluation);
    evaluation
}

// ────────────────────────────────────────────────────────────────────────────
// Follow-ups
// ────────────────────────────────────────────────────────────────────────────

/// One follow-up question per non-empty line, list markers stripped.
pub fn parse_follow_ups(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(MAX_FOLLOW_UPS)
        .map(String::from)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line
        .strip_prefix(['-', '*', '•'])
        .unwrap_or(line)
        .trim_start();

    let digits = line.find(|c: char| !c.is_ascii_digit()).unwrap_or(0);
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(['.', ')']) {
            return rest.trim();
        }
    }
    line.trim()
}
