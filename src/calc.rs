use crate::roster;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_SCORE_PER_QUESTION: u8 = 3;

/// Maximum aggregate score: 30 questions x 3 points.
pub fn max_total() -> u32 {
    roster::question_ids().len() as u32 * MAX_SCORE_PER_QUESTION as u32
}

/// Two-decimal rounding used everywhere a percentage is displayed or
/// exported, so the form, the dashboard, and the CSV never disagree.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total: u32,
    pub percent: f64,
}

pub fn score_summary(scores: &BTreeMap<u32, u8>) -> ScoreSummary {
    let total: u32 = scores.values().map(|v| *v as u32).sum();
    let percent = round2(100.0 * total as f64 / max_total() as f64);
    ScoreSummary { total, percent }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    UnknownQuestion { question: u32 },
    BadScoreValue { question: u32, value: u8 },
    Incomplete { answered: usize, required: usize },
}

impl SubmissionError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::UnknownQuestion { .. } => "unknown_question",
            SubmissionError::BadScoreValue { .. } => "bad_score_value",
            SubmissionError::Incomplete { .. } => "incomplete_submission",
        }
    }

    pub fn message(&self) -> String {
        match self {
            SubmissionError::UnknownQuestion { question } => {
                format!("question {} is not part of the rubric", question)
            }
            SubmissionError::BadScoreValue { question, value } => format!(
                "question {}: score {} is outside 0..={}",
                question, value, MAX_SCORE_PER_QUESTION
            ),
            SubmissionError::Incomplete { answered, required } => format!(
                "only {} of {} questions answered",
                answered, required
            ),
        }
    }
}

/// Gate applied before a submission reaches the repository: every key must
/// be a defined question id, every value in range, and all 30 questions
/// answered. A rejected submission never mutates the collection.
pub fn validate_submission(scores: &BTreeMap<u32, u8>) -> Result<(), SubmissionError> {
    let defined = roster::question_ids();
    for (question, value) in scores {
        if !defined.contains(question) {
            return Err(SubmissionError::UnknownQuestion {
                question: *question,
            });
        }
        if *value > MAX_SCORE_PER_QUESTION {
            return Err(SubmissionError::BadScoreValue {
                question: *question,
                value: *value,
            });
        }
    }
    if scores.len() != defined.len() {
        return Err(SubmissionError::Incomplete {
            answered: scores.len(),
            required: defined.len(),
        });
    }
    Ok(())
}
