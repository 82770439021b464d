// src/scoring.rs

use serde::{Deserialize, Serialize};

/// The option alphabet of the answer sheets.
pub const OPTIONS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Outcome of comparing an answer sequence against an answer key.
///
/// Serialized field names are camelCase because this struct is embedded
/// verbatim in stored submission documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub correct_count: u32,
    pub wrong_count: u32,
    pub blank_count: u32,
    /// 1-based question numbers per class.
    pub correct_questions: Vec<u32>,
    pub wrong_questions: Vec<u32>,
    pub blank_questions: Vec<u32>,
    /// How many positions were compared: `min(len(answers), len(key))`.
    pub compared: u32,
    pub key_length: u32,
}

/// Scores an answer sequence against an answer key.
///
/// `answers[i]` is the picked option for question `i + 1`, `None` meaning
/// blank. The key is trimmed and upper-cased before comparison, as is each
/// answer. Positions beyond the shorter of the two sequences are ignored;
/// callers can detect a length mismatch from `compared` vs `key_length`.
///
/// Invariant: `correct_count + wrong_count + blank_count == compared`.
pub fn score(answers: &[Option<char>], answer_key: &str) -> ScoringResult {
    let key: Vec<char> = answer_key.trim().to_uppercase().chars().collect();
    let compared = answers.len().min(key.len());

    let mut result = ScoringResult {
        correct_count: 0,
        wrong_count: 0,
        blank_count: 0,
        correct_questions: Vec::new(),
        wrong_questions: Vec::new(),
        blank_questions: Vec::new(),
        compared: compared as u32,
        key_length: key.len() as u32,
    };

    for (i, answer) in answers.iter().take(compared).enumerate() {
        let question = (i + 1) as u32;
        match answer {
            None => {
                result.blank_count += 1;
                result.blank_questions.push(question);
            }
            Some(picked) if picked.eq_ignore_ascii_case(&key[i]) => {
                result.correct_count += 1;
                result.correct_questions.push(question);
            }
            Some(_) => {
                result.wrong_count += 1;
                result.wrong_questions.push(question);
            }
        }
    }

    result
}
