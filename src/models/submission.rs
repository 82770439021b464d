// src/models/submission.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

use crate::scoring::ScoringResult;

pub const DOC_TYPE_SUBMISSION: &str = "submission";

/// The test snapshot embedded in a submission document. Unlike the
/// assignment snapshot, `category` may be null (unresolved submission) and
/// there is no `questionCount`/`isSpecial`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionTestInfo {
    pub id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub grade: Option<i64>,
    pub link: Option<String>,
}

/// The submitting user, denormalized into the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitterInfo {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Scoring outcome embedded in a submission document. The tag mirrors the
/// stored `scoring.status` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Scoring {
    #[serde(rename = "ok", rename_all = "camelCase")]
    Ok {
        answer_key: String,
        #[serde(flatten)]
        result: ScoringResult,
    },
    #[serde(rename = "missing-key")]
    MissingKey,
}

/// A submission document in a `<nameKey>` partition. Immutable once written;
/// resubmission appends a second, independent document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub test: SubmissionTestInfo,
    pub user: SubmitterInfo,
    /// Total questions presented on the sheet.
    pub count: u32,
    pub answered_count: u32,
    /// One character per question, `-` for blank.
    pub answers: String,
    /// Sparse question-number -> option map.
    pub answers_map: BTreeMap<u32, String>,
    pub scoring: Scoring,
}

/// DTO for a student submitting an answer sheet.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1, max = 200))]
    pub test_name: String,
    pub test_id: Option<String>,
    /// If present, the resolver tries this category first.
    pub category_hint: Option<String>,
    pub grade: Option<i64>,
    pub link: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub count: u32,
    /// Sparse question-number -> option map; options must be A-D.
    #[validate(custom(function = validate_answers))]
    pub answers: BTreeMap<u32, String>,
}

fn validate_answers(answers: &BTreeMap<u32, String>) -> Result<(), ValidationError> {
    for option in answers.values() {
        let mut chars = option.chars();
        let valid = matches!(chars.next(), Some('A'..='D' | 'a'..='d')) && chars.next().is_none();
        if !valid {
            return Err(ValidationError::new("answer_option"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scoring_serializes_with_status_tag() {
        let missing = serde_json::to_value(Scoring::MissingKey).unwrap();
        assert_eq!(missing, json!({"status": "missing-key"}));

        let ok = serde_json::to_value(Scoring::Ok {
            answer_key: "ABCD".to_string(),
            result: crate::scoring::score(&[Some('A'), None], "ABCD"),
        })
        .unwrap();
        assert_eq!(ok["status"], "ok");
        assert_eq!(ok["answerKey"], "ABCD");
        assert_eq!(ok["correctCount"], 1);
        assert_eq!(ok["blankQuestions"], json!([2]));
        assert_eq!(ok["keyLength"], 4);
    }
}
