// src/submit.rs

use std::collections::BTreeMap;

use crate::catalog::resolve_test;
use crate::models::submission::{
    Scoring, SubmissionDoc, SubmissionTestInfo, SubmitterInfo, DOC_TYPE_SUBMISSION,
};
use crate::name_key::name_key;
use crate::reconcile::complete_matching_assignments;
use crate::scoring::score;
use crate::store::{partitions, DocumentStore, StoreError};

/// The student behind a submission, as established by authentication plus
/// the profile lookup.
#[derive(Debug, Clone)]
pub struct Submitter {
    pub uid: String,
    pub email: Option<String>,
    /// Display name; the submission partition key is derived from it.
    pub name: String,
}

/// One filled-in answer sheet, as received from the client.
#[derive(Debug, Clone)]
pub struct AnswerSheet {
    pub test_name: String,
    pub test_id: Option<String>,
    pub category_hint: Option<String>,
    pub grade: Option<i64>,
    pub link: Option<String>,
    /// Total questions presented.
    pub count: u32,
    /// Sparse question-number -> option map (1-based, options upper- or
    /// lower-case A-D).
    pub answers: BTreeMap<u32, String>,
}

/// What the pipeline produced for one submission.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub submission_id: String,
    pub name_key: String,
    /// Resolved category, if any; `None` means the missing-key path ran
    /// without a usable hint.
    pub category: Option<String>,
    pub scoring: Scoring,
    pub completed_assignments: usize,
    pub warning: Option<String>,
}

/// Looks up the student's display name: profile document first, then the
/// email prefix. An unresolvable name degrades to the `"unknown"` key.
pub async fn student_display_name(
    store: &dyn DocumentStore,
    uid: &str,
    email: Option<&str>,
) -> Result<String, StoreError> {
    if let Some(profile) = store.get_single(partitions::STUDENTS, uid).await? {
        let first = profile.str_field("firstName").unwrap_or_default();
        let last = profile.str_field("lastName").unwrap_or_default();
        let full = format!("{first} {last}").trim().to_string();
        if !full.is_empty() {
            return Ok(full);
        }
    }
    Ok(email
        .and_then(|e| e.split('@').next())
        .unwrap_or_default()
        .to_string())
}

fn flatten_answers(sheet: &AnswerSheet) -> (String, Vec<Option<char>>, u32) {
    let mut answers_string = String::with_capacity(sheet.count as usize);
    let mut sequence = Vec::with_capacity(sheet.count as usize);
    let mut answered = 0u32;
    for question in 1..=sheet.count {
        match sheet
            .answers
            .get(&question)
            .and_then(|option| option.chars().next())
        {
            Some(option) => {
                let option = option.to_ascii_uppercase();
                answers_string.push(option);
                sequence.push(Some(option));
                answered += 1;
            }
            None => {
                answers_string.push('-');
                sequence.push(None);
            }
        }
    }
    (answers_string, sequence, answered)
}

/// Runs the whole submission pipeline: resolve the test, score the sheet,
/// persist the submission under the student's partition, then reconcile
/// matching assignments.
///
/// The submission append is the commit point; any store error before or at
/// the append fails the attempt with no partial write. Reconciliation
/// failures after the append only surface as a warning.
pub async fn submit_answer_sheet(
    store: &dyn DocumentStore,
    submitter: &Submitter,
    sheet: &AnswerSheet,
) -> Result<SubmissionOutcome, StoreError> {
    let (answers_string, sequence, answered_count) = flatten_answers(sheet);
    let key = name_key(&submitter.name);

    let resolved = resolve_test(store, &sheet.test_name, sheet.category_hint.as_deref()).await?;

    // Category, answer key and snapshot fallbacks follow the resolution
    // outcome; an unresolved test keeps the hint as its category label.
    let (category, answer_key, resolved_grade, resolved_link) = match &resolved {
        Some(hit) => (
            Some(hit.category.clone()),
            hit.test
                .answer_key
                .as_deref()
                .map(|k| k.trim().to_uppercase())
                .filter(|k| !k.is_empty()),
            hit.test.grade,
            hit.test.link.clone(),
        ),
        None => (sheet.category_hint.clone(), None, None, None),
    };

    let scoring = match &answer_key {
        Some(answer_key) => Scoring::Ok {
            answer_key: answer_key.clone(),
            result: score(&sequence, answer_key),
        },
        None => Scoring::MissingKey,
    };

    let answers_map: BTreeMap<u32, String> = sheet
        .answers
        .iter()
        .filter(|(question, _)| **question >= 1 && **question <= sheet.count)
        .map(|(question, option)| (*question, option.to_uppercase()))
        .collect();

    let doc = SubmissionDoc {
        doc_type: DOC_TYPE_SUBMISSION.to_string(),
        test: SubmissionTestInfo {
            id: sheet.test_id.clone(),
            name: sheet.test_name.clone(),
            category: category.clone(),
            grade: sheet.grade.or(resolved_grade),
            link: sheet.link.clone().or(resolved_link),
        },
        user: SubmitterInfo {
            uid: Some(submitter.uid.clone()),
            email: submitter.email.clone(),
            name: Some(submitter.name.clone()),
        },
        count: sheet.count,
        answered_count,
        answers: answers_string,
        answers_map,
        scoring: scoring.clone(),
    };

    let fields = serde_json::to_value(&doc).map_err(|e| StoreError::Backend(e.to_string()))?;
    let submission_id = store.append_record(&key, fields).await?;

    tracing::info!(
        name_key = %key,
        test = %sheet.test_name,
        category = category.as_deref().unwrap_or("-"),
        answered = answered_count,
        "submission stored"
    );

    // Best-effort from here on: the submission is durable.
    let (completed_assignments, warning) = match &category {
        Some(category) => {
            let outcome =
                complete_matching_assignments(store, &key, category, &sheet.test_name).await;
            (outcome.completed, outcome.warning)
        }
        None => (0, None),
    };

    Ok(SubmissionOutcome {
        submission_id,
        name_key: key,
        category,
        scoring,
        completed_assignments,
        warning,
    })
}
