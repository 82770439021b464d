// tests/submission_flow_tests.rs

use std::collections::BTreeMap;

use serde_json::json;

use dershane_backend::catalog::resolve_test;
use dershane_backend::models::submission::Scoring;
use dershane_backend::reconcile::complete_matching_assignments;
use dershane_backend::store::mem::MemStore;
use dershane_backend::store::{DocumentStore, partitions};
use dershane_backend::submit::{
    AnswerSheet, Submitter, student_display_name, submit_answer_sheet,
};

async fn seed_category(store: &MemStore, listing: &str, name: &str) {
    store
        .append_record(listing, json!({ "name": name }))
        .await
        .unwrap();
}

async fn seed_test(store: &MemStore, category: &str, name: &str, key: &str) -> String {
    store
        .append_record(
            category,
            json!({
                "name": name,
                "grade": 7,
                "link": "https://tests.example/deneme",
                "questionCount": key.len(),
                "answerKey": key,
            }),
        )
        .await
        .unwrap()
}

async fn seed_assignment(store: &MemStore, name_key: &str, category: &str, test_name: &str) -> String {
    store
        .append_record(
            &partitions::assignments(name_key),
            json!({
                "type": "assignment",
                "status": "assigned",
                "assignedAt": "2025-09-01T08:00:00Z",
                "test": {
                    "id": "t1",
                    "name": test_name,
                    "category": category,
                    "grade": 7,
                    "link": null,
                    "questionCount": 5,
                    "isSpecial": false,
                },
            }),
        )
        .await
        .unwrap()
}

fn sheet(test_name: &str, count: u32, picks: &[(u32, &str)]) -> AnswerSheet {
    AnswerSheet {
        test_name: test_name.to_string(),
        test_id: None,
        category_hint: None,
        grade: None,
        link: None,
        count,
        answers: picks
            .iter()
            .map(|(q, option)| (*q, option.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn omer() -> Submitter {
    Submitter {
        uid: "7".to_string(),
        email: Some("omer@example.com".to_string()),
        name: "Ömer Faruk".to_string(),
    }
}

#[tokio::test]
async fn standard_categories_win_over_special_ones() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    seed_category(&store, partitions::SPECIAL_CATEGORIES, "YayinX").await;
    seed_test(&store, "YayinX", "Deneme-1", "DDDDD").await;
    seed_test(&store, "Matematik", "Deneme-1", "ABCDA").await;

    let hit = resolve_test(&store, "Deneme-1", None).await.unwrap().unwrap();
    assert_eq!(hit.category, "Matematik");
    assert_eq!(hit.test.answer_key.as_deref(), Some("ABCDA"));
}

#[tokio::test]
async fn category_hint_short_circuits_the_scan() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    seed_category(&store, partitions::SPECIAL_CATEGORIES, "YayinX").await;
    seed_test(&store, "Matematik", "Deneme-1", "ABCDA").await;
    seed_test(&store, "YayinX", "Deneme-1", "DDDDD").await;

    let hit = resolve_test(&store, "Deneme-1", Some("YayinX"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.category, "YayinX");

    // A hint that misses falls through to the ordered scan.
    let hit = resolve_test(&store, "Deneme-1", Some("Fen"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.category, "Matematik");
}

#[tokio::test]
async fn unknown_test_resolves_to_none() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;

    assert!(resolve_test(&store, "Deneme-99", None).await.unwrap().is_none());
}

#[tokio::test]
async fn submission_scores_and_completes_the_assignment() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    seed_test(&store, "Matematik", "Deneme-1", "ABCDA").await;
    seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-1").await;

    let outcome = submit_answer_sheet(
        &store,
        &omer(),
        &sheet("Deneme-1", 5, &[(1, "A"), (2, "B"), (3, "C"), (4, "D")]),
    )
    .await
    .unwrap();

    assert_eq!(outcome.name_key, "omer_faruk");
    assert_eq!(outcome.category.as_deref(), Some("Matematik"));
    assert_eq!(outcome.completed_assignments, 1);
    assert!(outcome.warning.is_none());
    match &outcome.scoring {
        Scoring::Ok { answer_key, result } => {
            assert_eq!(answer_key, "ABCDA");
            assert_eq!(result.compared, 5);
            assert_eq!(result.correct_count, 4);
            assert_eq!(result.wrong_count, 0);
            assert_eq!(result.blank_count, 1);
            assert_eq!(result.blank_questions, [5]);
        }
        Scoring::MissingKey => panic!("expected scored submission"),
    }

    // The submission landed in the student's partition with the flattened
    // answer string.
    let stored = store.get_all("omer_faruk").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].str_field("type"), Some("submission"));
    assert_eq!(stored[0].str_field("answers"), Some("ABCD-"));
    assert_eq!(stored[0].str_field("user.name"), Some("Ömer Faruk"));

    // The assignment flipped to completed with a timestamp.
    let assignments = store
        .get_all(&partitions::assignments("omer_faruk"))
        .await
        .unwrap();
    assert_eq!(assignments[0].str_field("status"), Some("completed"));
    assert!(assignments[0].str_field("completedAt").is_some());
}

#[tokio::test]
async fn unresolved_test_is_still_persisted_as_missing_key() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    seed_assignment(&store, "omer_faruk", "Fen", "Deneme-9").await;

    let mut unresolved = sheet("Deneme-9", 3, &[(1, "A")]);
    unresolved.category_hint = Some("Fen".to_string());
    let outcome = submit_answer_sheet(&store, &omer(), &unresolved).await.unwrap();

    assert!(matches!(outcome.scoring, Scoring::MissingKey));
    // The hint still labels the submission and drives reconciliation.
    assert_eq!(outcome.category.as_deref(), Some("Fen"));
    assert_eq!(outcome.completed_assignments, 1);

    let stored = store.get_all("omer_faruk").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].str_field("scoring.status"), Some("missing-key"));
}

#[tokio::test]
async fn empty_answer_key_takes_the_missing_key_path() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    store
        .append_record(
            "Matematik",
            json!({ "name": "Deneme-2", "grade": 6, "questionCount": 4, "answerKey": "  " }),
        )
        .await
        .unwrap();

    let outcome = submit_answer_sheet(&store, &omer(), &sheet("Deneme-2", 4, &[(1, "A")]))
        .await
        .unwrap();

    assert!(matches!(outcome.scoring, Scoring::MissingKey));
    assert_eq!(outcome.category.as_deref(), Some("Matematik"));
}

#[tokio::test]
async fn resubmission_appends_a_second_record() {
    let store = MemStore::new();
    seed_category(&store, partitions::TEST_CATEGORIES, "Matematik").await;
    seed_test(&store, "Matematik", "Deneme-1", "ABCDA").await;

    let sheet = sheet("Deneme-1", 5, &[(1, "A")]);
    let first = submit_answer_sheet(&store, &omer(), &sheet).await.unwrap();
    let second = submit_answer_sheet(&store, &omer(), &sheet).await.unwrap();

    assert_ne!(first.submission_id, second.submission_id);
    assert_eq!(store.get_all("omer_faruk").await.unwrap().len(), 2);
}

#[tokio::test]
async fn reconcile_primary_and_fallback_select_the_same_set() {
    for store in [MemStore::new(), MemStore::without_compound_filters()] {
        seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-1").await;
        seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-1").await;
        seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-2").await;
        seed_assignment(&store, "omer_faruk", "Fen", "Deneme-1").await;

        let outcome =
            complete_matching_assignments(&store, "omer_faruk", "Matematik", "Deneme-1").await;
        assert_eq!(outcome.completed, 2);
        assert!(outcome.warning.is_none());

        let statuses: Vec<_> = store
            .get_all(&partitions::assignments("omer_faruk"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| {
                (
                    r.str_field("test.category").unwrap().to_string(),
                    r.str_field("test.name").unwrap().to_string(),
                    r.str_field("status").unwrap().to_string(),
                )
            })
            .collect();
        let expected: [(String, String, String); 4] = [
            ("Matematik".into(), "Deneme-1".into(), "completed".into()),
            ("Matematik".into(), "Deneme-1".into(), "completed".into()),
            ("Matematik".into(), "Deneme-2".into(), "assigned".into()),
            ("Fen".into(), "Deneme-1".into(), "assigned".into()),
        ];
        assert_eq!(statuses, expected);
    }
}

#[tokio::test]
async fn second_reconcile_pass_is_a_no_op() {
    let store = MemStore::new();
    seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-1").await;

    let first = complete_matching_assignments(&store, "omer_faruk", "Matematik", "Deneme-1").await;
    assert_eq!(first.completed, 1);

    let second = complete_matching_assignments(&store, "omer_faruk", "Matematik", "Deneme-1").await;
    assert_eq!(second.completed, 0);
    assert!(second.warning.is_none());

    let assignments = store
        .get_all(&partitions::assignments("omer_faruk"))
        .await
        .unwrap();
    assert_eq!(assignments[0].str_field("status"), Some("completed"));
}

#[tokio::test]
async fn reconcile_matches_after_trimming() {
    let store = MemStore::new();
    seed_assignment(&store, "omer_faruk", "Matematik", "Deneme-1").await;

    let outcome =
        complete_matching_assignments(&store, "omer_faruk", " Matematik ", " Deneme-1 ").await;
    assert_eq!(outcome.completed, 1);
}

#[tokio::test]
async fn display_name_prefers_profile_over_email() {
    let store = MemStore::new();
    store
        .put_record(
            partitions::STUDENTS,
            "7",
            json!({ "email": "omer@example.com", "firstName": "Ömer", "lastName": "Faruk" }),
        )
        .await
        .unwrap();

    let name = student_display_name(&store, "7", Some("omer@example.com"))
        .await
        .unwrap();
    assert_eq!(name, "Ömer Faruk");

    // No profile: fall back to the email prefix.
    let name = student_display_name(&store, "8", Some("ayse.yilmaz@example.com"))
        .await
        .unwrap();
    assert_eq!(name, "ayse.yilmaz");
}
