// src/reconcile.rs

use serde_json::json;

use crate::models::assignment::{STATUS_ASSIGNED, STATUS_COMPLETED};
use crate::store::{partitions, DocumentStore, Record};

/// Result of a reconciliation pass. Reconciliation is best-effort by
/// contract: the submission is already durable when it runs, so failures
/// land in `warning` instead of an error the caller would have to unwind.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// Assignments flipped to completed in this pass.
    pub completed: usize,
    pub warning: Option<String>,
}

fn is_match(record: &Record, category: &str, test_name: &str) -> bool {
    record
        .str_field("test.category")
        .is_some_and(|c| c.trim() == category)
        && record
            .str_field("test.name")
            .is_some_and(|n| n.trim() == test_name)
}

/// Flips every still-assigned matching assignment of the student to
/// completed, stamping `completedAt`.
///
/// The primary tier is a compound-filter query; if the store cannot execute
/// it, the fallback fetches all assigned records and applies the same
/// predicate client-side. Both tiers must select the same set.
pub async fn complete_matching_assignments(
    store: &dyn DocumentStore,
    name_key: &str,
    category: &str,
    test_name: &str,
) -> ReconcileOutcome {
    let partition = partitions::assignments(name_key);
    let category = category.trim();
    let test_name = test_name.trim();

    let matches = match store
        .get_by_filters(
            &partition,
            &[
                ("status", json!(STATUS_ASSIGNED)),
                ("test.category", json!(category)),
                ("test.name", json!(test_name)),
            ],
        )
        .await
    {
        Ok(matches) => matches,
        Err(primary_err) => {
            tracing::debug!(
                partition,
                %primary_err,
                "compound assignment filter unavailable, using client-side fallback"
            );
            match store
                .get_by_equality(&partition, "status", &json!(STATUS_ASSIGNED))
                .await
            {
                Ok(assigned) => assigned
                    .into_iter()
                    .filter(|record| is_match(record, category, test_name))
                    .collect(),
                Err(e) => {
                    tracing::warn!(partition, %e, "assignment lookup failed during reconciliation");
                    return ReconcileOutcome {
                        completed: 0,
                        warning: Some(format!("assignment lookup failed: {e}")),
                    };
                }
            }
        }
    };

    let mut outcome = ReconcileOutcome::default();
    for record in matches {
        let update = json!({
            "status": STATUS_COMPLETED,
            "completedAt": chrono::Utc::now(),
        });
        match store.update_fields(&partition, &record.id, update).await {
            Ok(()) => outcome.completed += 1,
            Err(e) => {
                tracing::warn!(partition, id = %record.id, %e, "failed to complete assignment");
                outcome.warning = Some(format!("failed to complete assignment {}: {e}", record.id));
            }
        }
    }
    outcome
}
