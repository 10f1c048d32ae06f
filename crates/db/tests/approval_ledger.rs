//! Integration tests for the approval ledger.
//!
//! - Upsert semantics on (step, role, approver)
//! - Latest-per-role reduction across approvers
//! - Cascade when a step is deleted

use sqlx::PgPool;

use greenlight_core::approval::Decision;
use greenlight_core::roles::RoleKey;
use greenlight_db::models::approval::RecordApproval;
use greenlight_db::models::person::CreatePerson;
use greenlight_db::models::segment::CreateSegment;
use greenlight_db::models::step::CreateStep;
use greenlight_db::repositories::{ApprovalRepo, PersonRepo, SegmentRepo, StepRepo};

async fn seed_gate_step(pool: &PgPool) -> (i64, i64, i64) {
    let ada = PersonRepo::create(
        pool,
        &CreatePerson {
            display_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            org_role: None,
        },
    )
    .await
    .unwrap();
    let bob = PersonRepo::create(
        pool,
        &CreatePerson {
            display_name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            org_role: None,
        },
    )
    .await
    .unwrap();
    let steps = vec![CreateStep {
        segment_id: 0,
        step_key: "script_approval".to_string(),
        name: "Script Approval".to_string(),
        phase: "pre".to_string(),
        due_date: None,
        assignee_id: None,
        is_gate: true,
        gate_roles: vec!["script_editor".to_string()],
        position: 0,
    }];
    let (_, created) = SegmentRepo::create_with_steps(
        pool,
        &CreateSegment {
            title: "Ep".to_string(),
            description: String::new(),
            owner_id: ada.id,
            production_date: "2026-09-15".parse().unwrap(),
        },
        &steps,
        &[],
    )
    .await
    .unwrap();
    (created[0].id, ada.id, bob.id)
}

fn record(step_id: i64, approver_id: i64, decision: Decision) -> RecordApproval {
    RecordApproval {
        step_id,
        role_key: RoleKey::ScriptEditor,
        approver_id,
        decision,
        comment: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn redecide_overwrites_single_row(pool: PgPool) {
    let (step_id, ada, _) = seed_gate_step(&pool).await;

    let first = ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Rejected))
        .await
        .unwrap();
    let second = ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Approved))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.decision, "approved");
    assert!(second.decided_at >= first.decided_at);

    let history = ApprovalRepo::history_for_step(&pool, step_id).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn latest_per_role_spans_approvers(pool: PgPool) {
    let (step_id, ada, bob) = seed_gate_step(&pool).await;

    ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Approved))
        .await
        .unwrap();
    ApprovalRepo::record(&pool, &record(step_id, bob, Decision::Rejected))
        .await
        .unwrap();

    let latest = ApprovalRepo::latest_per_role(&pool, step_id).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].approver_id, bob);
    assert_eq!(latest[0].decision, "rejected");

    // Both rows remain in history.
    let history = ApprovalRepo::history_for_step(&pool, step_id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn comment_replaced_on_redecide(pool: PgPool) {
    let (step_id, ada, _) = seed_gate_step(&pool).await;

    let mut input = record(step_id, ada, Decision::Rejected);
    input.comment = Some("needs a rewrite".to_string());
    ApprovalRepo::record(&pool, &input).await.unwrap();

    let approved = ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Approved))
        .await
        .unwrap();
    assert!(approved.comment.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn step_delete_cascades_to_ledger(pool: PgPool) {
    let (step_id, ada, _) = seed_gate_step(&pool).await;
    ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Approved))
        .await
        .unwrap();

    assert!(StepRepo::delete(&pool, step_id).await.unwrap());
    assert!(ApprovalRepo::history_for_step(&pool, step_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn reset_clears_ledger(pool: PgPool) {
    let (step_id, ada, bob) = seed_gate_step(&pool).await;
    ApprovalRepo::record(&pool, &record(step_id, ada, Decision::Approved))
        .await
        .unwrap();
    ApprovalRepo::record(&pool, &record(step_id, bob, Decision::Approved))
        .await
        .unwrap();

    assert_eq!(ApprovalRepo::delete_for_step(&pool, step_id).await.unwrap(), 2);
    assert!(ApprovalRepo::latest_per_role(&pool, step_id)
        .await
        .unwrap()
        .is_empty());
}
