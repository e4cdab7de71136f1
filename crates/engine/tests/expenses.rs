use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AnnulExpenseCmd, ApprovalDecision, ApprovalPolicy, CreateExpenseCmd, Ctx, DecisionCmd, Engine,
    EngineError, ExpenseListFilter, ExpenseStatus, MemberRole, UpdateExpenseCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob", "carol"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Community with alice as admin, bob as manager, carol as resident,
/// plus one category.
async fn community_fixture(engine: &Engine) -> (Ctx, Uuid) {
    let community_id = engine
        .create_community("alice", "Los Aromos")
        .await
        .unwrap();
    let admin = Ctx::new("alice", &community_id, MemberRole::Admin);
    engine
        .upsert_member(&admin, "bob", MemberRole::Manager)
        .await
        .unwrap();
    engine
        .upsert_member(&admin, "carol", MemberRole::Resident)
        .await
        .unwrap();
    let category_id = engine
        .create_category(&admin, "Mantención")
        .await
        .unwrap();
    (admin, category_id)
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

#[tokio::test]
async fn create_assigns_sequential_correlatives_per_year() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let first = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 15_000_050, "Mantenimiento mensual"),
        )
        .await
        .unwrap();
    let second = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(11), 8_000, "Reparación portón"),
        )
        .await
        .unwrap();
    let other_year = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(
                category_id,
                NaiveDate::from_ymd_opt(2025, 12, 30).unwrap(),
                5_000,
                "Cierre de año",
            ),
        )
        .await
        .unwrap();

    assert_eq!(first.numero, "G2026-0001");
    assert_eq!(second.numero, "G2026-0002");
    // Each year keeps its own sequence.
    assert_eq!(other_year.numero, "G2025-0001");

    assert_eq!(first.status, ExpenseStatus::Draft);
    assert_eq!(first.version, 1);
    assert_eq!(first.created_by, "alice");
}

#[tokio::test]
async fn concurrent_creates_never_share_a_numero() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let (first, second) = tokio::join!(
        engine.create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "Gasto uno"),
        ),
        engine.create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 2_000, "Gasto dos"),
        ),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_ne!(first.numero, second.numero);
    let mut numeros = vec![first.numero, second.numero];
    numeros.sort();
    assert_eq!(numeros, vec!["G2026-0001", "G2026-0002"]);
}

#[tokio::test]
async fn concurrent_decisions_serialize() {
    let (engine, db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let strict = Engine::builder()
        .database(db.clone())
        .policy(ApprovalPolicy {
            required_approvals: 2,
            reject_dominant: true,
        })
        .build()
        .await
        .unwrap();

    let expense = strict
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 80_000, "Pintura fachada"),
        )
        .await
        .unwrap();
    strict.submit_expense(&admin, expense.id).await.unwrap();

    let manager = Ctx::new("bob", &admin.community_id, MemberRole::Manager);
    let (first, second) = tokio::join!(
        strict.record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        ),
        strict.record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        ),
    );
    first.unwrap();
    second.unwrap();

    // Both decisions landed, each bumping the version in turn.
    let expense = strict.expense(&admin, expense.id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert_eq!(expense.version, 4);

    let approvals = strict.expense_approvals(&admin, expense.id).await.unwrap();
    assert_eq!(approvals.len(), 2);
}

#[tokio::test]
async fn full_lifecycle_to_paid() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 15_000_050, "Mantenimiento mensual"),
        )
        .await
        .unwrap();

    let expense = engine.submit_expense(&admin, expense.id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);

    let manager = Ctx::new("bob", &admin.community_id, MemberRole::Manager);
    let expense = engine
        .record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado).observations("ok"),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert_eq!(expense.approved_by.as_deref(), Some("bob"));

    // Approved expenses are frozen for editing.
    let err = engine
        .update_expense(
            &admin,
            UpdateExpenseCmd::new(expense.id).amount_minor(1_000),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let expense = engine.mark_expense_paid(&admin, expense.id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Paid);

    // Paid is terminal: no annulment, no further payment.
    let err = engine
        .annul_expense(&admin, AnnulExpenseCmd::new(expense.id, "duplicado"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let statuses: Vec<(String, Option<String>)> = engine
        .expense_history(&admin, expense.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|entry| entry.field == "status")
        .map(|entry| (entry.field, entry.new_value))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("status".to_string(), Some("pending".to_string())),
            ("status".to_string(), Some("approved".to_string())),
            ("status".to_string(), Some("paid".to_string())),
        ]
    );
}

#[tokio::test]
async fn rejection_is_terminal() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 9_990, "Compra sin respaldo"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, expense.id).await.unwrap();

    let manager = Ctx::new("bob", &admin.community_id, MemberRole::Manager);
    let expense = engine
        .record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Rechazado)
                .observations("falta boleta"),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Rejected);

    let err = engine
        .annul_expense(&admin, AnnulExpenseCmd::new(expense.id, "sobra"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    let err = engine
        .record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn draft_cannot_skip_states() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "Gasto menor"),
        )
        .await
        .unwrap();

    let err = engine.mark_expense_paid(&admin, expense.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    // A decision needs a pending expense.
    let err = engine
        .record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn update_records_one_history_row_per_changed_field() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 10_000, "Poda de árboles"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            &admin,
            UpdateExpenseCmd::new(expense.id)
                .amount_minor(12_500)
                .glosa("Poda de árboles y retiro"),
        )
        .await
        .unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.amount_minor, 12_500);

    let history = engine.expense_history(&admin, expense.id).await.unwrap();
    assert_eq!(history.len(), 2);

    let amount = history
        .iter()
        .find(|entry| entry.field == "amount_minor")
        .unwrap();
    assert_eq!(amount.old_value.as_deref(), Some("10000"));
    assert_eq!(amount.new_value.as_deref(), Some("12500"));

    let glosa = history.iter().find(|entry| entry.field == "glosa").unwrap();
    assert_eq!(glosa.old_value.as_deref(), Some("Poda de árboles"));
    assert_eq!(glosa.changed_by, "alice");
}

#[tokio::test]
async fn noop_update_writes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 10_000, "Poda de árboles"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            &admin,
            UpdateExpenseCmd::new(expense.id)
                .amount_minor(10_000)
                .glosa("Poda de árboles"),
        )
        .await
        .unwrap();
    assert_eq!(updated.version, 1);

    let history = engine.expense_history(&admin, expense.id).await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn delete_only_from_draft() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 4_000, "Gasto duplicado"),
        )
        .await
        .unwrap();
    engine.delete_expense(&admin, expense.id).await.unwrap();

    let err = engine.expense(&admin, expense.id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(11), 4_000, "Gasto en curso"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, expense.id).await.unwrap();

    let err = engine.delete_expense(&admin, expense.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn residents_are_read_only() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;
    let resident = Ctx::new("carol", &admin.community_id, MemberRole::Resident);

    let err = engine
        .create_expense(
            &resident,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "Gasto menor"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "Gasto menor"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, expense.id).await.unwrap();

    let err = engine
        .record_decision(
            &resident,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    // Reading is fine.
    let listed = engine
        .list_expenses(&resident, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn approval_threshold_of_two_needs_both_reviewers() {
    let (engine, db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let strict = Engine::builder()
        .database(db.clone())
        .policy(ApprovalPolicy {
            required_approvals: 2,
            reject_dominant: true,
        })
        .build()
        .await
        .unwrap();

    let expense = strict
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 80_000, "Pintura fachada"),
        )
        .await
        .unwrap();
    strict.submit_expense(&admin, expense.id).await.unwrap();

    let manager = Ctx::new("bob", &admin.community_id, MemberRole::Manager);
    let expense = strict
        .record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);
    // The pending bump still serializes concurrent decisions.
    assert_eq!(expense.version, 3);

    let expense = strict
        .record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert_eq!(expense.approved_by.as_deref(), Some("alice"));

    let approvals = strict.expense_approvals(&admin, expense.id).await.unwrap();
    assert_eq!(approvals.len(), 2);
    assert_eq!(approvals[0].decided_by, "bob");
    assert_eq!(approvals[1].decided_by, "alice");
}

#[tokio::test]
async fn rejection_blocks_approval_even_when_not_dominant() {
    let (engine, db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let lenient = Engine::builder()
        .database(db.clone())
        .policy(ApprovalPolicy {
            required_approvals: 1,
            reject_dominant: false,
        })
        .build()
        .await
        .unwrap();

    let expense = lenient
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 30_000, "Cambio de luminarias"),
        )
        .await
        .unwrap();
    lenient.submit_expense(&admin, expense.id).await.unwrap();

    let manager = Ctx::new("bob", &admin.community_id, MemberRole::Manager);
    let expense = lenient
        .record_decision(
            &manager,
            DecisionCmd::new(expense.id, ApprovalDecision::Rechazado),
        )
        .await
        .unwrap();
    // Not dominant, so the rejection does not terminate the expense...
    assert_eq!(expense.status, ExpenseStatus::Pending);

    // ...but it still vetoes any later approval.
    let expense = lenient
        .record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);
}

#[tokio::test]
async fn annulment_needs_reason_and_records_it() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 20_000, "Factura duplicada"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, expense.id).await.unwrap();
    engine
        .record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap();

    let err = engine
        .annul_expense(&admin, AnnulExpenseCmd::new(expense.id, "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let expense = engine
        .annul_expense(
            &admin,
            AnnulExpenseCmd::new(expense.id, "factura ya pagada en febrero"),
        )
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Annulled);
    assert_eq!(
        expense.annul_reason.as_deref(),
        Some("factura ya pagada en febrero")
    );
}

#[tokio::test]
async fn closed_emission_blocks_annulment() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 50_000, "Gasto común marzo"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, expense.id).await.unwrap();
    engine
        .record_decision(
            &admin,
            DecisionCmd::new(expense.id, ApprovalDecision::Aprobado),
        )
        .await
        .unwrap();

    let emission_id = engine.create_emission(&admin, "2026-03").await.unwrap();
    engine
        .attach_expense_to_emission(&admin, emission_id, expense.id)
        .await
        .unwrap();
    engine.close_emission(&admin, emission_id).await.unwrap();

    let err = engine
        .annul_expense(&admin, AnnulExpenseCmd::new(expense.id, "anular marzo"))
        .await
        .unwrap_err();
    // The billing lock wins over the state check.
    assert!(matches!(err, EngineError::Conflict(_)));

    let expense = engine.expense(&admin, expense.id).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert_eq!(expense.annul_reason, None);
}

#[tokio::test]
async fn only_approved_expenses_can_be_emitted() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let expense = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 50_000, "Gasto común marzo"),
        )
        .await
        .unwrap();

    let emission_id = engine.create_emission(&admin, "2026-03").await.unwrap();
    let err = engine
        .attach_expense_to_emission(&admin, emission_id, expense.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let err = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 0, "Gasto sin monto"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "ab"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(Uuid::new_v4(), march(10), 1_000, "Categoría fantasma"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn list_filters_by_status_and_orders_by_numero() {
    let (engine, _db) = engine_with_db().await;
    let (admin, category_id) = community_fixture(&engine).await;

    let first = engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(10), 1_000, "Gasto uno"),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            &admin,
            CreateExpenseCmd::new(category_id, march(11), 2_000, "Gasto dos"),
        )
        .await
        .unwrap();
    engine.submit_expense(&admin, first.id).await.unwrap();

    let all = engine
        .list_expenses(&admin, &ExpenseListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].numero, "G2026-0001");
    assert_eq!(all[1].numero, "G2026-0002");

    let pending = engine
        .list_expenses(
            &admin,
            &ExpenseListFilter {
                status: Some(ExpenseStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first.id);
}

#[tokio::test]
async fn members_are_listed_with_roles() {
    let (engine, _db) = engine_with_db().await;
    let (admin, _category_id) = community_fixture(&engine).await;

    let members = engine.list_members(&admin).await.unwrap();
    assert_eq!(
        members,
        vec![
            ("alice".to_string(), MemberRole::Admin),
            ("bob".to_string(), MemberRole::Manager),
            ("carol".to_string(), MemberRole::Resident),
        ]
    );
}

#[tokio::test]
async fn emissions_are_listed_per_community() {
    let (engine, _db) = engine_with_db().await;
    let (admin, _category_id) = community_fixture(&engine).await;

    let march_id = engine.create_emission(&admin, "2026-03").await.unwrap();
    engine.create_emission(&admin, "2026-04").await.unwrap();
    engine.close_emission(&admin, march_id).await.unwrap();

    let emissions = engine.list_emissions(&admin).await.unwrap();
    assert_eq!(emissions.len(), 2);
    assert_eq!(emissions[0].period, "2026-03");
    assert_eq!(emissions[0].status, "closed");
    assert!(emissions[0].closed_at.is_some());
    assert_eq!(emissions[1].period, "2026-04");
    assert_eq!(emissions[1].status, "open");
}

#[tokio::test]
async fn non_members_cannot_resolve_a_role() {
    let (engine, _db) = engine_with_db().await;
    let (admin, _category_id) = community_fixture(&engine).await;

    let err = engine
        .member_role(&admin.community_id, "mallory")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine.member_role("no-such-community", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
