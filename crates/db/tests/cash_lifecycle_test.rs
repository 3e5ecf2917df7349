//! Integration tests for the cash-session lifecycle.
//!
//! These run against a real Postgres instance; set `DATABASE_URL` to enable
//! them. Without it each test exits early.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use caja_core::cash::LineInput;
use caja_db::{
    CashAuditRepository, CashClosingRepository, CashError, CashOpeningRepository,
    CashSessionRepository, OrderSessionGuard,
    entities::{cash_registers, currency_rates},
    migration::Migrator,
    repositories::{AuditInput, CloseInput, ClosingFilter, OpenSessionInput},
};

/// Connects and migrates, or skips the test when no database is configured.
async fn test_db() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let db = caja_db::connect(&url).await.expect("Failed to connect");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    seed_rates(&db).await;
    Some(db)
}

/// Seeds the two denominations the tests price against.
async fn seed_rates(db: &DatabaseConnection) {
    for (code, rate, name, symbol) in [
        ("PYG", dec!(1), "Guaraní", "₲"),
        ("USD", dec!(7300), "US Dollar", "$"),
    ] {
        if currency_rates::Entity::find_by_id(code.to_string())
            .one(db)
            .await
            .expect("rate lookup")
            .is_none()
        {
            currency_rates::ActiveModel {
                code: Set(code.to_string()),
                rate: Set(rate),
                name: Set(name.to_string()),
                symbol: Set(symbol.to_string()),
            }
            .insert(db)
            .await
            .expect("rate insert");
        }
    }
}

async fn create_register(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    cash_registers::ActiveModel {
        id: Set(id),
        name: Set(format!("till-{id}")),
        description: Set(Some("integration test drawer".to_string())),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(chrono::Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("register insert");
    id
}

fn line(denomination: &str, quantity: Decimal) -> LineInput {
    LineInput {
        denomination: denomination.to_string(),
        quantity,
    }
}

async fn open_session(
    db: &DatabaseConnection,
    user_id: Uuid,
    lines: Vec<LineInput>,
) -> caja_db::repositories::OpenedSession {
    let register_id = create_register(db).await;
    CashOpeningRepository::new(db.clone())
        .open(OpenSessionInput {
            user_id,
            cash_register_id: register_id,
            prior_balance: None,
            lines,
        })
        .await
        .expect("open session")
}

#[tokio::test]
async fn test_open_session_prices_multi_currency_float() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    let opened = open_session(
        &db,
        user_id,
        vec![line("USD", dec!(10)), line("PYG", dec!(50000)), line("USD", dec!(0))],
    )
    .await;

    // 10 × 7300 + 50000 × 1; the zero-quantity line is dropped.
    assert_eq!(opened.session.opening_amount, dec!(123000));
    assert_eq!(opened.float_lines.len(), 2);
    assert!(opened.session.is_active());
    assert_eq!(opened.summary.available_balance(), dec!(123000));
}

#[tokio::test]
async fn test_open_rejects_unknown_denomination_without_residue() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();
    let register_id = create_register(&db).await;

    let err = CashOpeningRepository::new(db.clone())
        .open(OpenSessionInput {
            user_id,
            cash_register_id: register_id,
            prior_balance: None,
            lines: vec![line("PYG", dec!(1000)), line("DOGE", dec!(5))],
        })
        .await
        .expect_err("unknown denomination must abort");

    assert!(matches!(err, CashError::UnknownDenomination(code) if code == "DOGE"));

    let sessions = CashSessionRepository::new(db.clone())
        .list_for_user(user_id)
        .await
        .expect("list");
    assert!(sessions.is_empty(), "no partial session may be left behind");
}

#[tokio::test]
async fn test_audit_withdraws_and_rejects_overdraw() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    open_session(&db, user_id, vec![line("PYG", dec!(100000))]).await;
    let audits = CashAuditRepository::new(db.clone());

    let outcome = audits
        .record(AuditInput {
            user_id,
            session_id: None,
            reason: "supplier payment".to_string(),
            lines: vec![line("PYG", dec!(30000))],
        })
        .await
        .expect("first withdrawal fits");

    assert_eq!(outcome.summary.available_balance(), dec!(70000));
    // Reason rides on exactly the first entry of the group.
    assert_eq!(outcome.ledger.len(), 1);
    assert_eq!(outcome.ledger[0].reason.as_deref(), Some("supplier payment"));

    let err = audits
        .record(AuditInput {
            user_id,
            session_id: None,
            reason: "too much".to_string(),
            lines: vec![line("PYG", dec!(80000))],
        })
        .await
        .expect_err("overdraw must be rejected");

    match err {
        CashError::InsufficientBalance { expected, provided } => {
            assert_eq!(expected, dec!(70000));
            assert_eq!(provided, dec!(80000));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // The rejected attempt left no ledger residue.
    let history = audits
        .history(user_id, None)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_audit_validation_happens_before_persistence() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    open_session(&db, user_id, vec![line("PYG", dec!(10000))]).await;
    let audits = CashAuditRepository::new(db.clone());

    let err = audits
        .record(AuditInput {
            user_id,
            session_id: None,
            reason: "  ".to_string(),
            lines: vec![line("PYG", dec!(100))],
        })
        .await
        .expect_err("blank reason");
    assert!(matches!(err, CashError::Validation(_)));

    let err = audits
        .record(AuditInput {
            user_id,
            session_id: None,
            reason: "zero lines".to_string(),
            lines: vec![line("PYG", dec!(0))],
        })
        .await
        .expect_err("no positive line");
    assert!(matches!(err, CashError::Validation(_)));
}

#[tokio::test]
async fn test_close_records_difference_exactly_once() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    open_session(&db, user_id, vec![line("PYG", dec!(100000))]).await;

    CashAuditRepository::new(db.clone())
        .record(AuditInput {
            user_id,
            session_id: None,
            reason: "till correction".to_string(),
            lines: vec![line("PYG", dec!(5000))],
        })
        .await
        .expect("withdrawal");

    let closings = CashClosingRepository::new(db.clone());

    // Theoretical 95000 against counted 94500 records -500.
    let outcome = closings
        .close(CloseInput {
            user_id,
            session_id: None,
            lines: vec![line("PYG", dec!(94500))],
        })
        .await
        .expect("close");

    assert_eq!(outcome.record.counted_total, dec!(94500));
    assert_eq!(outcome.record.difference, dec!(-500));
    assert_eq!(outcome.summary.theoretical_balance(), dec!(95000));

    let session_id = outcome.record.session_id;
    let err = closings
        .close(CloseInput {
            user_id,
            session_id: Some(session_id),
            lines: vec![line("PYG", dec!(94500))],
        })
        .await
        .expect_err("second close must fail");
    assert!(matches!(err, CashError::AlreadyClosed(id) if id == session_id));

    // The first record is unchanged.
    let listed = closings
        .list(user_id, ClosingFilter { mine: true, session_id: Some(session_id) })
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0.id, outcome.record.id);
    assert_eq!(listed[0].0.difference, dec!(-500));
}

#[tokio::test]
async fn test_ownership_is_absolute() {
    let Some(db) = test_db().await else { return };
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let opened = open_session(&db, owner, vec![line("PYG", dec!(50000))]).await;
    let session_id = opened.session.id;

    let err = CashAuditRepository::new(db.clone())
        .record(AuditInput {
            user_id: intruder,
            session_id: Some(session_id),
            reason: "not mine".to_string(),
            lines: vec![line("PYG", dec!(100))],
        })
        .await
        .expect_err("audit on another user's drawer");
    assert!(matches!(err, CashError::OwnershipMismatch(id) if id == session_id));

    let err = CashClosingRepository::new(db.clone())
        .close(CloseInput {
            user_id: intruder,
            session_id: Some(session_id),
            lines: vec![line("PYG", dec!(50000))],
        })
        .await
        .expect_err("close on another user's drawer");
    assert!(matches!(err, CashError::OwnershipMismatch(id) if id == session_id));
}

#[tokio::test]
async fn test_inactive_session_rejects_further_mutation() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    let opened = open_session(&db, user_id, vec![line("PYG", dec!(20000))]).await;
    let session_id = opened.session.id;

    CashClosingRepository::new(db.clone())
        .close(CloseInput {
            user_id,
            session_id: None,
            lines: vec![line("PYG", dec!(20000))],
        })
        .await
        .expect("close");

    let err = CashAuditRepository::new(db.clone())
        .record(AuditInput {
            user_id,
            session_id: Some(session_id),
            reason: "late".to_string(),
            lines: vec![line("PYG", dec!(100))],
        })
        .await
        .expect_err("audit after close");
    assert!(matches!(err, CashError::SessionInactive(id) if id == session_id));
}

#[tokio::test]
async fn test_order_guard_requires_session_and_posts_advance() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();
    let guard = OrderSessionGuard::new(db.clone());

    let err = guard
        .require_active_session(user_id)
        .await
        .expect_err("no session yet");
    assert!(matches!(err, CashError::SessionRequired(id) if id == user_id));

    open_session(&db, user_id, vec![line("PYG", dec!(10000))]).await;

    let session_id = guard
        .require_active_session(user_id)
        .await
        .expect("active session");

    let entry = guard
        .post_advance(session_id, dec!(5000), "order ORD-1027 advance")
        .await
        .expect("post advance");
    assert_eq!(entry.amount, dec!(5000));

    let (_, summary) = CashAuditRepository::new(db.clone())
        .available(user_id, None)
        .await
        .expect("summary");
    assert_eq!(summary.available_balance(), dec!(15000));

    let err = guard
        .post_advance(session_id, dec!(0), "zero")
        .await
        .expect_err("non-positive advance");
    assert!(matches!(err, CashError::Validation(_)));
}

#[tokio::test]
async fn test_second_opening_for_same_user_is_rejected() {
    let Some(db) = test_db().await else { return };
    let user_id = Uuid::new_v4();

    open_session(&db, user_id, vec![line("PYG", dec!(1000))]).await;
    let register_id = create_register(&db).await;

    let err = CashOpeningRepository::new(db.clone())
        .open(OpenSessionInput {
            user_id,
            cash_register_id: register_id,
            prior_balance: None,
            lines: vec![line("PYG", dec!(1000))],
        })
        .await
        .expect_err("one active session per user");
    assert!(matches!(err, CashError::Validation(_)));
}
