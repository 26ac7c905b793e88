use super::*;
use crate::sessions::tokens::hash_guest_token;
use shared::dto::SubmitScope;
use shared::models::PaymentStatus;
use shared::util::now_millis;

const IDLE_MS: i64 = 180 * 60_000;

#[test]
fn test_idle_session_without_orders_cancelled() {
    let fx = Fixture::new();
    let (outcome, alice) = fx.open("Alice");
    let sid = outcome.session.id.as_str();
    fx.add(sid, &alice, &fx.soda, 1);

    let report = fx.manager.sweep(now_millis() + IDLE_MS + 1, IDLE_MS).unwrap();
    assert_eq!(report.cancelled, vec![sid.to_string()]);

    let session = fx.session(sid);
    assert_eq!(session.status, SessionStatus::Cancelled);
    assert_eq!(session.payment_status, PaymentStatus::Void);
    assert!(fx.table(fx.table.id).current_session_id.is_none());
    assert_eq!(report.purged_tokens, 1);
    assert!(
        fx.manager
            .storage()
            .find_guest_token(&hash_guest_token(&alice))
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_recent_session_kept() {
    let fx = Fixture::new();
    let (outcome, _) = fx.open("Alice");

    let report = fx.manager.sweep(now_millis(), IDLE_MS).unwrap();
    assert!(report.is_empty());
    assert_eq!(fx.session(&outcome.session.id).status, SessionStatus::Active);
}

#[test]
fn test_idle_session_with_orders_left_for_staff() {
    let fx = Fixture::new();
    let (outcome, alice) = fx.open("Alice");
    let sid = outcome.session.id.as_str();
    fx.add(sid, &alice, &fx.burger, 1);
    fx.manager.submit_order(sid, &alice, SubmitScope::Mine).unwrap();

    let report = fx.manager.sweep(now_millis() + IDLE_MS * 2, IDLE_MS).unwrap();
    assert!(report.cancelled.is_empty());
    assert_eq!(fx.session(sid).status, SessionStatus::Active);
}

#[test]
fn test_awaiting_payment_never_swept() {
    let fx = Fixture::new();
    let (outcome, alice) = fx.open("Alice");
    let sid = outcome.session.id.as_str();
    fx.manager.request_bill(sid, &alice).unwrap();

    let report = fx.manager.sweep(now_millis() + IDLE_MS * 2, IDLE_MS).unwrap();
    assert!(report.cancelled.is_empty());
    assert_eq!(fx.session(sid).status, SessionStatus::AwaitingPayment);
}

#[test]
fn test_paused_idle_session_cancelled() {
    let fx = Fixture::new();
    let (outcome, _) = fx.open("Alice");
    let sid = outcome.session.id.as_str();
    fx.manager.pause_session(AccessScope::All, sid).unwrap();

    let report = fx.manager.sweep(now_millis() + IDLE_MS * 2, IDLE_MS).unwrap();
    assert_eq!(report.cancelled.len(), 1);
    assert_eq!(fx.session(sid).status, SessionStatus::Cancelled);
}

#[test]
fn test_dangling_pointer_reconciled() {
    let fx = Fixture::new();
    let mut table = fx.table(fx.other_table.id);
    table.current_session_id = Some("ghost".to_string());
    let txn = fx.manager.storage().begin_write().unwrap();
    fx.manager.storage().put_table(&txn, &table).unwrap();
    txn.commit().unwrap();

    let report = fx.manager.sweep(now_millis(), IDLE_MS).unwrap();
    assert_eq!(report.reconciled_tables, vec![fx.other_table.id]);
    assert!(fx.table(fx.other_table.id).current_session_id.is_none());

    // A dangling pointer does not block a new session either
    let mut table = fx.table(fx.other_table.id);
    table.current_session_id = Some("ghost".to_string());
    let txn = fx.manager.storage().begin_write().unwrap();
    fx.manager.storage().put_table(&txn, &table).unwrap();
    txn.commit().unwrap();

    let outcome = fx
        .manager
        .create_or_join(JoinTarget::TableId(fx.other_table.id), "Dan", None, None, None)
        .unwrap();
    assert!(outcome.created);
    assert_eq!(
        fx.table(fx.other_table.id).current_session_id.as_deref(),
        Some(outcome.session.id.as_str())
    );
}

#[test]
fn test_sweep_purges_tokens_of_ended_sessions() {
    let fx = Fixture::new();
    let (outcome, alice) = fx.open("Alice");
    let bob = fx.join(&outcome.session.session_code, "Bob");
    fx.manager
        .end_session(AccessScope::All, &outcome.session.id)
        .unwrap();

    let report = fx.manager.sweep(now_millis(), IDLE_MS).unwrap();
    assert_eq!(report.purged_tokens, 2);
    for token in [alice, bob] {
        assert!(
            fx.manager
                .storage()
                .find_guest_token(&hash_guest_token(&token))
                .unwrap()
                .is_none()
        );
    }
}
