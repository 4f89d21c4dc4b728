//! # Coordinator Tests

use super::*;
use crate::domain::errors::ErrorKind;
use crate::ports::inbound::{KeyChangeApi, RegistrationApi};
use crate::ports::outbound::ManualTimeSource;
use chrono::{Duration, TimeZone, Utc};
use pg_02_ledger::{LedgerPolicy, LedgerStore, MemoryLedger};
use pg_03_provisioner::{FailurePoint, InMemoryProvisioner};
use shared_types::{
    ApproveInput, KeyChangeInput, RegisterInput, RejectInput, RequestStatus,
};

const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIA alice@laptop";
const NEW_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQAB alice@desktop";

type TestCoordinator = LifecycleCoordinator<
    InMemoryProvisioner,
    MemoryLedger<RegistrationRequest>,
    MemoryLedger<KeyChangeRequest>,
>;

struct Harness {
    coordinator: TestCoordinator,
    provisioner: Arc<InMemoryProvisioner>,
    clock: Arc<ManualTimeSource>,
}

fn harness() -> Harness {
    let provisioner = Arc::new(InMemoryProvisioner::new());
    let clock = Arc::new(ManualTimeSource::new(
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap(),
    ));
    let coordinator = LifecycleCoordinator::new(
        Arc::new(LedgerStore::in_memory(LedgerPolicy::registration())),
        Arc::new(LedgerStore::in_memory(LedgerPolicy::key_change())),
        Arc::clone(&provisioner),
    )
    .with_clock(clock.clone());

    Harness {
        coordinator,
        provisioner,
        clock,
    }
}

fn register(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        username: username.into(),
        email: email.into(),
        team: Some("platform".into()),
        public_key: KEY.into(),
    }
}

fn key_change(username: &str, email: &str) -> KeyChangeInput {
    KeyChangeInput {
        username: username.into(),
        email: email.into(),
        new_public_key: NEW_KEY.into(),
        reason: Some("laptop lost".into()),
    }
}

fn admin() -> ApproveInput {
    ApproveInput::default()
}

// =============================================================================
// Registration: submission
// =============================================================================

#[test]
fn test_submit_creates_pending_request() {
    let h = harness();
    let mut input = register("alice", "alice@example.com");
    input.public_key = format!("  {}\r\n", KEY);

    let created = h.coordinator.submit_registration(&input).unwrap();
    assert!(created.id.starts_with("req-"));

    let stored = h.coordinator.registration_for("alice").unwrap();
    assert_eq!(stored, created);
    assert_eq!(stored.status(), RequestStatus::Pending);
    assert_eq!(stored.public_key, KEY);
    assert_eq!(stored.team.as_deref(), Some("platform"));
    assert_eq!(stored.lifecycle.created_at, h.clock.now());
    assert!(h.coordinator.registration_pending_for("alice").unwrap());
    assert!(h
        .coordinator
        .registration_pending_for_email("alice@example.com")
        .unwrap());
}

#[test]
fn test_submit_reports_every_violation() {
    let h = harness();
    let input = RegisterInput {
        username: "A".into(),
        email: "not-an-email".into(),
        team: None,
        public_key: "hello".into(),
    };

    let err = h.coordinator.submit_registration(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.messages().len(), 3);
    assert!(h.coordinator.list_registrations(None).unwrap().is_empty());
}

#[test]
fn test_submit_conflicts_name_the_field() {
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();

    let err = h
        .coordinator
        .submit_registration(&register("alice", "other@example.com"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict { field: "username", .. }));

    let err = h
        .coordinator
        .submit_registration(&register("bob", "alice@example.com"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict { field: "email", .. }));
}

#[test]
fn test_submit_refuses_provisioned_subject() {
    let h = harness();
    h.provisioner.seed_subject("alice", None, KEY);

    let err = h
        .coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("already provisioned"));
}

#[test]
fn test_email_domain_allowlist() {
    let h = harness();
    let coordinator = h
        .coordinator
        .with_allowed_domains(vec!["corp.example".into()]);

    assert!(coordinator
        .submit_registration(&register("alice", "alice@corp.example"))
        .is_ok());

    let err = coordinator
        .submit_registration(&register("bob", "bob@gmail.com"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

// =============================================================================
// Registration: decisions
// =============================================================================

#[test]
fn test_example_scenario() {
    let h = harness();

    let created = h
        .coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();
    assert_eq!(created.status(), RequestStatus::Pending);

    let err = h
        .coordinator
        .submit_registration(&register("alice", "alice2@example.com"))
        .unwrap_err();
    assert!(matches!(
        err,
        LifecycleError::Conflict { field: "username", ref value, .. } if value == "alice"
    ));

    h.clock.advance(Duration::minutes(30));
    h.coordinator.approve_registration("alice", &admin()).unwrap();

    let stored = h.coordinator.registration_for("alice").unwrap();
    assert_eq!(stored.status(), RequestStatus::Approved);
    assert_eq!(stored.lifecycle.processed_by.as_deref(), Some("admin"));
    assert_eq!(stored.lifecycle.processed_at, Some(h.clock.now()));
    assert!(h.provisioner.subject_exists("alice").unwrap());

    let err = h
        .coordinator
        .approve_registration("alice", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.provisioner.calls(FailurePoint::CreateSubject), 1);
}

#[test]
fn test_decisions_on_unknown_subject() {
    let h = harness();

    let err = h
        .coordinator
        .approve_registration("ghost", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = h
        .coordinator
        .reject_registration("ghost", &RejectInput::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_reject_records_reason_and_frees_subject() {
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();

    let rejected = h
        .coordinator
        .reject_registration(
            "alice",
            &RejectInput {
                processed_by: "ops".into(),
                reason: Some("unknown team".into()),
            },
        )
        .unwrap();
    assert_eq!(rejected.status(), RequestStatus::Rejected);
    assert_eq!(rejected.lifecycle.reject_reason.as_deref(), Some("unknown team"));
    assert_eq!(h.provisioner.calls(FailurePoint::CreateSubject), 0);

    // Closed: no second decision
    let err = h
        .coordinator
        .approve_registration("alice", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Subject free again
    h.clock.advance(Duration::hours(1));
    let second = h
        .coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();
    assert_eq!(h.coordinator.registration_for("alice").unwrap().id, second.id);
}

#[test]
fn test_provisioner_failure_leaves_request_pending() {
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();
    h.provisioner
        .inject_failure(FailurePoint::CreateSubject, "useradd: cannot lock /etc/passwd");

    let err = h
        .coordinator
        .approve_registration("alice", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provisioner);
    assert!(err.to_string().contains("cannot lock /etc/passwd"));

    let stored = h.coordinator.registration_for("alice").unwrap();
    assert_eq!(stored.status(), RequestStatus::Pending);
    assert_eq!(stored.lifecycle.processed_by, None);

    h.provisioner.clear_failure(FailurePoint::CreateSubject);
    h.coordinator.approve_registration("alice", &admin()).unwrap();
}

#[test]
fn test_out_of_band_provisioning_blocks_approval() {
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();
    h.provisioner.seed_subject("alice", None, KEY);

    let err = h
        .coordinator
        .approve_registration("alice", &admin())
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict { field: "username", .. }));
    assert_eq!(
        h.coordinator.registration_for("alice").unwrap().status(),
        RequestStatus::Pending
    );
    assert_eq!(h.provisioner.calls(FailurePoint::CreateSubject), 0);
}

#[test]
fn test_blank_operator_defaults_to_admin() {
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();

    let approved = h
        .coordinator
        .approve_registration(
            "alice",
            &ApproveInput {
                processed_by: "  ".into(),
            },
        )
        .unwrap();
    assert_eq!(approved.lifecycle.processed_by.as_deref(), Some("admin"));
}

#[test]
fn test_list_filters_and_orders() {
    let h = harness();
    for name in ["alice", "bob", "carol"] {
        h.coordinator
            .submit_registration(&register(name, &format!("{}@example.com", name)))
            .unwrap();
        h.clock.advance(Duration::minutes(1));
    }
    h.coordinator
        .reject_registration("bob", &RejectInput::default())
        .unwrap();

    let all: Vec<_> = h
        .coordinator
        .list_registrations(None)
        .unwrap()
        .into_iter()
        .map(|r| r.username)
        .collect();
    assert_eq!(all, vec!["carol", "bob", "alice"]);

    let pending = h
        .coordinator
        .list_registrations(Some(RequestStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|r| r.username != "bob"));
}

// =============================================================================
// Key changes
// =============================================================================

#[test]
fn test_key_change_requires_provisioned_subject() {
    let h = harness();
    let err = h
        .coordinator
        .submit_key_change(&key_change("alice", "alice@example.com"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { what: "user", .. }));
}

#[test]
fn test_key_change_email_must_match_record() {
    let h = harness();
    h.provisioner
        .seed_subject("alice", Some("alice@example.com"), KEY);

    let err = h
        .coordinator
        .submit_key_change(&key_change("alice", "mallory@example.com"))
        .unwrap_err();
    assert!(matches!(err, LifecycleError::Conflict { field: "email", .. }));

    h.coordinator
        .submit_key_change(&key_change("alice", "Alice@Example.com"))
        .unwrap();
}

#[test]
fn test_key_change_without_recorded_email_proceeds() {
    let h = harness();
    h.provisioner.seed_subject("bob", None, KEY);
    h.coordinator
        .submit_key_change(&key_change("bob", "bob@example.com"))
        .unwrap();

    h.provisioner.seed_subject("carol", Some("carol@example.com"), KEY);
    h.provisioner
        .inject_failure(FailurePoint::ContactEmail, "metadata unreadable");
    h.coordinator
        .submit_key_change(&key_change("carol", "someone@example.com"))
        .unwrap();
}

#[test]
fn test_key_change_approve_rotates_key() {
    let h = harness();
    h.provisioner
        .seed_subject("alice", Some("alice@example.com"), KEY);

    let submitted = h
        .coordinator
        .submit_key_change(&key_change("alice", "alice@example.com"))
        .unwrap();
    assert!(submitted.id.starts_with("keychange-"));
    assert_eq!(h.coordinator.key_change_for("alice").unwrap(), submitted);

    let err = h
        .coordinator
        .submit_key_change(&key_change("alice", "alice@example.com"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let approved = h.coordinator.approve_key_change("alice", &admin()).unwrap();
    assert_eq!(approved.status(), RequestStatus::Approved);
    assert_eq!(h.provisioner.public_key("alice").as_deref(), Some(NEW_KEY));

    // Only Pending key changes are looked up by subject
    let err = h.coordinator.key_change_for("alice").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(
        h.coordinator.get_key_change(&approved.id).unwrap().status(),
        RequestStatus::Approved
    );

    // A repeated decision sees the closed request
    let err = h
        .coordinator
        .approve_key_change("alice", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(h.provisioner.calls(FailurePoint::UpdateCredential), 1);
}

#[test]
fn test_key_change_failure_and_reject() {
    let h = harness();
    h.provisioner.seed_subject("alice", None, KEY);
    h.coordinator
        .submit_key_change(&key_change("alice", "alice@example.com"))
        .unwrap();

    h.provisioner
        .inject_failure(FailurePoint::UpdateCredential, "home directory missing");
    let err = h
        .coordinator
        .approve_key_change("alice", &admin())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Provisioner);
    assert_eq!(h.provisioner.public_key("alice").as_deref(), Some(KEY));
    assert!(h.coordinator.key_change_pending_for("alice").unwrap());

    let rejected = h
        .coordinator
        .reject_key_change("alice", &RejectInput::default())
        .unwrap();
    assert_eq!(rejected.status(), RequestStatus::Rejected);
    assert!(!h.coordinator.key_change_pending_for("alice").unwrap());
    assert_eq!(
        h.coordinator
            .list_key_changes(Some(RequestStatus::Rejected))
            .unwrap()
            .len(),
        1
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_submits_single_winner() {
    const CALLERS: usize = 12;
    let h = harness();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let coordinator = &h.coordinator;
                scope.spawn(move || {
                    coordinator
                        .submit_registration(&register("alice", &format!("a{}@example.com", i)))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind() == ErrorKind::Conflict));
    assert_eq!(
        h.coordinator
            .list_registrations(Some(RequestStatus::Pending))
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_concurrent_approvals_provision_once() {
    const OPERATORS: usize = 8;
    let h = harness();
    h.coordinator
        .submit_registration(&register("alice", "alice@example.com"))
        .unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..OPERATORS)
            .map(|i| {
                let coordinator = &h.coordinator;
                scope.spawn(move || {
                    coordinator.approve_registration(
                        "alice",
                        &ApproveInput {
                            processed_by: format!("op{}", i),
                        },
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| e.kind() == ErrorKind::InvalidState));
    assert_eq!(h.provisioner.calls(FailurePoint::CreateSubject), 1);
}
