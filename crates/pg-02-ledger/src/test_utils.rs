use chrono::{Duration, TimeZone, Utc};
use shared_types::{KeyChangeRequest, RegistrationRequest, Timestamp};

pub const TEST_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOq test@host";

/// Base time plus `minutes`, so tests control creation order.
pub fn at(minutes: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn registration(id: &str, username: &str, email: &str, minutes: i64) -> RegistrationRequest {
    RegistrationRequest::new_pending(
        id.to_string(),
        username.to_string(),
        email.to_string(),
        None,
        TEST_KEY.to_string(),
        at(minutes),
    )
}

pub fn key_change(id: &str, username: &str, minutes: i64) -> KeyChangeRequest {
    KeyChangeRequest::new_pending(
        id.to_string(),
        username.to_string(),
        format!("{}@example.com", username),
        TEST_KEY.to_string(),
        Some("rotation".to_string()),
        at(minutes),
    )
}
