//! # Ledger Policies
//!
//! The two ledger kinds share one implementation and differ only in the
//! knobs below.

/// How `get_by_subject` resolves a subject with several records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectLookup {
    /// The Pending record if one exists, otherwise the newest of any status.
    AnyStatus,
    /// Only a Pending record counts as a match.
    PendingOnly,
}

/// Per-kind ledger behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerPolicy {
    /// Kind name used in errors and logs.
    pub name: &'static str,
    /// Whether `create` also enforces one Pending record per email.
    pub unique_email: bool,
    pub subject_lookup: SubjectLookup,
}

impl LedgerPolicy {
    /// Registration ledger: email is unique among Pending records and
    /// subject lookups return history too.
    pub const fn registration() -> Self {
        Self {
            name: "registration",
            unique_email: true,
            subject_lookup: SubjectLookup::AnyStatus,
        }
    }

    /// Key-change ledger: subject lookups see Pending records only.
    pub const fn key_change() -> Self {
        Self {
            name: "key change",
            unique_email: false,
            subject_lookup: SubjectLookup::PendingOnly,
        }
    }
}
