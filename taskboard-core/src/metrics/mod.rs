//! Metrics for board sharing operations
//!
//! Counters go through the `metrics` facade. Installing an exporter is left to
//! the binary; without one every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Instant;

pub const MEMBERS_ADDED: &str = "board.members.added";
pub const MEMBERS_REMOVED: &str = "board.members.removed";
pub const MEMBERS_ROLE_UPDATED: &str = "board.members.role_updated";
pub const INVITES_CREATED: &str = "board.invites.created";
pub const INVITES_ACCEPTED: &str = "board.invites.accepted";
pub const INVITES_REJECTED: &str = "board.invites.rejected";
pub const INVITES_REVOKED: &str = "board.invites.revoked";
pub const STORE_CONFLICTS: &str = "board.store.conflicts";
pub const MUTATION_DURATION: &str = "board.mutation.duration_ms";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(MEMBERS_ADDED, "Members added or upserted directly");
    describe_counter!(MEMBERS_REMOVED, "Members removed or departed");
    describe_counter!(MEMBERS_ROLE_UPDATED, "Member role changes");
    describe_counter!(INVITES_CREATED, "Invite links created");
    describe_counter!(INVITES_ACCEPTED, "Invite links redeemed successfully");
    describe_counter!(INVITES_REJECTED, "Invite redemptions refused");
    describe_counter!(INVITES_REVOKED, "Invite links revoked");
    describe_counter!(STORE_CONFLICTS, "Optimistic save conflicts that forced a retry");
    describe_histogram!(MUTATION_DURATION, "Board mutation duration in milliseconds, retries included");
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Timer for measuring operation duration
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let duration = self.start.elapsed();
        histogram!(self.name).record(duration.as_secs_f64() * 1000.0);
    }
}
