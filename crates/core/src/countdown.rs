//! Human-readable countdown formatting for entitlement expiry.

use crate::types::Timestamp;

/// Format the time remaining until `expires_at` for display next to the
/// unlock indicator: `"3h 12m remaining"`, `"45m remaining"`, or
/// `"Expired"` once the deadline has passed.
pub fn format_remaining(expires_at: Timestamp, now: Timestamp) -> String {
    let diff = expires_at - now;
    if diff <= chrono::Duration::zero() {
        return "Expired".to_string();
    }

    let hours = diff.num_hours();
    let minutes = diff.num_minutes() % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m remaining")
    } else {
        format!("{minutes}m remaining")
    }
}
