//! Access-window check for unlock requests.

use chrono::{DateTime, Utc};

/// Whether `now` falls inside the paid window `(check_in, check_out)`.
///
/// The interval is strictly open on both sides: a request at the exact
/// check-in or check-out instant is outside the window. This boundary
/// behavior is a compatibility contract with the lock firmware flow
/// and must not be loosened to `>=`/`<=`.
pub fn is_unlock_window_open(
    check_in_time: DateTime<Utc>,
    check_out_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    now > check_in_time && now < check_out_time
}

// ── Tests ──────────────────────────────────────────────────────
