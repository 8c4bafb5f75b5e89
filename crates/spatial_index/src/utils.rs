//! Small helpers shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in milliseconds.
///
/// A clock set before the epoch yields 0 instead of panicking; the value
/// is only used to order updates of the same object.
pub fn current_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_monotonic_enough() {
        let a = current_timestamp_millis();
        let b = current_timestamp_millis();
        assert!(a > 0);
        assert!(b >= a);
    }
}
