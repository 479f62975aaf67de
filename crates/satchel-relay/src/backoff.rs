//! Reconnect backoff calculation.
//!
//! Formula: `min(max_delay, base_delay * 2^attempt) * (1 + random * jitter)`,
//! with the random component in `[-1, 1]` supplied by the caller so the math
//! stays deterministic and testable.

/// Base delay for exponential backoff in milliseconds.
pub const BASE_DELAY_MS: u64 = 1000;
/// Maximum delay between reconnect attempts in milliseconds.
pub const MAX_DELAY_MS: u64 = 60_000;
/// Jitter factor: the delay varies by ±20% from the exponential value.
pub const JITTER_FACTOR: f64 = 0.2;

/// Calculate the reconnect delay for a zero-based `attempt` index.
///
/// `random` must be in `[-1, 1]`; values outside are clamped.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn backoff_delay_ms(attempt: u32, random: f64) -> u64 {
    let exponential = BASE_DELAY_MS.saturating_mul(2_u64.saturating_pow(attempt.min(16)));
    let capped = exponential.min(MAX_DELAY_MS);
    let jittered = capped as f64 * (1.0 + random.clamp(-1.0, 1.0) * JITTER_FACTOR);
    jittered.max(0.0) as u64
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_without_jitter() {
        assert_eq!(backoff_delay_ms(0, 0.0), 1000);
        assert_eq!(backoff_delay_ms(1, 0.0), 2000);
        assert_eq!(backoff_delay_ms(2, 0.0), 4000);
        assert_eq!(backoff_delay_ms(3, 0.0), 8000);
    }

    #[test]
    fn caps_at_max_delay() {
        assert_eq!(backoff_delay_ms(10, 0.0), MAX_DELAY_MS);
        assert_eq!(backoff_delay_ms(u32::MAX, 0.0), MAX_DELAY_MS);
    }

    #[test]
    fn jitter_spreads_around_base() {
        assert_eq!(backoff_delay_ms(0, 1.0), 1200);
        assert_eq!(backoff_delay_ms(0, -1.0), 800);
    }

    #[test]
    fn out_of_range_random_is_clamped() {
        assert_eq!(backoff_delay_ms(0, 5.0), backoff_delay_ms(0, 1.0));
        assert_eq!(backoff_delay_ms(0, -5.0), backoff_delay_ms(0, -1.0));
    }
}
