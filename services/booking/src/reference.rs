//! Human-readable booking references
//!
//! A reference is `BK`, the user id in base 36, then the creation instant as
//! base-36 microseconds since the epoch, zero-padded to a fixed width so the
//! two parts cannot run into each other. Two bookings by the same user in the
//! same microsecond get the same reference: uniqueness is practical, not
//! guaranteed, and the `bookings.booking_reference` unique constraint is the
//! final guard. Within one process [`ReferenceGenerator`] never hands out the
//! same timestamp twice.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

const PREFIX: &str = "BK";

/// Width of the timestamp part; 36^11 microseconds is well past year 3000
const TIMESTAMP_WIDTH: usize = 11;

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Build the reference for a booking made by `user_id` at `at`
pub fn generate(user_id: i64, at: DateTime<Utc>) -> String {
    let micros = u64::try_from(at.timestamp_micros()).unwrap_or(0);
    format!(
        "{}{}{:0>width$}",
        PREFIX,
        base36(user_id.unsigned_abs()),
        base36(micros),
        width = TIMESTAMP_WIDTH
    )
}

/// Issues references with strictly increasing timestamps
#[derive(Debug, Default)]
pub struct ReferenceGenerator {
    last_micros: AtomicI64,
}

impl ReferenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference for `user_id` at the current time, bumped by a microsecond
    /// if the clock has not moved since the previous call
    pub fn next(&self, user_id: i64) -> String {
        let now = Utc::now().timestamp_micros();
        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        let micros = now.max(previous + 1);

        let at = DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now);
        generate(user_id, at)
    }
}

fn base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}
