
use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

const GUEST_ID_PREFIX: &str = "user_";
const GUEST_ID_LEN: usize = 9;

/// Process-wide monotonically increasing connection id.
pub fn get_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Generates a `user_xxxxxxxxx` identifier for clients that joined without one.
pub fn generate_guest_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GUEST_ID_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{GUEST_ID_PREFIX}{suffix}")
}
