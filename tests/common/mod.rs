pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps);
}

/// Initializes `env_logger` so `cargo test -- --nocapture` shows the scheduler's
/// hit/miss/eviction log lines. Safe to call from every test; the first call wins.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
