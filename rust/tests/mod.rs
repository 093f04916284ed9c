mod properties;
mod scenarios;

/// Install a logger capturing `log` output in test mode. Safe to call repeatedly.
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
