use tracing_subscriber::EnvFilter;

/// Initialise pipeline logging: human-readable status lines on stdout,
/// level overridable via `RUST_LOG`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
