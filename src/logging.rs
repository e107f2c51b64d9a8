use tracing_subscriber::filter::EnvFilter;

/// Installs the global fmt subscriber on stderr so stdout stays free for JSON lines.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks `debug` over `info`.
/// A second call is a no-op.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
