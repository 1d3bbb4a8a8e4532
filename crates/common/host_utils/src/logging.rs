use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Initialize a `tracing_subscriber`
///
/// Reports all the log events sent either with the `log` crate or the `tracing` crate.
///
/// 1. If `debug` is `true` then all the events up to `debug!` are reported.
/// 2. Else, if the `RUST_LOG` variable is set, it is used as the filter.
/// 3. Else only `error!`, `warn!` and `info!` are reported.
pub fn initialise_tracing_subscriber(debug: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

    if debug {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
    } else if std::env::var("RUST_LOG").is_ok() {
        subscriber
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
