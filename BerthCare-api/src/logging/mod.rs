//! Process-wide tracing setup

pub mod redact;

use berthcare_domain::config::AppConfig;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

pub use redact::{redact, RedactingMakeWriter, RedactingWriter, REDACTED};

/// Install the global subscriber writing redacted records to stdout
pub fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(config, std::io::stdout))
        .init();
}

/// Formatting layer for `config`: human-readable locally, JSON lines in
/// production. Everything written to `writer` is redacted first.
pub fn fmt_layer<S, W>(config: &AppConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let writer = RedactingMakeWriter::new(writer);

    if config.environment.is_production() {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(false)
            .with_timer(fmt::time::uptime())
            .with_writer(writer)
            .boxed()
    }
}
