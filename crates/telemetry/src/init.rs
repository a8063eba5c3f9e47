// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Output shape of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    #[default]
    Json,
    /// Human-readable single-line output.
    Compact,
}

/// Filter used when `RUST_LOG` is unset: store and collector events at
/// `info`, pending registrations at `warn`.
pub const DEFAULT_FILTER: &str = "info,pending=warn";

/// Installs the global `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Records from the `log` facade
/// (the `pending` registry logs through it) are bridged into `tracing`.
/// Fails if a global subscriber or logger is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let output = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .boxed(),
    };
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(Registry::default().with(output).with(filter))?;
    Ok(())
}
