use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::toml_config::LogFormat;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_level`; `--verbose` raises the fallback to
/// `debug`.
pub fn init_tracing(default_level: &str, format: LogFormat, verbose: bool) {
    let fallback = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}
