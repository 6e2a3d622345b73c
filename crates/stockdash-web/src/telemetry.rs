use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;
use crate::error::AppError;

pub const DEFAULT_FILTER: &str =
    "stockdash=info,stockdash_core=info,stockdash_web=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
/// Logs go to stderr so `stockdash fetch` output stays clean.
pub fn init(format: LogFormat) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|error| AppError::Telemetry(error.to_string()))
}
