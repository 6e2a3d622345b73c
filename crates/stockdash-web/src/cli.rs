//! Command-line interface for the `stockdash` binary.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the quote endpoint and dashboard (default) |
//! | `fetch` | Print one aggregated quote response as JSON |
//!
//! ```bash
//! stockdash serve --port 5000
//! stockdash fetch AAPL,MSFT --range 6M --pretty
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use stockdash_core::RangeToken;

use crate::dashboard::DEFAULT_API_BASE_URL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Parser)]
#[command(
    name = "stockdash",
    author,
    version,
    about = "Side-by-side stock comparison dashboard"
)]
pub struct Cli {
    /// Log line format. `RUST_LOG` controls verbosity.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve `/api/stock/{tickers}` and the dashboard.
    Serve(ServeArgs),
    /// Fetch tickers once and print the response body.
    Fetch(FetchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Where the dashboard sends its quote requests.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Comma-separated ticker list, e.g. `AAPL,MSFT`.
    pub tickers: String,

    #[arg(long, value_parser = parse_range, default_value = "1Y")]
    pub range: RangeToken,

    #[arg(long)]
    pub pretty: bool,
}

fn parse_range(raw: &str) -> Result<RangeToken, String> {
    raw.parse::<RangeToken>().map_err(|error| error.to_string())
}
