use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use stockdash_core::{QuoteAggregator, YahooAdapter};
use stockdash_web::cli::{Cli, Command, FetchArgs, ServeArgs};
use stockdash_web::{serve, telemetry, AppError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format)?;

    match cli.command {
        Some(Command::Serve(args)) => serve(&args).await,
        Some(Command::Fetch(args)) => fetch(&args).await,
        None => serve(&ServeArgs::default()).await,
    }
}

async fn fetch(args: &FetchArgs) -> Result<(), AppError> {
    let aggregator = QuoteAggregator::new(Arc::new(YahooAdapter::default()));
    let results = aggregator.aggregate(&args.tickers, args.range).await?;

    let body = if args.pretty {
        serde_json::to_string_pretty(&results)?
    } else {
        serde_json::to_string(&results)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{body}")?;
    Ok(())
}
