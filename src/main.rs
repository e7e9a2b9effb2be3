//! Main entry point for the tubedrop binary

use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubedrop::cli::{Args, Command, FetchArgs, OutputFormatter};
use tubedrop::core::{Downloader, FetchRequest};
use tubedrop::extractor::YtDlp;
use tubedrop::web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.default_log_filter())?;
    debug!("Starting tubedrop {} with args: {:?}", env!("CARGO_PKG_VERSION"), args);

    let formatter = OutputFormatter::new(args.verbosity_level());

    match args.command() {
        Command::Serve(serve) => {
            let config = serve.to_config();
            info!("Serving with {:?}", config);
            web::serve(config).await?;
        }
        Command::Fetch(fetch) => handle_fetch(fetch, formatter).await?,
        Command::Presets => formatter.print_presets(),
    }

    Ok(())
}

/// Handle a single download from the command line
async fn handle_fetch(
    args: FetchArgs,
    mut formatter: OutputFormatter,
) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    formatter.print_fetch_start(&args.url, args.preset);

    formatter.start_spinner();
    let mut downloader = Downloader::new(Arc::new(YtDlp::new().with_binary(&args.yt_dlp)))
        .with_observer(formatter.stage_callback());
    if let Some(dir) = &args.temp_dir {
        downloader = downloader.with_temp_root(dir);
    }

    let request = FetchRequest::new(args.url.clone(), args.preset);
    let outcome = match downloader.fetch(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            formatter.finish_spinner("Failed");
            formatter.error(&e.to_string());
            formatter.debug(&e.detail());
            std::process::exit(1);
        }
    };
    formatter.finish_spinner(&outcome.output.filename);
    formatter.info(&format!("Title: {}", outcome.title));

    for notice in &outcome.notices {
        formatter.notice(notice);
    }

    let saved_to = outcome.save_to(&args.output).await?;
    let size = tokio::fs::metadata(&saved_to).await?.len();
    info!("Saved {:?}", saved_to);

    formatter.print_fetch_complete(&saved_to, size, start_time.elapsed());
    Ok(())
}

/// Initialize logging system
fn init_logging(default_filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
