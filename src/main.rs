//! slidetool - inspect whole-slide images with OpenSlide.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fastslide::native::openslide::{self, OpenSlide};
use fastslide::{Cli, SlideTool};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.log_filter());

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!("Using OpenSlide {}", openslide::version());

    let tool = match SlideTool::new(&OpenSlide, cli.cache_size) {
        Ok(tool) => tool,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let stderr = io::stderr();
    match tool.run(&cli.command, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            error!("Failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
