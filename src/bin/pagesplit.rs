//! pagesplit CLI - page-aware document segmentation
//!
//! # Examples
//!
//! ```bash
//! # Create a session from extracted pages
//! pagesplit create-session pages.json --split-mode heading
//!
//! # Edit the text and commit against the version it was based on
//! pagesplit get-session <id> --text --format json | jq -r .current_text > doc.txt
//! pagesplit update-text <id> --version 1 doc.txt
//!
//! # Re-chunk with a different strategy
//! pagesplit update-strategy <id> --version 2 --chunk-size 400 --overlap 50
//! ```

use clap::Parser;
use pagesplit::cli::output::print_error;
use pagesplit::cli::{run, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "pagesplit=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for JSON output
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}
