//! # routesync
//!
//! Command-line front end for the routesync synchronization engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                 apps/routesync (THE BINARY)               │
//! │                                                           │
//! │   ┌─────────────┐   ┌─────────────┐   ┌──────────────┐    │
//! │   │    CLI      │──▶│   Replay    │──▶│ TOML config  │    │
//! │   │   (clap)    │   │  (session)  │   │   (toml)     │    │
//! │   └─────────────┘   └──────┬──────┘   └──────────────┘    │
//! │                            ▼                              │
//! │                   ┌─────────────────┐                     │
//! │                   │ routesync-core  │                     │
//! │                   │   (THE LOGIC)   │                     │
//! │                   └─────────────────┘                     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! routesync replay -s scenario.toml
//! routesync match -r routes.toml /users/42
//! routesync check -s scenario.toml --json-mode
//! ```

use clap::Parser;
use routesync::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing - ROUTESYNC_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ROUTESYNC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "routesync=debug,routesync_core=debug"
    } else {
        "routesync=info,routesync_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the routesync startup banner.
fn print_banner() {
    println!(
        r#"
  routesync v{}
  navigation source <-> store
"#,
        env!("CARGO_PKG_VERSION")
    );
}
