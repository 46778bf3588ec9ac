//! Command-line identifier discovery
//!
//! Usage:
//!   lrdd-lookup alice@example.org
//!   lrdd-lookup --format xml --timeout 5 https://example.org/@alice
//!   lrdd-lookup --aliases acct:alice@example.org

use clap::{Parser, ValueEnum};
use lrdd_discovery::{Discovery, HostBlocklist};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::EnvFilter;
use xrd::Format;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Xml,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Xml => Format::Xml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lrdd-lookup")]
#[command(about = "Resolve an identifier to its resource descriptor")]
#[command(version)]
struct Args {
    /// acct: address, profile URL or other URI
    identifier: String,

    /// Output format of the descriptor
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Print the known aliases instead of the descriptor
    #[arg(long)]
    aliases: bool,

    /// Never fetch from this host or its subdomains (repeatable)
    #[arg(long = "block-host")]
    block_hosts: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lrdd_discovery=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let discovery = match Discovery::builder()
        .timeout(Duration::from_secs(args.timeout))
        .policy(Arc::new(HostBlocklist::new(&args.block_hosts)))
        .build()
    {
        Ok(discovery) => discovery,
        Err(e) => {
            error!(error = %e, "Failed to create HTTP client");
            return ExitCode::FAILURE;
        }
    };

    if args.aliases {
        let aliases = discovery.profile_aliases(&args.identifier).await;
        if aliases.is_empty() {
            eprintln!("No aliases found for {}", args.identifier);
            return ExitCode::FAILURE;
        }
        for alias in aliases {
            println!("{}", alias);
        }
        return ExitCode::SUCCESS;
    }

    let descriptor = match discovery.lookup(&args.identifier).await {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match descriptor.render(args.format.into()) {
        Ok(body) => {
            println!("{}", body);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
