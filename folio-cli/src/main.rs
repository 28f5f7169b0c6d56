//! Folio CLI
//!
//! ```bash
//! folio serve --content-url https://cms.example.com
//! folio check
//! folio render /blog --fixtures fixtures/demo.json
//! ```
//!
//! See `folio --help` for all commands and options.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Server-rendered pages over a headless content API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Config file (default: ./folio.toml if present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read content from a JSON fixtures file instead of the content service
    #[arg(long, value_name = "PATH")]
    pub fixtures: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        #[command(flatten)]
        source: SourceArgs,

        /// Listening address
        #[arg(long)]
        host: Option<String>,

        /// Listening port
        #[arg(long, short = 'p')]
        port: Option<u16>,

        /// Content API base URL
        #[arg(long, value_name = "URL")]
        content_url: Option<String>,
    },
    /// Validate configuration and read the site settings once
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Render one route to stdout
    Render {
        /// Route path, e.g. `/blog/hello-world`
        path: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the data bag as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { source, host, port, content_url } => {
            let overrides = commands::serve::Overrides { host, port, content_url };
            commands::serve::run(&source, overrides).await
        }
        Commands::Check { source } => commands::check::run(&source).await,
        Commands::Render { path, source, json } => commands::render::run(&source, &path, json).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
