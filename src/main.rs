use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod compile;
mod config;
mod server;
mod util;

#[derive(Parser)]
#[command(version, about = "Serve a directory of markdown as a documentation site")]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: GitdocCommand,
}

#[derive(Parser)]
struct ServeArgs {
    /// The directory to serve
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "4567")]
    port: u16,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file (default: gitdoc.yaml in DIR)
    #[arg(short, long)]
    config_file: Option<PathBuf>,

    /// Page title
    #[arg(long)]
    title: Option<String>,

    /// Extra markup for the page <head>
    #[arg(long)]
    header: Option<String>,

    /// Leave the default theme out of /gitdoc.css
    #[arg(long)]
    no_default_styles: bool,

    /// Also write every served page under the export directory
    #[arg(long)]
    export: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser)]
struct RenderArgs {
    /// A .md, .html or .coffee file
    file: PathBuf,

    /// The path to the configuration file (default: gitdoc.yaml next to FILE)
    #[arg(short, long)]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum GitdocCommand {
    /// Serve a directory over HTTP
    Serve(ServeArgs),

    /// Compile one file and print the result
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let verbose = matches!(&args.command, GitdocCommand::Serve(serve) if serve.verbose);
    let filter = if verbose {
        EnvFilter::new("gitdoc=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gitdoc=info,tower_http=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        GitdocCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        GitdocCommand::Render(args) => {
            commands::render::run(&args).await?;
        }
    }

    Ok(())
}
