use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod document;
mod error;

use config::Config;
use error::{format_error_with_suggestions, CliError};

#[derive(Parser)]
#[command(name = "featview")]
#[command(about = "featview - feature-track layout and rendering")]
#[command(version)]
#[command(long_about = "
featview lays out sequence annotation tracks (loci, continuous curves, pins,
polygons and secondary structure) against a residue axis and exports them as SVG.

Examples:
  featview render tracks.json --out tracks.svg --width 1200
  featview render tracks.json --out tracks.svg --expand-all --no-footer
  featview inspect tracks.json --expand-all
  featview config > featview.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a JSON track document to SVG
    Render {
        /// Input document (JSON)
        input: PathBuf,

        /// Output file (SVG)
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Width in pixels
        #[arg(long)]
        width: Option<f64>,

        /// Minimum height in pixels
        #[arg(long)]
        height: Option<f64>,

        /// Title drawn at the top of the document
        #[arg(long)]
        title: Option<String>,

        /// Omit the generation footer for byte-stable output
        #[arg(long)]
        no_footer: bool,

        /// Expand every nested trace before rendering
        #[arg(long)]
        expand_all: bool,
    },

    /// Print the trace tree and row layout of a document
    Inspect {
        /// Input document (JSON)
        input: PathBuf,

        /// Expand every nested trace first
        #[arg(long)]
        expand_all: bool,

        /// Emit JSON instead of an indented tree
        #[arg(long)]
        json: bool,
    },

    /// Print an example featview.toml
    Config,
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Config = cli.command {
        print!("{}", Config::example_toml()?);
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            input,
            out,
            width,
            height,
            title,
            no_footer,
            expand_all,
        } => {
            commands::render::execute(
                &config,
                input,
                out,
                commands::render::RenderArgs {
                    width,
                    height,
                    title,
                    no_footer,
                    expand_all,
                },
            )?;
        }

        Commands::Inspect { input, expand_all, json } => {
            commands::inspect::execute(&config, input, expand_all, json)?;
        }

        Commands::Config => {}
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        match err.downcast_ref::<CliError>() {
            Some(cli_err) => eprintln!("Error: {}", format_error_with_suggestions(cli_err)),
            None => eprintln!("Error: {:#}", err),
        }
        std::process::exit(1);
    }
}
