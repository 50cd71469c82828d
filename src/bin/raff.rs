//! raff: view and build .raff files.
//!
//! `raff view <path> [-v]` lists chunks (icon, name, octet count, header position),
//! hex-dumping payloads when verbose. `raff pack --manifest m.toml -o out.raff`
//! builds a file from a TOML manifest.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::{error, info};

use raff::view::{view, ColorChoice, OutputFormat, ViewConfig, ViewOptions};
use raff::{pack_raff, Manifest, RaffReader};

#[derive(Debug, Parser)]
#[command(version, about = "View and build RAFF chunk files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Views a raff file
    View {
        /// Path to the file
        path: PathBuf,
        /// Verbose output (hex dump payloads)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
        /// One JSON object per chunk instead of text lines
        #[arg(long)]
        json: bool,
        /// When to colour output (overrides the config file)
        #[arg(long, value_enum)]
        color: Option<ColorChoice>,
        /// TOML file with colour settings
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Builds a raff file from a TOML manifest
    Pack {
        #[arg(long, short)]
        manifest: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::View {
            path,
            verbose,
            json,
            color,
            config,
        } => {
            let config = match config {
                Some(path) => ViewConfig::load(path)?,
                None => ViewConfig::default(),
            };
            let stdout = io::stdout();
            let enabled = !json && color.unwrap_or(config.color).enabled(stdout.is_terminal());
            let options = ViewOptions {
                verbosity: verbose,
                format: if json { OutputFormat::Json } else { OutputFormat::Text },
                style: config.style(enabled),
            };

            let mut reader = RaffReader::open(&path)?;
            let summary = view(&mut reader, &mut stdout.lock(), &options)?;
            info!("{} chunks, ended by {:?}", summary.chunk_count, summary.termination);
        }
        Command::Pack { manifest, output } => {
            let manifest = Manifest::load(&manifest)?;
            let mut out = BufWriter::new(File::create(&output)?);
            let written = pack_raff(&mut out, &manifest.entries, &manifest.options)?;
            out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
            eprintln!("wrote {} ({} octets)", output.display(), written);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
