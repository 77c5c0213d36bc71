pub mod batch_convert;
pub mod convert;
pub mod list_formats;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::parser::SourceFormat;

#[derive(Parser)]
#[command(
    name = "homebank-csv",
    version,
    about = "Convert bank account exports into CSV files HomeBank can import."
)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a single bank export.
    Convert {
        /// Format of the input file; guessed when omitted (see `list-formats`)
        #[arg(long)]
        format: Option<SourceFormat>,
        /// Bank export to read
        infile: PathBuf,
        /// HomeBank CSV file to write
        outfile: PathBuf,
    },
    /// Convert every new file of the batch sets in the config file.
    BatchConvert {
        /// Config file (default: <config dir>/homebank-csv/config.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List supported formats.
    ListFormats,
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("homebank_csv={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
