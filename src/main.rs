mod batch;
mod cli;
mod error;
mod homebank;
mod models;
mod parser;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Convert {
            format,
            infile,
            outfile,
        } => cli::convert::run(&infile, &outfile, format),
        Commands::BatchConvert { config } => cli::batch_convert::run(config.as_deref()),
        Commands::ListFormats => cli::list_formats::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
