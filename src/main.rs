// CLI binary entry point for oggbridge

mod cli;

use anyhow::Result;
use clap::Parser;
use std::process;

use cli::commands::{command_encode, command_pages, command_tags, EncodeOptions};
use cli::{Commands, Config, OutputFormatter};

fn main() {
    let config = Config::parse();

    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = run(config) {
        eprintln!("✗ {:#}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let formatter = OutputFormatter::new(config.format, config.quiet);

    match config.command {
        Commands::Encode {
            input,
            output,
            config: preset,
            channels,
            rate,
            quality,
            tags,
            sample_format,
        } => {
            let options = EncodeOptions {
                input,
                output,
                preset,
                channels,
                rate,
                quality,
                tags,
                sample_format,
            };
            command_encode(&options, &formatter)
        }
        Commands::Tags { files, output } => command_tags(&files, output.as_deref(), &formatter),
        Commands::Pages { file } => command_pages(&file, &formatter),
    }
}
