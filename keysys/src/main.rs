mod commands;
mod config;
mod logger;

use clap::{ColorChoice, Parser};
use colored::Colorize;
use commands::{Args, Commands};
use config::Config;
use logger::Logger;
use std::{
    io::{IsTerminal, stderr},
    process,
};

fn run() -> anyhow::Result<bool> {
    let args = Args::parse();

    colored::control::set_override(match args.color {
        ColorChoice::Always => true,
        ColorChoice::Auto => stderr().is_terminal(),
        ColorChoice::Never => false,
    });

    Logger::init(args.verbose);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let key_systems = config
        .into_key_systems()?
        .with_reporter(std::sync::Arc::new(eme_keysys::telemetry::LogReporter));

    Ok(match args.command {
        Commands::Info(args) => args.execute(&key_systems)?,
        Commands::List(args) => {
            args.execute(&key_systems)?;
            true
        }
        Commands::Query(args) => args.execute(&key_systems)?,
    })
}

fn main() {
    match run() {
        Ok(true) => (),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{}: {:#}", "error".bold().red(), e);
            process::exit(1);
        }
    }
}
