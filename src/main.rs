use std::path::Path;
use std::process;

use log::{error, LevelFilter};

use rastertile::commands::{build_cli, CommandFactory, TileCommandFactory};
use rastertile::config::TileConfig;
use rastertile::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => match TileConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => TileConfig::default(),
    };
    if matches.get_flag("verbose") {
        config.log_level = LevelFilter::Debug;
    }

    // A configured log file gets our own logger, shared with the commands;
    // otherwise RUST_LOG may refine the level
    let console;
    let logger: &Logger = match &config.log_file {
        Some(log_file) => match Logger::init_global_logger(Some(log_file), config.log_level) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        },
        None => {
            env_logger::Builder::new()
                .filter_level(config.log_level)
                .parse_default_env()
                .init();
            console = Logger::console(config.log_level);
            &console
        },
    };

    let factory = TileCommandFactory::new(config);

    match factory.create_command(&matches, logger) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
