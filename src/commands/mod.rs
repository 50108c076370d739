//! CLI command implementations
//!
//! This module contains the commands of the command line tool, built with
//! the Command pattern, together with the argument definitions they read.

pub mod command_traits;
pub mod info_command;
pub mod tile_command;
pub mod warm_command;


pub use command_traits::{Command, CommandFactory};
pub use info_command::InfoCommand;
pub use tile_command::TileCommand;
pub use warm_command::WarmCommand;

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};

use crate::config::TileConfig;
use crate::errors::{TileError, TileResult};
use crate::source::Interpolation;
use crate::utils::logger::Logger;

/// Argument definitions of the `rastertile` binary
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("rastertile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract square tiles from georeferenced rasters")
        .arg(
            Arg::new("input")
                .help("Raster path, without extension when --extension is given")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("extension")
                .short('e')
                .long("extension")
                .help("Extension appended to the raster and pyramid tile paths (e.g. tif)")
                .value_name("EXT"),
        )
        .arg(
            Arg::new("tile")
                .short('t')
                .long("tile")
                .help("Extract one tile")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("warm")
                .long("warm")
                .help("Extract a grid of tiles through the cache")
                .action(ArgAction::SetTrue)
                .conflicts_with("tile"),
        )
        .arg(
            Arg::new("x")
                .short('x')
                .long("x")
                .help("Projected X of the tile's top-left corner")
                .value_name("X")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("y")
                .short('y')
                .long("y")
                .help("Projected Y of the tile's top-left corner")
                .value_name("Y")
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .help("Ground size covered by the tile, in meters")
                .value_name("METERS")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("resolution")
                .short('r')
                .long("resolution")
                .help("Output tile side length in pixels")
                .value_name("PIXELS")
                .default_value("256")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("interpolation")
                .short('i')
                .long("interpolation")
                .help("Resampling for upscaled tiles (nearest, bilinear, cubic, average)")
                .value_name("METHOD")
                .default_value("nearest"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the tile to FILE (.raw for packed bytes, otherwise an image)")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("most-common")
                .long("most-common")
                .help("Print the N most frequent values of a byte tile")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("grid")
                .long("grid")
                .help("Tiles per side of the warm-up grid")
                .value_name("N")
                .default_value("4")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .help("Worker threads for the warm-up grid")
                .value_name("N")
                .default_value("4")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug output")
                .action(ArgAction::SetTrue),
        )
}

/// Tile request shared by the tile and warm commands
#[derive(Debug, Clone, PartialEq)]
pub struct RequestArgs {
    pub path: PathBuf,
    pub extension: Option<String>,
    pub top_left_x: f64,
    pub top_left_y: f64,
    pub ground_size: f64,
    pub output_size: u32,
    pub interpolation: Interpolation,
}

impl RequestArgs {
    pub fn from_args(args: &ArgMatches) -> TileResult<Self> {
        let coordinate = |name: &str| {
            args.get_one::<f64>(name)
                .copied()
                .ok_or_else(|| TileError::InvalidRequest(format!("--{} is required", name)))
        };

        let interpolation = args.get_one::<String>("interpolation")
            .map(|s| s.parse::<Interpolation>())
            .transpose()?
            .unwrap_or_default();

        Ok(RequestArgs {
            path: input_path(args)?,
            extension: args.get_one::<String>("extension").cloned(),
            top_left_x: coordinate("x")?,
            top_left_y: coordinate("y")?,
            ground_size: coordinate("size")?,
            output_size: args.get_one::<u32>("resolution").copied().unwrap_or(256),
            interpolation,
        })
    }
}

fn input_path(args: &ArgMatches) -> TileResult<PathBuf> {
    args.get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or_else(|| TileError::InvalidRequest("Missing input raster".to_string()))
}

/// Factory for creating command instances based on CLI arguments
///
/// `--tile` extracts a single tile, `--warm` runs a grid through the cache
/// and anything else describes the input raster.
pub struct TileCommandFactory {
    config: TileConfig,
}

impl TileCommandFactory {
    pub fn new(config: TileConfig) -> Self {
        TileCommandFactory { config }
    }
}

impl<'a> CommandFactory<'a> for TileCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> TileResult<Box<dyn Command + 'a>> {
        if args.get_flag("warm") {
            Ok(Box::new(WarmCommand::new(args, self.config.clone(), logger)?))
        } else if args.get_flag("tile") {
            Ok(Box::new(TileCommand::new(args, self.config.clone(), logger)?))
        } else {
            Ok(Box::new(InfoCommand::new(args, self.config.clone(), logger)?))
        }
    }
}
