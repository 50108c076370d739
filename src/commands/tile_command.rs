//! Single tile extraction command

use std::path::PathBuf;

use clap::ArgMatches;
use log::{debug, info};

use crate::api::TileService;
use crate::commands::command_traits::Command;
use crate::commands::RequestArgs;
use crate::config::TileConfig;
use crate::errors::{TileError, TileResult};
use crate::utils::image_export::save_tile;
use crate::utils::logger::Logger;

/// Command for extracting one tile
pub struct TileCommand<'a> {
    request: RequestArgs,
    output: Option<PathBuf>,
    most_common: Option<usize>,
    config: TileConfig,
    logger: &'a Logger,
}

impl<'a> TileCommand<'a> {
    pub fn new(args: &ArgMatches, config: TileConfig, logger: &'a Logger) -> TileResult<Self> {
        let request = RequestArgs::from_args(args)?;
        debug!("Tile request: {:?}", request);

        Ok(TileCommand {
            request,
            output: args.get_one::<String>("output").map(PathBuf::from),
            most_common: args.get_one::<usize>("most-common").copied(),
            config,
            logger,
        })
    }
}

impl Command for TileCommand<'_> {
    fn execute(&self) -> TileResult<()> {
        let service = TileService::from_config(&self.config);
        let request = &self.request;

        let tile = service.get_tile(
            &request.path,
            request.extension.as_deref(),
            request.top_left_x,
            request.top_left_y,
            request.ground_size,
            request.output_size,
            request.interpolation,
        ).ok_or_else(|| TileError::InvalidRequest(format!(
            "no tile at ({}, {}) in {}", request.top_left_x, request.top_left_y, request.path.display())))?;

        let summary = format!("{}x{} {} tile at ({}, {}) covering {} m",
                              tile.size(), tile.size(), tile.format(),
                              request.top_left_x, request.top_left_y, request.ground_size);
        println!("{}", summary);
        self.logger.log(&summary)?;

        if let Some(n) = self.most_common {
            let values = tile.most_common(n).ok_or_else(|| TileError::InvalidRequest(format!(
                "most common values need a Byte tile, got {}", tile.format())))?;
            let listed = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
            println!("Most common values: {}", listed);
            self.logger.log(&format!("Most common values: {}", listed))?;
        }

        if let Some(output) = &self.output {
            save_tile(&tile, output)?;
        }

        info!("Cache: {}", service.cache_stats());
        Ok(())
    }
}
