//! Raster description command
//!
//! Prints the dimensions, band layout, geotransform and tile format of the
//! raster behind the input path, plus the zoom levels of its pyramid.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::{debug, info};

use crate::api::TileService;
use crate::commands::command_traits::Command;
use crate::config::TileConfig;
use crate::errors::TileResult;
use crate::utils::logger::Logger;

/// Command for describing a raster
pub struct InfoCommand<'a> {
    path: PathBuf,
    extension: Option<String>,
    config: TileConfig,
    logger: &'a Logger,
}

impl<'a> InfoCommand<'a> {
    pub fn new(args: &ArgMatches, config: TileConfig, logger: &'a Logger) -> TileResult<Self> {
        Ok(InfoCommand {
            path: super::input_path(args)?,
            extension: args.get_one::<String>("extension").cloned(),
            config,
            logger,
        })
    }

    /// Numeric subdirectories of a pyramid root, ascending
    fn zoom_levels(root: &Path) -> TileResult<Vec<u32>> {
        let mut levels = Vec::new();
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(level) = entry.file_name().to_str().and_then(|n| n.parse::<u32>().ok()) {
                levels.push(level);
            }
        }
        levels.sort_unstable();
        Ok(levels)
    }
}

impl Command for InfoCommand<'_> {
    fn execute(&self) -> TileResult<()> {
        debug!("Describing {}", self.path.display());
        let service = TileService::from_config(&self.config);
        let description = service.describe(&self.path, self.extension.as_deref())?;

        println!("{}", description);
        self.logger.log(&description.to_string())?;

        if let Some(root) = &description.pyramid {
            let levels = Self::zoom_levels(root)?;
            let listed = levels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(", ");
            println!("  Zoom levels: {}", if listed.is_empty() { "none" } else { listed.as_str() });
            info!("Pyramid {} has {} zoom levels", root.display(), levels.len());
        }

        Ok(())
    }
}
