//! Cache warm-up command
//!
//! Extracts an N x N grid of adjacent tiles, starting at the requested
//! top-left corner and stepping one ground size east and south per tile,
//! from several worker threads sharing one [`TileService`].

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use clap::ArgMatches;
use log::{debug, info, warn};

use crate::api::TileService;
use crate::cache::{CacheStats, ExtractionKey};
use crate::commands::command_traits::Command;
use crate::commands::RequestArgs;
use crate::config::TileConfig;
use crate::coordinate::Point;
use crate::errors::{TileError, TileResult};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Outcome of one warm-up run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmReport {
    pub requested: u64,
    pub extracted: u64,
    pub failed: u64,
    pub cache: CacheStats,
}

/// Command for warming the tile cache over a grid
pub struct WarmCommand<'a> {
    request: RequestArgs,
    grid: u32,
    threads: usize,
    config: TileConfig,
    logger: &'a Logger,
}

impl<'a> WarmCommand<'a> {
    pub fn new(args: &ArgMatches, config: TileConfig, logger: &'a Logger) -> TileResult<Self> {
        let request = RequestArgs::from_args(args)?;
        let grid = args.get_one::<u32>("grid").copied().unwrap_or(4);
        let threads = args.get_one::<usize>("threads").copied().unwrap_or(4);
        if grid == 0 || threads == 0 {
            return Err(TileError::InvalidRequest("--grid and --threads must be positive".to_string()));
        }

        Ok(WarmCommand {
            request,
            grid,
            threads,
            config,
            logger,
        })
    }

    /// Keys of the grid, row by row
    pub fn grid_keys(request: &RequestArgs, grid: u32) -> Vec<ExtractionKey> {
        let origin = Point::new(request.top_left_x, request.top_left_y);
        let mut keys = Vec::with_capacity(grid as usize * grid as usize);
        for row in 0..grid {
            for column in 0..grid {
                let corner = origin.offset(column as f64 * request.ground_size, -(row as f64) * request.ground_size);
                keys.push(ExtractionKey::new(
                    &request.path,
                    request.extension.as_deref(),
                    corner.x,
                    corner.y,
                    request.ground_size,
                    request.output_size,
                    request.interpolation,
                ));
            }
        }
        keys
    }

    /// Requests every key once, spread over `threads` workers
    pub fn run(service: &TileService, keys: &[ExtractionKey], threads: usize, progress: &ProgressTracker) -> WarmReport {
        let next = AtomicUsize::new(0);
        let extracted = AtomicU64::new(0);
        let failed = AtomicU64::new(0);

        thread::scope(|scope| {
            for worker in 0..threads.max(1) {
                let (next, extracted, failed) = (&next, &extracted, &failed);
                scope.spawn(move || {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(key) = keys.get(index) else { break };
                        match service.get_tile_for(key) {
                            Some(_) => extracted.fetch_add(1, Ordering::Relaxed),
                            None => failed.fetch_add(1, Ordering::Relaxed),
                        };
                        progress.increment(1);
                    }
                    debug!("Worker {} finished", worker);
                });
            }
        });

        WarmReport {
            requested: keys.len() as u64,
            extracted: extracted.into_inner(),
            failed: failed.into_inner(),
            cache: service.cache_stats(),
        }
    }
}

impl Command for WarmCommand<'_> {
    fn execute(&self) -> TileResult<()> {
        let service = TileService::from_config(&self.config);
        let keys = Self::grid_keys(&self.request, self.grid);
        info!("Warming {} tiles with {} threads", keys.len(), self.threads);

        let progress = ProgressTracker::new(keys.len() as u64, "Extracting tiles");
        let started = Instant::now();
        let report = Self::run(&service, &keys, self.threads, &progress);
        progress.finish();

        if report.failed > 0 {
            warn!("{} of {} tiles could not be extracted", report.failed, report.requested);
        }

        let summary = format!("Extracted {}/{} tiles in {:.2?}; cache: {}",
                              report.extracted, report.requested, started.elapsed(), report.cache);
        println!("{}", summary);
        self.logger.log(&summary)?;
        Ok(())
    }
}
