// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate rustcommon_logger;

mod chart;
mod config;
mod error;
mod pivot;
mod table;

pub mod latency;
pub mod throughput;

pub use crate::chart::{Bars, Series};
pub use crate::config::{Config, NAME, VERSION};
pub use crate::error::PlotError;
pub use crate::latency::Percentile;
pub use crate::pivot::{Cell, Pivot, PivotBuilder};
pub use crate::table::{Field, Key, Table};

use std::path::{Path, PathBuf};

/// Loads and concatenates the result tables named in the config.
pub fn load(config: &Config) -> Result<Table, PlotError> {
    load_tables(config.inputs())
}

pub fn load_tables<P: AsRef<Path>>(paths: &[P]) -> Result<Table, PlotError> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        tables.push(Table::from_path(path)?);
    }
    let table = Table::concat(tables);
    debug!(
        "loaded {} rows with {} distinct keys",
        table.len(),
        table.distinct_keys()?
    );
    Ok(table)
}

/// Outcome of a run. Each chart succeeds or fails on its own.
#[derive(Debug)]
pub struct Report {
    pub throughput: Result<PathBuf, PlotError>,
    pub latency: Result<PathBuf, PlotError>,
}

/// Renders both charts. A failing chart is logged and skipped, it never
/// prevents the other from being attempted.
pub fn run(config: &Config, table: &Table) -> Report {
    let path = config.throughput_output();
    let throughput = match throughput::plot(table, &path, config.throughput()) {
        Ok(()) => {
            info!("Plotted throughput graph successfully");
            Ok(path)
        }
        Err(e) => {
            error!("throughput graph: {}", e);
            Err(e)
        }
    };

    let path = config.latency_output();
    let latency =
        match latency::plot(table, &path, config.latency(), config.general().logy()) {
            Ok(()) => {
                info!("Plotted latency graph successfully");
                Ok(path)
            }
            Err(e) => {
                error!("latency graph: {}", e);
                Err(e)
            }
        };

    Report {
        throughput,
        latency,
    }
}
