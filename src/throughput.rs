// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::{self, Bars, Panel};
use crate::config::Throughput;
use crate::pivot::{Pivot, PivotBuilder};
use crate::table::{Field, Table, BRANCH, TEST};
use crate::PlotError;

use std::path::Path;

pub const GBITS: &str = "GBit/s";

/// Keeps the first `tokens` single-space separated tokens of a branch label,
/// dropping trailing protocol information such as `HTTP/1.1`.
pub fn truncate_label(label: &str, tokens: usize) -> String {
    label.split(' ').take(tokens).collect::<Vec<&str>>().join(" ")
}

/// Mean throughput per test and truncated branch, over rows with positive
/// throughput.
pub fn pivot(table: &Table, tokens: usize) -> Result<Pivot<Field>, PlotError> {
    let branch = table.column(BRANCH)?;
    let gbits = table.column(GBITS)?;
    let test = table.column(TEST)?;

    let mut builder = PivotBuilder::new();
    for row in table.rows() {
        let value = match row.positive(gbits)? {
            Some(v) => v,
            None => continue,
        };
        let label = row.text(branch);
        match Field::parse(row.text(test)) {
            Some(test) if !label.is_empty() => {
                builder.insert(test, &truncate_label(label, tokens), value, None);
            }
            _ => {
                trace!("skipping row {}: incomplete key", row.index());
            }
        }
    }

    Ok(builder.build())
}

/// Renders the throughput bar chart to `path`.
pub fn plot(table: &Table, path: &Path, config: &Throughput) -> Result<(), PlotError> {
    let pivot = pivot(table, config.label_tokens())?;
    if pivot.is_empty() {
        return Err(PlotError::NoData(GBITS.to_string()));
    }
    debug!(
        "throughput: {} tests {} branches",
        pivot.rows().len(),
        pivot.columns().len()
    );

    let rows = pivot.rows().to_vec();
    let bars = Bars::new(&pivot, &rows, |test| vec![test.to_string()]);

    info!("Save graph to {}", path.display());
    let root = chart::bitmap(path, config.size())?;
    chart::draw_panel(
        &root,
        &root,
        &Panel {
            bars: &bars,
            caption: Some(config.title()),
            y_desc: None,
            log_y: false,
            categories: true,
        },
    )?;
    root.present()?;

    Ok(())
}
