// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::chart::{self, Bars, Panel};
use crate::config::Latency;
use crate::pivot::{Pivot, PivotBuilder};
use crate::table::{Key, Table, BRANCH};
use crate::PlotError;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use std::collections::BTreeSet;
use std::path::Path;

pub const STDDEV: &str = "stddev";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Percentile {
    #[strum(serialize = "p50")]
    P50,
    #[strum(serialize = "p90")]
    P90,
    #[strum(serialize = "p99")]
    P99,
    #[strum(serialize = "p999")]
    P999,
}

impl Percentile {
    /// name of the result column holding this percentile
    pub fn column(self) -> String {
        format!("{} latency (ms)", self)
    }
}

/// Mean latency and mean stddev per key and branch, over rows with positive
/// latency for `percentile`.
pub fn pivot(table: &Table, percentile: Percentile) -> Result<Pivot<Key>, PlotError> {
    let branch = table.column(BRANCH)?;
    let latency = table.column(&percentile.column())?;
    let stddev = table.column(STDDEV)?;

    let mut builder = PivotBuilder::new();
    for row in table.rows() {
        let value = match row.positive(latency)? {
            Some(v) => v,
            None => continue,
        };
        let label = row.text(branch);
        match row.key()? {
            Some(key) if !label.is_empty() => {
                builder.insert(key, label, value, row.number(stddev)?);
            }
            _ => {
                trace!("skipping row {}: incomplete key", row.index());
            }
        }
    }

    Ok(builder.build())
}

/// One panel per percentile, laid out over the shared set of keys.
pub fn panels(table: &Table) -> Result<Vec<(Percentile, Bars)>, PlotError> {
    let mut pivots = Vec::new();
    for percentile in Percentile::iter() {
        let pivot = pivot(table, percentile)?;
        if pivot.is_empty() {
            return Err(PlotError::NoData(percentile.column()));
        }
        pivots.push((percentile, pivot));
    }

    let keys: Vec<Key> = pivots
        .iter()
        .flat_map(|(_, p)| p.rows().iter().cloned())
        .collect::<BTreeSet<Key>>()
        .into_iter()
        .collect();
    let branches: Vec<String> = pivots
        .iter()
        .flat_map(|(_, p)| p.columns().iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    debug!("latency: {} keys {} branches", keys.len(), branches.len());

    Ok(pivots
        .iter()
        .map(|(percentile, pivot)| {
            let mut bars = Bars::new(pivot, &keys, Key::label);
            bars.recolour(&branches);
            (*percentile, bars)
        })
        .collect())
}

/// Renders the four latency panels, stacked with a shared X axis, to `path`.
pub fn plot(table: &Table, path: &Path, config: &Latency, log_y: bool) -> Result<(), PlotError> {
    let panels = panels(table)?;

    info!("Save graph to {}", path.display());
    let root = chart::bitmap(path, config.size())?;
    let areas = root.split_evenly((panels.len(), 1));
    let last = panels.len() - 1;

    for (idx, ((percentile, bars), area)) in panels.iter().zip(areas.iter()).enumerate() {
        let column = percentile.column();
        chart::draw_panel(
            &root,
            area,
            &Panel {
                bars,
                caption: None,
                y_desc: Some(column.as_str()),
                log_y,
                categories: idx == last,
            },
        )?;
    }
    root.present()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Field;

    const RESULTS: &str = "\
Test,target req/s,req len,branch,p50 latency (ms),p90 latency (ms),p99 latency (ms),p999 latency (ms),stddev
http,1000,100,master,1.0,2.0,3.0,4.0,0.5
http,1000,100,master,3.0,2.0,3.0,4.0,
http,500,100,master,1.0,0,3.0,4.0,0.1
http,500,100,feature,2.0,2.5,3.5,4.5,0.2
";

    fn key(rate: f64) -> Key {
        Key {
            test: Field::Text("http".to_string()),
            rate: Field::Number(rate),
            length: Field::Number(100.0),
        }
    }

    #[test]
    fn column_names() {
        let columns: Vec<String> = Percentile::iter().map(|p| p.column()).collect();
        assert_eq!(
            columns,
            vec![
                "p50 latency (ms)",
                "p90 latency (ms)",
                "p99 latency (ms)",
                "p999 latency (ms)"
            ]
        );
    }

    #[test]
    fn pivot_averages_latency_and_stddev() {
        let table = Table::from_reader(RESULTS.as_bytes()).unwrap();
        let pivot = pivot(&table, Percentile::P50).unwrap();

        assert_eq!(pivot.rows(), &[key(500.0), key(1000.0)]);
        assert_eq!(pivot.columns(), &["feature", "master"]);

        let cell = pivot.get(&key(1000.0), "master").unwrap();
        assert_eq!(cell.value, 2.0);
        assert_eq!(cell.error, Some(0.5));
        assert!(pivot.get(&key(1000.0), "feature").is_none());
    }

    #[test]
    fn non_positive_rows_dropped() {
        let table = Table::from_reader(RESULTS.as_bytes()).unwrap();
        let pivot = pivot(&table, Percentile::P90).unwrap();
        assert!(pivot.get(&key(500.0), "master").is_none());
        assert_eq!(
            pivot.get(&key(500.0), "feature").map(|c| c.value),
            Some(2.5)
        );
    }

    #[test]
    fn shared_axis() {
        let table = Table::from_reader(RESULTS.as_bytes()).unwrap();
        let panels = panels(&table).unwrap();
        assert_eq!(panels.len(), 4);
        for (_, bars) in &panels {
            assert_eq!(bars.categories.len(), 2);
            assert_eq!(bars.categories[0], vec!["http", "500 req/s", "100 B"]);
        }
        let (_, p90) = &panels[1];
        let master = p90.series.iter().find(|s| s.name == "master").unwrap();
        assert!(master.values[0].is_none());
        assert_eq!(master.colour, 1);
    }

    #[test]
    fn missing_stddev() {
        let data = "Test,target req/s,req len,branch,p50 latency (ms)\nhttp,1,1,master,1.0\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        match pivot(&table, Percentile::P50) {
            Err(PlotError::MissingColumn(c)) => assert_eq!(c, STDDEV),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
