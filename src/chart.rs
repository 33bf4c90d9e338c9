// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Grouped bar charts on top of plotters. Each category on the X axis holds
//! one bar per series, optionally with a symmetric error bar.

use crate::pivot::{Cell, Pivot};
use crate::PlotError;

use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::{CoordTranslate, Shift};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};

use std::path::Path;

macro_rules! hexcolour {
    ($colour:literal) => {
        RGBColor(
            (($colour & 0xFF0000) >> 16) as u8,
            (($colour & 0x00FF00) >> 8) as u8,
            ($colour & 0x0000FF) as u8,
        )
    };
}

const COLOURS: &[RGBColor] = &[
    hexcolour!(0xAA0000),
    hexcolour!(0x0000FF),
    hexcolour!(0x888888),
    hexcolour!(0xDDCC77),
    hexcolour!(0x999933),
    hexcolour!(0x332288),
    hexcolour!(0x117733),
    hexcolour!(0x88CCEE),
    hexcolour!(0x882255),
    hexcolour!(0x44AA99),
    hexcolour!(0xAA4499),
    hexcolour!(0xCC6677),
];

const FONT: &str = "sans-serif";

const TITLE_FONT_SIZE: u32 = 30;
const AXIS_FONT_SIZE: u32 = 18;
const TICK_FONT_SIZE: u32 = 14;
const LEGEND_FONT_SIZE: u32 = 14;
const LINE_HEIGHT: i32 = 18;

/// fraction of a category slot covered by its bars
const GROUP_WIDTH: f64 = 0.8;

pub fn colour(index: usize) -> RGBColor {
    COLOURS[index % COLOURS.len()]
}

/// Registers the bundled font as `sans-serif`, so rendering does not depend
/// on fonts installed on the host.
pub fn register_fonts() -> Result<(), PlotError> {
    let font: &'static [u8] = dejavu::sans_mono::regular();
    register_font(FONT, FontStyle::Normal, font).map_err(|_| PlotError::Font)
}

/// Creates a white PNG canvas. Nothing is written until `present()`.
pub fn bitmap<P: AsRef<Path> + ?Sized>(
    path: &P,
    size: (u32, u32),
) -> Result<DrawingArea<BitMapBackend<'_>, Shift>, PlotError> {
    register_fonts()?;
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    Ok(root)
}

#[derive(Clone, Debug)]
pub struct Series {
    pub name: String,
    pub colour: usize,
    pub values: Vec<Option<Cell>>,
}

#[derive(Clone, Debug)]
pub struct Bars {
    /// one label per category, one entry per label line
    pub categories: Vec<Vec<String>>,
    pub series: Vec<Series>,
}

impl Bars {
    /// Lays the pivot's columns out as series along `rows`.
    pub fn new<R, F>(pivot: &Pivot<R>, rows: &[R], label: F) -> Self
    where
        R: Ord + Clone,
        F: Fn(&R) -> Vec<String>,
    {
        let categories = rows.iter().map(label).collect();
        let series = pivot
            .columns()
            .iter()
            .enumerate()
            .map(|(colour, name)| Series {
                name: name.clone(),
                colour,
                values: pivot.series(name, rows),
            })
            .collect();
        Self { categories, series }
    }

    /// Assigns colours by position in `names` so the same series keeps its
    /// colour across panels.
    pub fn recolour(&mut self, names: &[String]) {
        for series in self.series.iter_mut() {
            if let Some(idx) = names.iter().position(|n| *n == series.name) {
                series.colour = idx;
            }
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.series.iter().flat_map(|s| s.values.iter().flatten())
    }

    pub fn is_empty(&self) -> bool {
        self.cells().next().is_none()
    }

    /// Lowest positive and highest extent of bars and error bars.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mut low = f64::MAX;
        let mut high = f64::MIN;
        for cell in self.cells() {
            let error = cell.error.unwrap_or(0.0).abs();
            let bottom = cell.value - error;
            if bottom > 0.0 {
                low = low.min(bottom);
            } else if cell.value > 0.0 {
                low = low.min(cell.value);
            }
            high = high.max(cell.value + error);
        }
        if high == f64::MIN {
            None
        } else {
            Some((low, high))
        }
    }

    /// Left and right edges of the bar for `series` within `category`.
    fn slot(&self, category: usize, series: usize) -> (f64, f64) {
        let width = GROUP_WIDTH / self.series.len() as f64;
        let left = category as f64 - GROUP_WIDTH / 2.0 + series as f64 * width;
        (left, left + width)
    }
}

pub struct Panel<'a> {
    pub bars: &'a Bars,
    pub caption: Option<&'a str>,
    pub y_desc: Option<&'a str>,
    pub log_y: bool,
    /// draw the category labels under this panel
    pub categories: bool,
}

/// Draws one panel into `area`. Category labels are placed in absolute pixel
/// coordinates, so `root` must be the backend's full drawing area.
pub fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    panel: &Panel<'_>,
) -> Result<(), PlotError> {
    let bars = panel.bars;
    let (low, high) = bars
        .bounds()
        .ok_or_else(|| PlotError::NoData(panel.y_desc.unwrap_or("bars").to_string()))?;

    let lines = if panel.categories {
        bars.categories.iter().map(|c| c.len()).max().unwrap_or(0) as u32
    } else {
        0
    };

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(lines * LINE_HEIGHT as u32 + 10)
        .y_label_area_size(80);
    if let Some(caption) = panel.caption {
        builder.caption(caption, (FONT, TITLE_FONT_SIZE));
    }

    let x_range = -0.5..(bars.categories.len() as f64 - 0.5);

    if panel.log_y {
        let floor = low / 2.0;
        let mut chart = builder.build_cartesian_2d(x_range, (floor..high * 2.0).log_scale())?;
        fill(&mut chart, panel, floor)?;
        if panel.categories {
            draw_categories(root, chart.plotting_area(), &bars.categories)?;
        }
    } else {
        let top = if high > 0.0 { high * 1.1 } else { 1.0 };
        let mut chart = builder.build_cartesian_2d(x_range, 0.0..top)?;
        fill(&mut chart, panel, 0.0)?;
        if panel.categories {
            draw_categories(root, chart.plotting_area(), &bars.categories)?;
        }
    }

    Ok(())
}

fn fill<DB, Y>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, Y>>,
    panel: &Panel<'_>,
    floor: f64,
) -> Result<(), PlotError>
where
    DB: DrawingBackend,
    Y: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let bars = panel.bars;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc(panel.y_desc.unwrap_or(""))
        .label_style((FONT, TICK_FONT_SIZE))
        .axis_desc_style((FONT, AXIS_FONT_SIZE))
        .draw()?;

    for (idx, series) in bars.series.iter().enumerate() {
        let colour = colour(series.colour);
        let rectangles = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(category, cell)| cell.map(|c| (category, c)))
            .map(|(category, cell)| {
                let (left, right) = bars.slot(category, idx);
                Rectangle::new([(left, floor), (right, cell.value)], colour.filled())
            });
        chart
            .draw_series(rectangles)?
            .label(series.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], colour.filled()));

        let errors = series
            .values
            .iter()
            .enumerate()
            .filter_map(|(category, cell)| {
                cell.and_then(|c| c.error.map(|e| (category, c.value, e.abs())))
            })
            .map(|(category, value, error)| {
                let (left, right) = bars.slot(category, idx);
                ErrorBar::new_vertical(
                    (left + right) / 2.0,
                    (value - error).max(floor),
                    value,
                    value + error,
                    BLACK.stroke_width(1),
                    4,
                )
            });
        chart.draw_series(errors)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT, LEGEND_FONT_SIZE))
        .draw()?;

    Ok(())
}

fn draw_categories<DB: DrawingBackend, CT: CoordTranslate>(
    root: &DrawingArea<DB, Shift>,
    plot: &DrawingArea<DB, CT>,
    categories: &[Vec<String>],
) -> Result<(), PlotError> {
    let (x, y) = plot.get_pixel_range();
    let count = categories.len() as f64;
    let width = (x.end - x.start) as f64;

    for (idx, lines) in categories.iter().enumerate() {
        let px = x.start + ((idx as f64 + 0.5) / count * width) as i32;
        for (line, text) in lines.iter().enumerate() {
            let py = y.end + 6 + line as i32 * LINE_HEIGHT;
            root.draw(&Text::new(
                text.clone(),
                (px, py),
                (FONT, TICK_FONT_SIZE)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Top)),
            ))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::PivotBuilder;

    fn bars() -> Bars {
        let mut builder = PivotBuilder::new();
        builder.insert("a".to_string(), "x", 4.0, Some(1.0));
        builder.insert("b".to_string(), "y", 2.0, Some(3.0));
        let pivot = builder.build();
        let rows = pivot.rows().to_vec();
        Bars::new(&pivot, &rows, |r| vec![r.clone()])
    }

    #[test]
    fn layout() {
        let bars = bars();
        assert_eq!(bars.categories, vec![vec!["a"], vec!["b"]]);
        assert_eq!(bars.series.len(), 2);
        assert_eq!(bars.series[1].name, "y");
        assert!(bars.series[1].values[0].is_none());
        assert_eq!(bars.series[1].values[1].map(|c| c.value), Some(2.0));
    }

    #[test]
    fn bounds() {
        let (low, high) = bars().bounds().unwrap();
        assert_eq!(low, 2.0);
        assert_eq!(high, 5.0);
    }

    #[test]
    fn slots_cover_group() {
        let bars = bars();
        let (left, _) = bars.slot(1, 0);
        let (_, right) = bars.slot(1, 1);
        assert!((left - (1.0 - GROUP_WIDTH / 2.0)).abs() < 1e-9);
        assert!((right - (1.0 + GROUP_WIDTH / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn recolour() {
        let mut bars = bars();
        bars.recolour(&["z".to_string(), "y".to_string(), "x".to_string()]);
        assert_eq!(bars.series[0].colour, 2);
        assert_eq!(bars.series[1].colour, 1);
    }

    #[test]
    fn empty_bars() {
        let bars = Bars {
            categories: Vec::new(),
            series: Vec::new(),
        };
        assert!(bars.is_empty());
        assert!(bars.bounds().is_none());
    }
}
