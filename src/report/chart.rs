//! Power-zone bar chart of one fleet, as a PNG for inline email images.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use thiserror::Error;

use crate::constants::filenames;
use crate::data_mgmt::models::{DbSelector, PowerMode};
use crate::data_mgmt::stats::PowerModeBreakdown;
use crate::helpers::time::{report_label, DATE_FORMAT};

use super::html::format_percent;

const FONT_FAMILY: &str = "chart";
const SIZE: (u32, u32) = (400, 600);
const TITLE_HEIGHT: u32 = 70;

static FONT: OnceCell<()> = OnceCell::new();

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("cannot read chart font {}: {source}", path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid chart font {}", path.display())]
    FontInvalid { path: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Draw(e.to_string())
}

fn colour(mode: PowerMode) -> RGBColor {
    match mode {
        PowerMode::Critical => RGBColor(214, 39, 40),
        PowerMode::Low => RGBColor(255, 127, 14),
        PowerMode::Medium => RGBColor(31, 119, 180),
        PowerMode::High => RGBColor(44, 160, 44),
    }
}

/// Where the chart for `date` from `selector` lives under the report directory
pub fn chart_path(report_dir: &Path, selector: DbSelector, date: NaiveDate) -> PathBuf {
    report_dir.join(filenames::CHARTS_SUBDIR).join(format!(
        "{}{}.{}",
        selector.chart_prefix(),
        date.format(DATE_FORMAT),
        filenames::CHART_EXT
    ))
}

pub fn title_lines(list_name: &str, devices: usize, date: NaiveDate) -> [String; 3] {
    [
        "Tracker Battery Power Zones".to_string(),
        format!("{list_name} ({devices}) devices"),
        format!("Snapshot of {}", report_label(date)),
    ]
}

// The font bytes have to outlive the process-wide registry, so they are leaked once
fn register_chart_font(path: &Path) -> Result<(), ChartError> {
    FONT.get_or_try_init(|| {
        let bytes = fs::read(path).map_err(|source| ChartError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| ChartError::FontInvalid {
            path: path.to_path_buf(),
        })
    })
    .map(|_| ())
}

/// Renders the power-mode distribution of `breakdown` to a PNG at `path`
pub fn render(
    path: &Path,
    font: &Path,
    list_name: &str,
    date: NaiveDate,
    breakdown: &PowerModeBreakdown,
) -> Result<(), ChartError> {
    register_chart_font(font)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let (title_area, plot_area) = root.split_vertically(TITLE_HEIGHT);

    let title_style =
        TextStyle::from((FONT_FAMILY, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in title_lines(list_name, breakdown.total, date).iter().enumerate() {
        title_area
            .draw(&Text::new(
                line.as_str(),
                (SIZE.0 as i32 / 2, 6 + 20 * i as i32),
                title_style.clone(),
            ))
            .map_err(draw_err)?;
    }

    let max_count = PowerMode::ALL
        .iter()
        .map(|m| breakdown.count(*m))
        .max()
        .unwrap_or(0) as u32;
    let y_max = (max_count as f64 * 1.12).ceil() as u32 + 1;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(30)
        .build_cartesian_2d((0usize..PowerMode::ALL.len()).into_segmented(), 0u32..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(0)
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => PowerMode::ALL
                .get(*i)
                .map(|m| m.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Power Zone")
        .y_desc("Trackers per Power Zone")
        .label_style((FONT_FAMILY, 13))
        .axis_desc_style((FONT_FAMILY, 14))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(PowerMode::ALL.iter().enumerate().map(|(i, mode)| {
            let mut bar = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0),
                    (SegmentValue::Exact(i + 1), breakdown.count(*mode) as u32),
                ],
                colour(*mode).filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))
        .map_err(draw_err)?;

    let label_style =
        TextStyle::from((FONT_FAMILY, 13).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(PowerMode::ALL.iter().enumerate().map(|(i, mode)| {
            Text::new(
                format_percent(breakdown.percent(*mode)),
                (SegmentValue::CenterOf(i), breakdown.count(*mode) as u32),
                label_style.clone(),
            )
        }))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::debug!("Chart saved to {}", path.display());
    Ok(())
}
