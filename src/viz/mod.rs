//! Visualization: render dashboard charts to **SVG** or **PNG**, or into an RGB buffer.
//!
//! - Horizontal bar chart for title rankings (largest bar on top)
//! - Line chart with markers for the per-year rating trend
//! - Locale-aware tick labels (`30,000` vs `30.000`), whole numbers
//! - Dark (gold on black) and light themes
//! - Empty tables render a frame with a "No data" note instead of failing

pub mod fonts;
pub mod text;
pub mod types;
pub mod util;

pub use fonts::{FONT_ENV, FONT_FAMILY, ensure_fonts_registered, find_font, fonts_available};
pub use types::{ChartData, ChartSpec, RenderOptions, Theme};

use crate::models::{TitleCount, YearTrend};
use anyhow::{Result, anyhow};
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::LineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::ops::Range;
use std::path::Path;

use text::{label_gutter_px, truncate_to_width};
use util::{
    ThemeColors, format_count, map_locale, palette, text_style, value_axis_max, value_gutter_px,
};

const MARGIN: u32 = 16;
const TITLE_FONT_PX: f64 = 22.0;
const LABEL_FONT_PX: u32 = 13;
const DESC_FONT_PX: f64 = 15.0;
const MIN_GUTTER_PX: u32 = 80;

/// Render a chart to an SVG document in memory.
pub fn render_svg(data: ChartData<'_>, spec: &ChartSpec, opts: &RenderOptions) -> Result<String> {
    ensure_fonts_registered(opts.font_path.as_deref())?;
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (opts.width, opts.height)).into_drawing_area();
        draw_chart(root, data, spec, opts)?;
    }
    Ok(out)
}

/// Render a chart to `out_path`; `.svg` writes SVG, anything else a bitmap (PNG by default).
pub fn render_to_file<P: AsRef<Path>>(
    data: ChartData<'_>,
    spec: &ChartSpec,
    opts: &RenderOptions,
    out_path: P,
) -> Result<()> {
    ensure_fonts_registered(opts.font_path.as_deref())?;
    let out_path = out_path.as_ref();
    let size = (opts.width, opts.height);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(out_path, size).into_drawing_area();
        draw_chart(root, data, spec, opts)
    } else {
        let root = BitMapBackend::new(out_path, size).into_drawing_area();
        draw_chart(root, data, spec, opts)
    }
}

/// Render a chart into a tightly packed RGB buffer of `width * height * 3` bytes.
pub fn render_rgb(data: ChartData<'_>, spec: &ChartSpec, opts: &RenderOptions) -> Result<Vec<u8>> {
    ensure_fonts_registered(opts.font_path.as_deref())?;
    let mut buf = vec![0u8; opts.width as usize * opts.height as usize * 3];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (opts.width, opts.height)).into_drawing_area();
        draw_chart(root, data, spec, opts)?;
    }
    Ok(buf)
}

/// Convenience: render a title ranking to a file.
pub fn plot_ranking<P: AsRef<Path>>(
    rows: &[TitleCount],
    spec: &ChartSpec,
    opts: &RenderOptions,
    out_path: P,
) -> Result<()> {
    render_to_file(ChartData::Ranking(rows), spec, opts, out_path)
}

/// Convenience: render a rating trend to a file.
pub fn plot_trend<P: AsRef<Path>>(
    rows: &[YearTrend],
    spec: &ChartSpec,
    opts: &RenderOptions,
    out_path: P,
) -> Result<()> {
    render_to_file(ChartData::Trend(rows), spec, opts, out_path)
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    data: ChartData<'_>,
    spec: &ChartSpec,
    opts: &RenderOptions,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let colors = palette(opts.theme);
    root.fill(&colors.background)
        .map_err(|e| anyhow!("{:?}", e))?;

    let title_style = text_style(TITLE_FONT_PX, &colors.ink);
    let body = root
        .margin(MARGIN, MARGIN, MARGIN, MARGIN)
        .titled(&spec.title, title_style)
        .map_err(|e| anyhow!("{:?}", e))?;

    let locale = map_locale(&opts.locale);
    if data.is_empty() {
        draw_no_data(&body, &colors)?;
    } else {
        match data {
            ChartData::Ranking(rows) => draw_bars(&body, rows, spec, &colors, locale)?,
            ChartData::Trend(rows) => draw_trend(&body, rows, spec, &colors, locale)?,
        }
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_no_data<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, colors: &ThemeColors) -> Result<()> {
    let (w, h) = area.dim_in_pixel();
    let style = text_style(DESC_FONT_PX, &colors.ink).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "No data for this selection",
        (w as i32 / 2, h as i32 / 2),
        style,
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Horizontal bars, one per title, rank 0 at the top.
///
/// Titles are drawn in a separate left gutter so long names can be truncated to fit
/// without shrinking the bars.
fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[TitleCount],
    spec: &ChartSpec,
    colors: &ThemeColors,
    locale: &Locale,
) -> Result<()> {
    let (w, _) = area.dim_in_pixel();
    let max_gutter = (w / 3).max(MIN_GUTTER_PX);
    let labels: Vec<String> = rows
        .iter()
        .map(|r| truncate_to_width(&r.title, LABEL_FONT_PX, max_gutter.saturating_sub(14)))
        .collect();
    let gutter_px = label_gutter_px(&labels, LABEL_FONT_PX, MIN_GUTTER_PX, max_gutter);
    let (gutter, plot) = area.split_horizontally(gutter_px);

    let n = rows.len();
    let max_value = rows.iter().map(|r| r.rating_count).fold(0.0, f64::max);
    let x_max = value_axis_max(max_value);

    let mut chart = ChartBuilder::on(&plot)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(0f64..x_max, 0f64..n as f64)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |v: &f64| format_count(*v, locale);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_labels(8)
        .x_desc(spec.x_desc.as_str())
        .x_label_formatter(&x_label_fmt)
        .bold_line_style(colors.grid)
        .light_line_style(TRANSPARENT)
        .axis_style(colors.ink)
        .label_style(text_style(LABEL_FONT_PX as f64, &colors.ink))
        .axis_desc_style(text_style(DESC_FONT_PX, &colors.ink))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    // Row `rank` occupies the band [slot, slot + 1) counted from the bottom.
    let slot = |rank: usize| (n - 1 - rank) as f64;
    chart
        .draw_series(rows.iter().enumerate().map(|(rank, r)| {
            let y = slot(rank);
            Rectangle::new(
                [(0.0, y + 0.15), (r.rating_count, y + 0.85)],
                colors.series.filled(),
            )
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    let (_, gutter_top) = gutter.get_base_pixel();
    let label_style =
        text_style(LABEL_FONT_PX as f64, &colors.ink).pos(Pos::new(HPos::Right, VPos::Center));
    for (rank, label) in labels.iter().enumerate() {
        let (_, y_px) = chart.backend_coord(&(0.0, slot(rank) + 0.5));
        gutter
            .draw(&Text::new(
                label.as_str(),
                (gutter_px as i32 - 8, y_px - gutter_top),
                label_style.clone(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// X range and tick count for the trend chart.
///
/// Years are plotted as `f64` so any `i32` span works; a single year is padded by one
/// on each side.
fn year_axis(rows: &[YearTrend]) -> Option<(Range<f64>, usize)> {
    let min = f64::from(rows.iter().map(|r| r.year).min()?);
    let max = f64::from(rows.iter().map(|r| r.year).max()?);
    let (lo, hi) = if min == max { (min - 1.0, max + 1.0) } else { (min, max) };
    let ticks = (hi - lo + 1.0).min(12.0) as usize;
    Some((lo..hi, ticks))
}

/// Total rating count per year as a line with point markers.
fn draw_trend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    rows: &[YearTrend],
    spec: &ChartSpec,
    colors: &ThemeColors,
    locale: &Locale,
) -> Result<()> {
    let (x_range, x_label_count) = year_axis(rows).ok_or_else(|| anyhow!("no years"))?;
    let max_value = rows
        .iter()
        .map(|r| r.total_rating_count)
        .fold(0.0, f64::max);
    let y_max = value_axis_max(max_value);

    let y_label_count = 8usize;
    let left_px = value_gutter_px(y_max, y_label_count, LABEL_FONT_PX, locale);

    let mut chart = ChartBuilder::on(area)
        .set_label_area_size(LabelAreaPosition::Left, left_px + 24)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(x_range, 0f64..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    // Only whole years get a tick label.
    let x_label_fmt = |y: &f64| {
        if y.fract() == 0.0 {
            format!("{y:.0}")
        } else {
            String::new()
        }
    };
    let y_label_fmt = |v: &f64| format_count(*v, locale);

    chart
        .configure_mesh()
        .x_desc(spec.x_desc.as_str())
        .y_desc(spec.y_desc.as_str())
        .x_labels(x_label_count)
        .y_labels(y_label_count)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .bold_line_style(colors.grid)
        .light_line_style(TRANSPARENT)
        .axis_style(colors.ink)
        .label_style(text_style(LABEL_FONT_PX as f64, &colors.ink))
        .axis_desc_style(text_style(DESC_FONT_PX, &colors.ink))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let series: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (f64::from(r.year), r.total_rating_count))
        .collect();
    chart
        .draw_series(LineSeries::new(
            series.iter().copied(),
            colors.series.stroke_width(2),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .draw_series(
            series
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, colors.series.filled())),
        )
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking() -> Vec<TitleCount> {
        vec![
            TitleCount {
                title: "Inception (2010)".into(),
                rating_count: 30_000.0,
            },
            TitleCount {
                title: "Interstellar (2014)".into(),
                rating_count: 12_500.0,
            },
        ]
    }

    #[test]
    fn svg_contains_title_and_labels() {
        if !fonts_available(None) {
            eprintln!("skipping: no TrueType font on this system");
            return;
        }
        let rows = ranking();
        let svg = render_svg(
            ChartData::Ranking(&rows),
            &ChartSpec::trending(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Trending Now"));
        assert!(svg.contains("Inception (2010)"));
    }

    fn trend(years: &[i32]) -> Vec<YearTrend> {
        years
            .iter()
            .map(|&year| YearTrend {
                year,
                avg_rating: Some(3.0),
                total_rating_count: 10.0,
            })
            .collect()
    }

    #[test]
    fn year_axis_pads_a_single_year() {
        let (range, ticks) = year_axis(&trend(&[2015])).unwrap();
        assert_eq!(range, 2014.0..2016.0);
        assert_eq!(ticks, 3);
        assert!(year_axis(&[]).is_none());
    }

    #[test]
    fn year_axis_spans_extreme_years() {
        let (range, ticks) = year_axis(&trend(&[i32::MIN, i32::MAX])).unwrap();
        assert_eq!(range, f64::from(i32::MIN)..f64::from(i32::MAX));
        assert_eq!(ticks, 12);
        let (range, _) = year_axis(&trend(&[i32::MAX])).unwrap();
        assert!(range.end > f64::from(i32::MAX));
    }

    #[test]
    fn trend_with_extreme_years_renders() {
        if !fonts_available(None) {
            eprintln!("skipping: no TrueType font on this system");
            return;
        }
        let rows = trend(&[i32::MIN, 0, i32::MAX]);
        let svg = render_svg(
            ChartData::Trend(&rows),
            &ChartSpec::rating_trend(),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(svg.contains("Rating Trend"));
    }

    #[test]
    fn rgb_buffer_has_expected_size() {
        if !fonts_available(None) {
            eprintln!("skipping: no TrueType font on this system");
            return;
        }
        let opts = RenderOptions {
            width: 320,
            height: 200,
            ..RenderOptions::default()
        };
        let buf = render_rgb(ChartData::Trend(&[]), &ChartSpec::rating_trend(), &opts).unwrap();
        assert_eq!(buf.len(), 320 * 200 * 3);
    }
}
