use movies_dashboard::viz::{self, ChartData, ChartSpec, RenderOptions, Theme};
use movies_dashboard::{FilterSelection, Genre, TitleCount, YearTrend};
use tempfile::tempdir;

// Rendering needs a TrueType font; hosts without one skip these tests.
fn font_or_skip() -> bool {
    if viz::fonts_available(None) {
        true
    } else {
        eprintln!("skipping: no font found (set {})", viz::FONT_ENV);
        false
    }
}

fn ranking() -> Vec<TitleCount> {
    (0..6)
        .map(|i| TitleCount {
            title: format!("A Rather Long Movie Title Number {i} (2015)"),
            rating_count: 1000.0 - i as f64 * 120.0,
        })
        .collect()
}

fn trend() -> Vec<YearTrend> {
    vec![
        YearTrend {
            year: 2012,
            avg_rating: Some(3.4),
            total_rating_count: 12_000.0,
        },
        YearTrend {
            year: 2013,
            avg_rating: None,
            total_rating_count: 30_500.0,
        },
        YearTrend {
            year: 2014,
            avg_rating: Some(3.9),
            total_rating_count: 8_250.0,
        },
    ]
}

#[test]
fn ranking_svg_carries_title() {
    if !font_or_skip() {
        return;
    }
    let rows = ranking();
    let spec = ChartSpec::top_movies(&FilterSelection::new(Some(2015), Some(Genre::Comedy)));
    let svg = viz::render_svg(ChartData::Ranking(&rows), &spec, &RenderOptions::default()).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Top Movies in 2015 - Comedy"));
}

#[test]
fn empty_ranking_renders_a_note() {
    if !font_or_skip() {
        return;
    }
    let svg = viz::render_svg(
        ChartData::Ranking(&[]),
        &ChartSpec::trending(),
        &RenderOptions::default(),
    )
    .unwrap();
    assert!(svg.contains("Trending Now"));
    assert!(svg.contains("No data"));
}

#[test]
fn trend_to_svg_and_png_files() {
    if !font_or_skip() {
        return;
    }
    let dir = tempdir().unwrap();
    let rows = trend();
    let opts = RenderOptions {
        theme: Theme::Light,
        locale: "de".into(),
        ..RenderOptions::default()
    };
    for name in ["trend.svg", "trend.png"] {
        let path = dir.path().join(name);
        viz::plot_trend(&rows, &ChartSpec::rating_trend(), &opts, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0, "{name} has content");
    }
}

#[test]
fn rgb_buffer_matches_canvas() {
    if !font_or_skip() {
        return;
    }
    let opts = RenderOptions {
        width: 320,
        height: 200,
        ..RenderOptions::default()
    };
    let rows = ranking();
    let buf = viz::render_rgb(ChartData::Ranking(&rows), &ChartSpec::trending(), &opts).unwrap();
    assert_eq!(buf.len(), 320 * 200 * 3);
}
