//! Public types for the visualization module.

use crate::models::{FilterSelection, TitleCount, YearTrend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Color scheme for rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Gold on black, the dashboard look.
    #[default]
    Dark,
    /// Office blue on white, for printing and documents.
    Light,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme `{other}` (expected dark or light)")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

/// What to draw: a title ranking (horizontal bars) or a per-year trend (line).
#[derive(Debug, Clone, Copy)]
pub enum ChartData<'a> {
    Ranking(&'a [TitleCount]),
    Trend(&'a [YearTrend]),
}

impl ChartData<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Ranking(rows) => rows.is_empty(),
            ChartData::Trend(rows) => rows.is_empty(),
        }
    }
}

/// Caption and axis descriptions of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
}

impl ChartSpec {
    /// "Top Movies", "Top Movies in 2015", "Top Movies in 2015 - Comedy", ...
    pub fn top_movies(selection: &FilterSelection) -> Self {
        let year = selection.year.map(|y| y.to_string());
        let genre = selection.genre.map(|g| g.to_string());
        Self::top_movies_raw(year.as_deref(), genre.as_deref())
    }

    /// Same title built from raw dropdown values, for selections that don't parse.
    /// Blank values are left out.
    pub fn top_movies_raw(year: Option<&str>, genre: Option<&str>) -> Self {
        let mut title = String::from("Top Movies");
        if let Some(y) = year.map(str::trim).filter(|s| !s.is_empty()) {
            title.push_str(&format!(" in {y}"));
        }
        if let Some(g) = genre.map(str::trim).filter(|s| !s.is_empty()) {
            title.push_str(&format!(" - {g}"));
        }
        Self {
            title,
            x_desc: "Rating Count".into(),
            y_desc: String::new(),
        }
    }

    pub fn trending() -> Self {
        Self {
            title: "Trending Now".into(),
            x_desc: "Rating Count".into(),
            y_desc: String::new(),
        }
    }

    pub fn rating_trend() -> Self {
        Self {
            title: "Rating Trend".into(),
            x_desc: "Year".into(),
            y_desc: "Total Rating Count".into(),
        }
    }
}

/// Canvas size, theme, number locale and font for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub theme: Theme,
    /// Locale tag for thousands separators, e.g. `en` or `de`.
    pub locale: String,
    /// TrueType font to register; well-known system fonts are tried when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
            theme: Theme::Dark,
            locale: "en".into(),
            font_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;

    #[test]
    fn top_movies_title_follows_selection() {
        let t = |y, g| ChartSpec::top_movies(&FilterSelection::new(y, g)).title;
        assert_eq!(t(None, None), "Top Movies");
        assert_eq!(t(Some(2015), None), "Top Movies in 2015");
        assert_eq!(t(None, Some(Genre::Comedy)), "Top Movies - Comedy");
        assert_eq!(
            t(Some(2015), Some(Genre::SciFi)),
            "Top Movies in 2015 - Sci-Fi"
        );
    }

    #[test]
    fn raw_title_keeps_unparsed_values() {
        let t = |y, g| ChartSpec::top_movies_raw(y, g).title;
        assert_eq!(t(Some("soon"), Some("Cooking")), "Top Movies in soon - Cooking");
        assert_eq!(t(Some(" "), Some("Cooking")), "Top Movies - Cooking");
        assert_eq!(t(None, None), "Top Movies");
    }

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Light".parse::<Theme>().unwrap(), Theme::Light);
        assert!("neon".parse::<Theme>().is_err());
    }
}
