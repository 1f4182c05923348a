//! Utility functions for visualization: theme colors, locale mapping, number formatting.

use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};

use super::fonts::FONT_FAMILY;
use super::text::estimate_text_width_px;
use super::types::Theme;

/// Dashboard gold (#FFD700).
pub const GOLD: RGBColor = RGBColor(255, 215, 0);
/// Microsoft Office (2013+) first series color (#4472C4).
pub const OFFICE_BLUE: RGBColor = RGBColor(68, 114, 196);

/// Resolved colors for one theme.
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    pub background: RGBColor,
    pub ink: RGBColor,
    pub series: RGBColor,
    pub grid: RGBColor,
}

pub fn palette(theme: Theme) -> ThemeColors {
    match theme {
        Theme::Dark => ThemeColors {
            background: BLACK,
            ink: GOLD,
            series: GOLD,
            grid: RGBColor(64, 64, 64),
        },
        Theme::Light => ThemeColors {
            background: WHITE,
            ink: BLACK,
            series: OFFICE_BLUE,
            grid: RGBColor(220, 220, 220),
        },
    }
}

/// Map a user-provided locale tag to a `num_format::Locale`.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    }
}

/// Text style in the registered chart font.
pub fn text_style(px: f64, color: &RGBColor) -> TextStyle<'static> {
    FontDesc::new(FontFamily::Name(FONT_FAMILY), px, FontStyle::Normal).color(color)
}

/// Whole-number tick label with locale thousands separators (`30,000` vs `30.000`).
pub fn format_count(v: f64, locale: &Locale) -> String {
    let n = v.round() as i64;
    n.to_formatted_string(locale)
}

/// Upper bound of the value axis: a little headroom above the largest value.
pub fn value_axis_max(max_value: f64) -> f64 {
    if max_value > 0.0 { max_value * 1.08 } else { 1.0 }
}

/// Left label area for a count axis, sized to the widest formatted tick label.
pub fn value_gutter_px(max_value: f64, ticks: usize, font_px: u32, locale: &Locale) -> u32 {
    let mut max_px = 0u32;
    for i in 0..=ticks {
        let t = if ticks == 0 { 0.0 } else { i as f64 / ticks as f64 };
        let s = format_count(max_value * t, locale);
        max_px = max_px.max(estimate_text_width_px(&s, font_px));
    }
    max_px.saturating_add(18).clamp(48, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_use_locale_separators() {
        assert_eq!(format_count(30000.0, map_locale("en")), "30,000");
        assert_eq!(format_count(30000.0, map_locale("de")), "30.000");
        assert_eq!(format_count(12.6, map_locale("xx")), "13");
    }

    #[test]
    fn axis_max_has_headroom() {
        assert_eq!(value_axis_max(0.0), 1.0);
        assert!(value_axis_max(100.0) > 100.0);
    }
}
