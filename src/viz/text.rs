//! Text measurement and truncation for axis labels.

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Truncate to fit `max_px` and add a single ellipsis if needed.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        out.push(ch);
        if estimate_text_width_px(&out, font_px) + estimate_text_width_px("…", font_px) > max_px {
            out.pop();
            break;
        }
    }
    let trimmed = out.trim_end();
    format!("{trimmed}…")
}

/// Width of the left gutter that holds movie titles next to the bars.
///
/// Sized to the widest label plus padding, clamped to `min_px..=max_px`.
pub fn label_gutter_px(labels: &[String], font_px: u32, min_px: u32, max_px: u32) -> u32 {
    let widest = labels
        .iter()
        .map(|l| estimate_text_width_px(l, font_px))
        .max()
        .unwrap_or(0);
    widest.saturating_add(14).clamp(min_px, max_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(truncate_to_width("Up (2009)", 10, 200), "Up (2009)");
    }

    #[test]
    fn long_titles_get_one_ellipsis_and_fit() {
        let t = truncate_to_width("Lord of the Rings: The Return of the King, The (2003)", 12, 150);
        assert!(t.ends_with('…'));
        assert_eq!(t.matches('…').count(), 1);
        assert!(estimate_text_width_px(&t, 12) <= 150);
    }

    #[test]
    fn gutter_is_clamped() {
        let labels = vec!["x".repeat(200)];
        assert_eq!(label_gutter_px(&labels, 12, 80, 260), 260);
        assert_eq!(label_gutter_px(&[], 12, 80, 260), 80);
    }
}
