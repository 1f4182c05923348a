//! Font registration for the `ab_glyph` text path.
//!
//! `ab_glyph` doesn't discover OS fonts, so a TrueType file is registered once per
//! process under the family name used by all charts.

use anyhow::{Result, anyhow};
use log::{info, warn};
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Family name every chart asks for.
pub const FONT_FAMILY: &str = "sans-serif";

/// Environment variable that points at a font file, checked before the system paths.
pub const FONT_ENV: &str = "MOVIES_DASHBOARD_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Outcome of the one registration attempt made per process.
static REGISTERED: OnceLock<Result<PathBuf, String>> = OnceLock::new();

/// Candidate font files in lookup order.
fn candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(p) = preferred {
        out.push(p.to_path_buf());
    }
    if let Some(p) = std::env::var_os(FONT_ENV) {
        out.push(PathBuf::from(p));
    }
    out.extend(SYSTEM_FONTS.iter().map(PathBuf::from));
    out
}

/// Path of the first candidate that exists, if any.
pub fn find_font(preferred: Option<&Path>) -> Option<PathBuf> {
    candidates(preferred).into_iter().find(|p| p.is_file())
}

/// TrueType, OpenType or collection header.
fn looks_like_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some(&[0x00, 0x01, 0x00, 0x00] | b"OTTO" | b"true" | b"ttcf")
    )
}

/// Register the first usable candidate under [`FONT_FAMILY`].
///
/// Files that can't be read or don't carry a font header are skipped before
/// anything is leaked.
fn register_first(preferred: Option<&Path>) -> Result<PathBuf, String> {
    for path in candidates(preferred).into_iter().filter(|p| p.is_file()) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("skipping font {}: {err}", path.display());
                continue;
            }
        };
        if !looks_like_font(&bytes) {
            warn!("skipping font {}: not a TrueType/OpenType file", path.display());
            continue;
        }
        // Plotters keeps a `'static` reference to the font data for the process lifetime.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                info!("registered chart font {}", path.display());
                return Ok(path);
            }
            Err(_) => warn!("skipping font {}: unusable font data", path.display()),
        }
    }
    Err(format!(
        "no usable TrueType font found; set `font_path` in the config or {FONT_ENV} to a .ttf file"
    ))
}

/// Register a font under [`FONT_FAMILY`] on first use.
///
/// Only the first call searches; its outcome, success or failure, is reused by
/// every later call.
pub fn ensure_fonts_registered(preferred: Option<&Path>) -> Result<()> {
    match REGISTERED.get_or_init(|| register_first(preferred)) {
        Ok(_) => Ok(()),
        Err(msg) => Err(anyhow!("{msg}")),
    }
}

/// True when charts can be rendered.
pub fn fonts_available(preferred: Option<&Path>) -> bool {
    ensure_fonts_registered(preferred).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_font_is_tried_first() {
        let c = candidates(Some(Path::new("/tmp/custom.ttf")));
        assert_eq!(c[0], PathBuf::from("/tmp/custom.ttf"));
        assert!(c.len() > SYSTEM_FONTS.len());
    }

    #[test]
    fn font_header_check() {
        assert!(looks_like_font(&[0x00, 0x01, 0x00, 0x00, 0x00]));
        assert!(looks_like_font(b"OTTO...."));
        assert!(!looks_like_font(b"<html>"));
        assert!(!looks_like_font(b"ab"));
    }

    #[test]
    fn bad_preferred_font_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("not-a-font.ttf");
        std::fs::write(&bad, b"definitely not a font").unwrap();
        match register_first(Some(&bad)) {
            Ok(path) => assert_ne!(path, bad),
            Err(msg) => assert!(msg.contains(FONT_ENV)),
        }
    }
}
