use crate::models::{TitleCount, YearTrend};
use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn defuse(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Save a title ranking as CSV with header.
pub fn save_title_counts_csv<P: AsRef<Path>>(rows: &[TitleCount], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["title", "rating_count"])?;
    for r in rows {
        wtr.serialize((defuse(&r.title), r.rating_count))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a per-year trend as CSV with header. Missing means are written as empty cells.
pub fn save_year_trends_csv<P: AsRef<Path>>(rows: &[YearTrend], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["year", "avg_rating", "total_rating_count"])?;
    for r in rows {
        wtr.serialize((r.year, r.avg_rating, r.total_rating_count))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any result table as a pretty JSON array.
pub fn save_json<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
