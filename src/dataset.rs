//! Loading the movie ratings/tags table.
//!
//! The file is read once at startup into an immutable [`Dataset`]. Numeric cells are
//! coerced the same way for every column: trim, parse as `f64`, and treat anything
//! empty, non-numeric or non-finite as missing. Missing values are kept as `None` so
//! the aggregations can skip them instead of summing a made-up zero.

use crate::models::{Genre, GenreSet, MovieRow};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Errors raised while reading the dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),
    #[error("malformed record at line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read dataset header: {0}")]
    Header(#[source] csv::Error),
}

/// Counters collected while loading, reported by `movies info` and the logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub titles: usize,
    /// Rows whose `rating_count` could not be coerced to a number.
    pub bad_rating_counts: usize,
    pub missing_years: usize,
    /// Rows with a blank title; they are left out of the title rankings.
    pub missing_titles: usize,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

/// Immutable in-memory table. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<MovieRow>,
    years: Vec<i32>,
    summary: DatasetSummary,
}

/// Column positions resolved from the header row.
struct Columns {
    title: usize,
    year: usize,
    rating: usize,
    rating_count: usize,
    genres: Vec<(Genre, usize)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
        };
        let mut genres = Vec::with_capacity(Genre::ALL.len());
        for g in Genre::ALL {
            genres.push((g, find(g.column())?));
        }
        Ok(Self {
            title: find("title")?,
            year: find("year")?,
            rating: find("rating")?,
            rating_count: find("rating_count")?,
            genres,
        })
    }
}

/// Coerce a cell to a finite number. Empty or unparseable cells are `None`.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a year cell. Accepts `2015` and `2015.0`, rejects fractional years.
pub fn coerce_year(cell: &str) -> Option<i32> {
    let v = coerce_numeric(cell)?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return None;
    }
    Some(v as i32)
}

/// A blank title cell is a missing title, not an empty one.
fn coerce_title(cell: &str) -> Option<String> {
    let s = cell.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn coerce_flag(cell: &str) -> bool {
    coerce_numeric(cell) == Some(1.0)
}

impl Dataset {
    /// Build a dataset from already-parsed rows (used by tests and embedders).
    pub fn from_rows(rows: Vec<MovieRow>) -> Self {
        let years: BTreeSet<i32> = rows.iter().filter_map(|r| r.year).collect();
        let titles: BTreeSet<&str> = rows.iter().filter_map(|r| r.title.as_deref()).collect();
        let summary = DatasetSummary {
            rows: rows.len(),
            titles: titles.len(),
            bad_rating_counts: rows.iter().filter(|r| r.rating_count.is_none()).count(),
            missing_years: rows.iter().filter(|r| r.year.is_none()).count(),
            missing_titles: rows.iter().filter(|r| r.title.is_none()).count(),
            min_year: years.first().copied(),
            max_year: years.last().copied(),
        };
        Self {
            rows,
            years: years.into_iter().collect(),
            summary,
        }
    }

    /// Load the CSV file at `path`.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| DatasetError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let ds = Self::from_csv_reader(rdr)?;
        info!(
            "loaded {} rows ({} titles) from {}",
            ds.summary.rows,
            ds.summary.titles,
            path.display()
        );
        Ok(ds)
    }

    /// Load CSV data from any reader (header row required).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        Self::from_csv_reader(rdr)
    }

    fn from_csv_reader<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self, DatasetError> {
        let headers = rdr.headers().map_err(DatasetError::Header)?.clone();
        let cols = Columns::resolve(&headers)?;

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            match rdr.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => {
                    let line = source.position().map(|p| p.line()).unwrap_or(0);
                    return Err(DatasetError::Record { line, source });
                }
            }
            let cell = |idx: usize| record.get(idx).unwrap_or("");

            let rating_count = coerce_numeric(cell(cols.rating_count));
            if rating_count.is_none() {
                debug!(
                    "dropping rating_count {:?} for {:?}",
                    cell(cols.rating_count),
                    cell(cols.title)
                );
            }
            let genres: GenreSet = cols
                .genres
                .iter()
                .filter(|(_, idx)| coerce_flag(cell(*idx)))
                .map(|(g, _)| *g)
                .collect();

            rows.push(MovieRow {
                title: coerce_title(cell(cols.title)),
                year: coerce_year(cell(cols.year)),
                rating: coerce_numeric(cell(cols.rating)),
                rating_count,
                genres,
            });
        }

        let ds = Self::from_rows(rows);
        if ds.summary.bad_rating_counts > 0 {
            info!(
                "{} rows have a non-numeric rating_count and are left out of aggregations",
                ds.summary.bad_rating_counts
            );
        }
        Ok(ds)
    }

    pub fn rows(&self) -> &[MovieRow] {
        &self.rows
    }

    /// Distinct years present, ascending. Feeds the year dropdown.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> String {
        let genres: Vec<&str> = Genre::ALL.iter().map(|g| g.column()).collect();
        format!("title,year,rating,rating_count,{}", genres.join(","))
    }

    fn flags(set: &[Genre]) -> String {
        Genre::ALL
            .iter()
            .map(|g| if set.contains(g) { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(coerce_numeric(" 120 "), Some(120.0));
        assert_eq!(coerce_numeric("1.5e2"), Some(150.0));
        assert_eq!(coerce_numeric("bad"), None);
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("NaN"), None);
        assert_eq!(coerce_year("2015.0"), Some(2015));
        assert_eq!(coerce_year("2015.5"), None);
        assert!(coerce_flag("1.0"));
        assert!(!coerce_flag("2"));
    }

    #[test]
    fn parses_rows_and_counts_bad_cells() {
        let csv = format!(
            "{}\nA,2015,4.0,120,{}\nB,2015.0,3.5,bad,{}\nC,,,80,{}\n",
            header(),
            flags(&[Genre::Comedy]),
            flags(&[Genre::Comedy, Genre::SciFi]),
            flags(&[]),
        );
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.years(), &[2015]);
        let b = &ds.rows()[1];
        assert_eq!(b.year, Some(2015));
        assert_eq!(b.rating_count, None);
        assert!(b.genres.contains(Genre::SciFi));
        let c = &ds.rows()[2];
        assert_eq!(c.year, None);
        assert_eq!(c.rating, None);
        assert_eq!(c.rating_count, Some(80.0));

        let s = ds.summary();
        assert_eq!(s.bad_rating_counts, 1);
        assert_eq!(s.missing_years, 1);
        assert_eq!(s.titles, 3);
        assert_eq!(s.missing_titles, 0);
        assert_eq!((s.min_year, s.max_year), (Some(2015), Some(2015)));
    }

    #[test]
    fn blank_title_is_missing() {
        let csv = format!(
            "{}\n  ,2015,3.0,500,{}\nA,2015,4.0,10,{}\n",
            header(),
            flags(&[]),
            flags(&[]),
        );
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.rows()[0].title, None);
        assert_eq!(ds.rows()[1].title.as_deref(), Some("A"));
        assert_eq!(ds.summary().missing_titles, 1);
        assert_eq!(ds.summary().titles, 1);
    }

    #[test]
    fn missing_genre_column_is_an_error() {
        let csv = "title,year,rating,rating_count,Action\nA,2015,4.0,1,1\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "Adventure"));
    }
}
