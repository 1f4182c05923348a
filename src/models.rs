use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of genre flag columns, in dataset column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    #[serde(rename = "Film-Noir")]
    FilmNoir,
    Horror,
    #[serde(rename = "IMAX")]
    Imax,
    Musical,
    Mystery,
    Romance,
    #[serde(rename = "Sci-Fi")]
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Children,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::Horror,
        Genre::Imax,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Column header used for this genre in the dataset file.
    pub fn column(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Imax => "IMAX",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Error returned when a name is not one of the 19 genre columns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    /// Matches the column header exactly; dropdown values are sent verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Genre::ALL
            .iter()
            .copied()
            .find(|g| g.column() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

/// Membership flags for one row, one bit per [`Genre`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GenreSet(u32);

impl GenreSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, genre: Genre) {
        self.0 |= genre.bit();
    }

    pub fn contains(&self, genre: Genre) -> bool {
        self.0 & genre.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Genre> + '_ {
        Genre::ALL.into_iter().filter(|g| self.contains(*g))
    }
}

impl FromIterator<Genre> for GenreSet {
    fn from_iter<I: IntoIterator<Item = Genre>>(iter: I) -> Self {
        let mut set = GenreSet::empty();
        for g in iter {
            set.insert(g);
        }
        set
    }
}

/// One observation of the dataset (one row of the input file).
///
/// Numeric cells that failed coercion are stored as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRow {
    /// `None` when the title cell was blank.
    pub title: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub rating_count: Option<f64>,
    pub genres: GenreSet,
}

/// Active dropdown values for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub genre: Option<Genre>,
}

impl FilterSelection {
    pub fn new(year: Option<i32>, genre: Option<Genre>) -> Self {
        Self { year, genre }
    }

    /// Parse raw dropdown values (form fields or CLI flags).
    ///
    /// Empty or absent values mean "no filter". Returns `None` when a value is
    /// given but can never match a row (unknown genre, non-integer year); callers
    /// answer that with an empty result rather than an error.
    pub fn parse(year: Option<&str>, genre: Option<&str>) -> Option<Self> {
        let year = match year.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(crate::dataset::coerce_year(s)?),
            None => None,
        };
        let genre = match genre.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Some(s.parse::<Genre>().ok()?),
            None => None,
        };
        Some(Self { year, genre })
    }

    /// True when `row` passes both the year and the genre filter.
    pub fn matches(&self, row: &MovieRow) -> bool {
        let year_ok = match self.year {
            Some(y) => row.year == Some(y),
            None => true,
        };
        let genre_ok = match self.genre {
            Some(g) => row.genres.contains(g),
            None => true,
        };
        year_ok && genre_ok
    }
}

/// Ranked row: a title and its summed rating count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleCount {
    pub title: String,
    pub rating_count: f64,
}

/// Per-year aggregate for the rating trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearTrend {
    pub year: i32,
    /// Mean of the ratings present for that year; `None` if no row had one.
    pub avg_rating: Option<f64>,
    pub total_rating_count: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genre_names_round_trip_through_columns() {
        for g in Genre::ALL {
            assert_eq!(g.column().parse::<Genre>().unwrap(), g);
        }
        assert_eq!("Sci-Fi".parse::<Genre>().unwrap(), Genre::SciFi);
        assert!("SciFi".parse::<Genre>().is_err());
    }

    #[test]
    fn selection_matches_year_and_genre() {
        let row = MovieRow {
            title: Some("A".into()),
            year: Some(2015),
            rating: Some(4.0),
            rating_count: Some(10.0),
            genres: [Genre::Comedy, Genre::Drama].into_iter().collect(),
        };
        assert!(FilterSelection::default().matches(&row));
        assert!(FilterSelection::new(Some(2015), Some(Genre::Drama)).matches(&row));
        assert!(!FilterSelection::new(Some(2014), None).matches(&row));
        assert!(!FilterSelection::new(None, Some(Genre::Horror)).matches(&row));
    }

    #[test]
    fn parse_raw_dropdown_values() {
        assert_eq!(
            FilterSelection::parse(Some(""), None),
            Some(FilterSelection::default())
        );
        assert_eq!(
            FilterSelection::parse(Some("2015.0"), Some("Film-Noir")),
            Some(FilterSelection::new(Some(2015), Some(Genre::FilmNoir)))
        );
        assert_eq!(FilterSelection::parse(None, Some("Cooking")), None);
        assert_eq!(FilterSelection::parse(Some("soon"), None), None);
    }

    #[test]
    fn row_without_year_never_matches_a_year_filter() {
        let row = MovieRow {
            title: Some("B".into()),
            year: None,
            rating: None,
            rating_count: None,
            genres: GenreSet::empty(),
        };
        assert!(!FilterSelection::new(Some(2015), None).matches(&row));
    }
}
