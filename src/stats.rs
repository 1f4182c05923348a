use crate::dataset::Dataset;
use crate::models::{FilterSelection, Genre, MovieRow, TitleCount, YearTrend};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Number of bars in the top movies chart.
pub const TOP_MOVIES_LIMIT: usize = 6;
/// Number of bars in the trending chart.
pub const TRENDING_LIMIT: usize = 10;
/// Rows from this year onward count as trending.
pub const TRENDING_SINCE_YEAR: i32 = 2014;

/// Sum rating counts per title over the rows accepted by `keep`.
///
/// Rows without a title or whose rating count failed coercion are skipped. Titles come out in
/// ascending order, which is the tie order after the stable ranking sort.
fn sum_by_title<'a, F>(dataset: &'a Dataset, keep: F) -> BTreeMap<&'a str, f64>
where
    F: Fn(&MovieRow) -> bool,
{
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in dataset.rows().iter().filter(|r| keep(*r)) {
        if let (Some(title), Some(count)) = (row.title.as_deref(), row.rating_count) {
            *totals.entry(title).or_default() += count;
        }
    }
    totals
}

fn rank(totals: BTreeMap<&str, f64>, limit: usize) -> Vec<TitleCount> {
    let mut out: Vec<TitleCount> = totals
        .into_iter()
        .map(|(title, rating_count)| TitleCount {
            title: title.to_string(),
            rating_count,
        })
        .collect();
    // `sort_by` is stable: equal sums keep their title order.
    out.sort_by(|a, b| {
        b.rating_count
            .partial_cmp(&a.rating_count)
            .unwrap_or(Ordering::Equal)
    });
    out.truncate(limit);
    out
}

/// Top titles by summed rating count for the given year/genre selection.
///
/// Returns at most [`TOP_MOVIES_LIMIT`] rows, highest count first. An empty
/// vector means nothing matched.
pub fn top_movies(dataset: &Dataset, selection: &FilterSelection) -> Vec<TitleCount> {
    rank(sum_by_title(dataset, |r| selection.matches(r)), TOP_MOVIES_LIMIT)
}

/// Titles with the most ratings since [`TRENDING_SINCE_YEAR`].
pub fn trending_movies(dataset: &Dataset) -> Vec<TitleCount> {
    let totals = sum_by_title(dataset, |r| {
        r.year.is_some_and(|y| y >= TRENDING_SINCE_YEAR)
    });
    rank(totals, TRENDING_LIMIT)
}

#[derive(Default)]
struct YearAcc {
    rating_sum: f64,
    rating_n: usize,
    count_sum: f64,
}

/// Mean rating and total rating count per year, ascending by year.
///
/// Rows without a year are left out. Missing ratings don't pull the mean down
/// and missing counts don't add to the total.
pub fn rating_trend(dataset: &Dataset, genre: Option<Genre>) -> Vec<YearTrend> {
    let mut by_year: BTreeMap<i32, YearAcc> = BTreeMap::new();
    for row in dataset.rows() {
        if let Some(g) = genre
            && !row.genres.contains(g)
        {
            continue;
        }
        let Some(year) = row.year else { continue };
        let acc = by_year.entry(year).or_default();
        if let Some(r) = row.rating {
            acc.rating_sum += r;
            acc.rating_n += 1;
        }
        if let Some(c) = row.rating_count {
            acc.count_sum += c;
        }
    }

    by_year
        .into_iter()
        .map(|(year, acc)| YearTrend {
            year,
            avg_rating: (acc.rating_n > 0).then(|| acc.rating_sum / acc.rating_n as f64),
            total_rating_count: acc.count_sum,
        })
        .collect()
}
