//! movies_dashboard
//!
//! A small Rust library for exploring a movie ratings/tags table: which titles
//! collect the most ratings for a year and genre, what is trending, and how ratings
//! develop over the years. Pairs with the `movies` CLI (which also serves the web
//! dashboard) and the `movies-gui` desktop app.
//!
//! ### Features
//! - Load the CSV once, coercing text-typed counts and dropping bad cells
//! - Top movies, trending movies and per-year rating trend tables
//! - Render bar and line charts to SVG/PNG or an RGB buffer
//! - Export result tables as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use movies_dashboard::{Dataset, FilterSelection, Genre, stats, viz};
//!
//! let data = Dataset::load_csv("movie_rating_tags.csv")?;
//! let selection = FilterSelection::new(Some(2015), Some(Genre::Comedy));
//! let top = stats::top_movies(&data, &selection);
//! movies_dashboard::storage::save_title_counts_csv(&top, "top_2015_comedy.csv")?;
//! viz::plot_ranking(
//!     &top,
//!     &viz::ChartSpec::top_movies(&selection),
//!     &viz::RenderOptions::default(),
//!     "top.svg",
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod dataset;
pub mod models;
pub mod stats;
pub mod storage;
pub mod viz;

pub use config::DashboardConfig;
pub use dataset::{Dataset, DatasetError, DatasetSummary};
pub use models::{FilterSelection, Genre, MovieRow, TitleCount, YearTrend};
