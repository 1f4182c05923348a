//! HTTP dashboard over a loaded [`Dataset`].
//!
//! Serves one HTML page with the year/genre dropdowns and three chart images,
//! plus JSON and SVG endpoints for each chart. Every request recomputes its table
//! from the shared read-only dataset, so handlers need no locking.
//!
//! Typical usage:
//! ```no_run
//! # use std::sync::Arc;
//! # use movies_dashboard::{api, Dataset, viz::RenderOptions};
//! # async fn run() -> anyhow::Result<()> {
//! let dataset = Arc::new(Dataset::load_csv("movie_rating_tags.csv")?);
//! let app = api::build_router(api::AppState::new(dataset, RenderOptions::default()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8055").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::dataset::Dataset;
use crate::models::{FilterSelection, Genre, TitleCount, YearTrend};
use crate::stats;
use crate::viz::{self, ChartData, ChartSpec, RenderOptions};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("ui/index.html");

/// State shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, never written afterwards.
    pub dataset: Arc<Dataset>,
    pub render: Arc<RenderOptions>,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, render: RenderOptions) -> Self {
        Self {
            dataset,
            render: Arc::new(render),
        }
    }
}

/// Build the dashboard router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/top-movies", get(top_movies_json))
        .route("/api/trending", get(trending_json))
        .route("/api/rating-trend", get(rating_trend_json))
        .route("/charts/top-movies.svg", get(top_movies_svg))
        .route("/charts/trending.svg", get(trending_svg))
        .route("/charts/rating-trend.svg", get(rating_trend_svg))
        .with_state(state)
}

/// Raw dropdown values from the query string. Empty strings mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub year: Option<String>,
    pub genre: Option<String>,
}

/// Title and rows of one chart.
#[derive(Debug, Serialize)]
pub struct TableResponse<T> {
    pub title: String,
    pub rows: Vec<T>,
}

/// Dropdown choices.
#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub years: Vec<i32>,
    pub genres: Vec<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("chart rendering failed: {0:#}")]
    Render(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Render(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{self}");
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

fn top_movies_view(ds: &Dataset, q: &SelectionQuery) -> (ChartSpec, Vec<TitleCount>) {
    match FilterSelection::parse(q.year.as_deref(), q.genre.as_deref()) {
        Some(sel) => (ChartSpec::top_movies(&sel), stats::top_movies(ds, &sel)),
        None => {
            debug!("selection {:?} cannot match any row", q);
            let spec = ChartSpec::top_movies_raw(q.year.as_deref(), q.genre.as_deref());
            (spec, Vec::new())
        }
    }
}

fn rating_trend_view(ds: &Dataset, q: &SelectionQuery) -> (ChartSpec, Vec<YearTrend>) {
    // The trend chart only follows the genre dropdown.
    match FilterSelection::parse(None, q.genre.as_deref()) {
        Some(sel) => (ChartSpec::rating_trend(), stats::rating_trend(ds, sel.genre)),
        None => {
            debug!("genre {:?} is not a known genre column", q.genre);
            (ChartSpec::rating_trend(), Vec::new())
        }
    }
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "module": "movies-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
        "rows": state.dataset.len(),
    }))
}

/// GET /api/options
pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        years: state.dataset.years().to_vec(),
        genres: Genre::ALL.iter().map(|g| g.column()).collect(),
    })
}

/// GET /api/top-movies?year=&genre=
pub async fn top_movies_json(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Json<TableResponse<TitleCount>> {
    let (spec, rows) = top_movies_view(&state.dataset, &q);
    Json(TableResponse {
        title: spec.title,
        rows,
    })
}

/// GET /api/trending
pub async fn trending_json(State(state): State<AppState>) -> Json<TableResponse<TitleCount>> {
    Json(TableResponse {
        title: ChartSpec::trending().title,
        rows: stats::trending_movies(&state.dataset),
    })
}

/// GET /api/rating-trend?genre=
pub async fn rating_trend_json(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Json<TableResponse<YearTrend>> {
    let (spec, rows) = rating_trend_view(&state.dataset, &q);
    Json(TableResponse {
        title: spec.title,
        rows,
    })
}

/// GET /charts/top-movies.svg?year=&genre=
pub async fn top_movies_svg(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Result<Response, ApiError> {
    let (spec, rows) = top_movies_view(&state.dataset, &q);
    let svg = viz::render_svg(ChartData::Ranking(&rows), &spec, &state.render)?;
    Ok(svg_response(svg))
}

/// GET /charts/trending.svg
pub async fn trending_svg(State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = stats::trending_movies(&state.dataset);
    let svg = viz::render_svg(ChartData::Ranking(&rows), &ChartSpec::trending(), &state.render)?;
    Ok(svg_response(svg))
}

/// GET /charts/rating-trend.svg?genre=
pub async fn rating_trend_svg(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Result<Response, ApiError> {
    let (spec, rows) = rating_trend_view(&state.dataset, &q);
    let svg = viz::render_svg(ChartData::Trend(&rows), &spec, &state.render)?;
    Ok(svg_response(svg))
}
