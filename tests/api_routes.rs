use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use movies_dashboard::api::{AppState, build_router};
use movies_dashboard::models::GenreSet;
use movies_dashboard::viz::{self, RenderOptions};
use movies_dashboard::{Dataset, Genre, MovieRow};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn movie(title: &str, year: i32, rating: f64, count: f64, genres: &[Genre]) -> MovieRow {
    MovieRow {
        title: Some(title.into()),
        year: Some(year),
        rating: Some(rating),
        rating_count: Some(count),
        genres: genres.iter().copied().collect::<GenreSet>(),
    }
}

fn app() -> Router {
    let ds = Dataset::from_rows(vec![
        movie("Amelie (2001)", 2013, 3.0, 10.0, &[Genre::Comedy, Genre::Romance]),
        movie("Brazil (1985)", 2013, 5.0, 20.0, &[Genre::SciFi]),
        movie("Coco (2017)", 2015, 4.0, 5.0, &[Genre::Animation, Genre::Comedy]),
    ]);
    build_router(AppState::new(Arc::new(ds), RenderOptions::default()))
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

async fn get_json(uri: &str) -> Value {
    let (status, _, body) = get(uri).await;
    assert_eq!(status, StatusCode::OK, "{uri}");
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_rows() {
    let v = get_json("/health").await;
    assert_eq!(v["status"], "ok");
    assert_eq!(v["module"], "movies-dashboard");
    assert_eq!(v["rows"], 3);
}

#[tokio::test]
async fn index_page_has_dropdowns() {
    let (status, content_type, body) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("year-dropdown"));
    assert!(html.contains("genre-dropdown"));
}

#[tokio::test]
async fn options_lists_years_and_genres() {
    let v = get_json("/api/options").await;
    assert_eq!(v["years"], serde_json::json!([2013, 2015]));
    let genres = v["genres"].as_array().unwrap();
    assert_eq!(genres.len(), Genre::ALL.len());
    assert!(genres.contains(&Value::from("Sci-Fi")));
}

#[tokio::test]
async fn top_movies_follows_both_dropdowns() {
    let v = get_json("/api/top-movies?year=2013&genre=Comedy").await;
    assert_eq!(v["title"], "Top Movies in 2013 - Comedy");
    assert_eq!(
        v["rows"],
        serde_json::json!([{ "title": "Amelie (2001)", "rating_count": 10.0 }])
    );

    // Empty dropdown values mean no filter.
    let v = get_json("/api/top-movies?year=&genre=").await;
    assert_eq!(v["title"], "Top Movies");
    assert_eq!(v["rows"].as_array().unwrap().len(), 3);
    assert_eq!(v["rows"][0]["title"], "Brazil (1985)");
}

#[tokio::test]
async fn unknown_values_give_empty_rows() {
    let v = get_json("/api/top-movies?genre=Cooking").await;
    assert_eq!(v["title"], "Top Movies - Cooking");
    assert!(v["rows"].as_array().unwrap().is_empty());
    let v = get_json("/api/top-movies?year=1800").await;
    assert!(v["rows"].as_array().unwrap().is_empty());
    let v = get_json("/api/rating-trend?genre=Cooking").await;
    assert!(v["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn trending_ignores_older_years() {
    let v = get_json("/api/trending").await;
    assert_eq!(v["title"], "Trending Now");
    assert_eq!(
        v["rows"],
        serde_json::json!([{ "title": "Coco (2017)", "rating_count": 5.0 }])
    );
}

#[tokio::test]
async fn rating_trend_per_year() {
    let v = get_json("/api/rating-trend").await;
    assert_eq!(
        v["rows"],
        serde_json::json!([
            { "year": 2013, "avg_rating": 4.0, "total_rating_count": 30.0 },
            { "year": 2015, "avg_rating": 4.0, "total_rating_count": 5.0 },
        ])
    );
    let v = get_json("/api/rating-trend?genre=Comedy&year=2013").await;
    assert_eq!(v["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn chart_endpoints_serve_svg() {
    if !viz::fonts_available(None) {
        eprintln!("skipping: no font found (set {})", viz::FONT_ENV);
        return;
    }
    for uri in [
        "/charts/top-movies.svg?year=2013",
        "/charts/trending.svg",
        "/charts/rating-trend.svg?genre=Sci-Fi",
    ] {
        let (status, content_type, body) = get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
        assert!(String::from_utf8(body).unwrap().contains("<svg"));
    }
}
