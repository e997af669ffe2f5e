use axum::{http::header, response::IntoResponse};

const STYLESHEET: &str = include_str!("../../static/styles.css");

/// The site stylesheet, compiled into the binary.
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}
