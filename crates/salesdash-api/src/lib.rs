//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::access: password gate
//! - routes::upload: CSV upload
//! - routes::dashboard: dashboard page, chart image and JSON API

pub mod chart;
pub mod error;
pub mod routes;
pub mod session;

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use chart::ChartStyle;
use salesdash_config::Config;
use salesdash_core::AccessGate;
use salesdash_parser::ParserRef;
use session::SessionStore;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
    pub parser: ParserRef,
    pub gate: Arc<AccessGate>,
    pub chart_style: Arc<ChartStyle>,
}

impl AppState {
    pub fn new(config: Config, parser: ParserRef) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new(config.server.max_sessions)),
            gate: Arc::new(AccessGate::new(config.auth.password.clone())),
            chart_style: Arc::new(ChartStyle::from_config(&config.charts)),
            config: Arc::new(config),
            parser,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::access::unlock;
    use routes::dashboard::{api_options, api_summary, chart_svg, page_dashboard};
    use routes::upload::upload_file;

    let upload_limit = state.config.upload.max_bytes;

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/options", get(api_options))
        .route("/api/summary", get(api_summary))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/chart.svg", get(chart_svg))
        // Form targets
        .route("/unlock", post(unlock))
        .route(
            "/upload",
            post(upload_file)
                .layer::<_, Infallible>(DefaultBodyLimit::disable())
                .layer::<_, Infallible>(RequestBodyLimitLayer::new(upload_limit)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        title, content
    )
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial.
/// Partials replace the inner HTML of `#app`.
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        inner_content.to_string()
    } else {
        base_html(
            title,
            &format!("<div id='app' class='flex min-h-screen'>{}</div>", inner_content),
        )
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
pub async fn start_server(config: Config, parser: ParserRef) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState::new(config, parser);
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting salesdash server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /chart.svg (Chart for the current selection)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use salesdash_parser::{ParserOptions, PipeCsvParser};
    use tower::ServiceExt;

    const PASSWORD: &str = "salesdata";
    const BOUNDARY: &str = "salesdash-test-boundary";
    const SAMPLE: &str = "transaction_date|transaction_location|total_delivered|total_returned\n\
                          2024-01-15|A|100|10\n\
                          2024-01-20|A|50|0\n\
                          2024-02-01|B|200|20\n";

    fn app_with(config: Config) -> Router {
        let parser: ParserRef = Arc::new(PipeCsvParser::new(ParserOptions::default()));
        create_router(AppState::new(config, parser))
    }

    fn app() -> Router {
        let mut config = Config::default();
        config.auth.password = PASSWORD.to_string();
        app_with(config)
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        let value = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        value.split(';').next().unwrap().to_string()
    }

    fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn unlock_request(cookie: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/unlock")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("password={}", password)))
            .unwrap()
    }

    fn upload_request(cookie: &str, file_name: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    /// Fresh session cookie, optionally unlocked
    async fn start_session(app: &Router, unlock: bool) -> String {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = session_cookie(&response);
        if unlock {
            let response = app.clone().oneshot(unlock_request(&cookie, PASSWORD)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }
        cookie
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_first_visit_is_locked() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie(&response).starts_with("salesdash_session="));
        let html = body_text(response).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Incorrect password! Access denied."));
        assert!(!html.contains("type='file'"));
    }

    #[tokio::test]
    async fn test_wrong_password_hides_upload() {
        let app = app();
        let cookie = start_session(&app, false).await;
        app.clone().oneshot(unlock_request(&cookie, "guess")).await.unwrap();

        let html = body_text(app.clone().oneshot(get("/", &cookie)).await.unwrap()).await;
        assert!(html.contains("Incorrect password! Access denied."));
        assert!(!html.contains("type='file'"));

        let response = app.oneshot(upload_request(&cookie, "sales.csv", SAMPLE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unlock_then_upload_and_summarize() {
        let app = app();
        let cookie = start_session(&app, true).await;

        let html = body_text(app.clone().oneshot(get("/", &cookie)).await.unwrap()).await;
        assert!(html.contains("Password accepted!"));
        assert!(html.contains("type='file'"));

        let response = app.clone().oneshot(upload_request(&cookie, "sales.csv", SAMPLE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app
            .clone()
            .oneshot(get("/api/summary?years=2024&locations=A&locations=B", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["total_billable"], "320");
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][0]["transaction_location"], "A");
        assert_eq!(json["rows"][0]["billable"], "140");
        assert_eq!(json["rows"][1]["billable"], "180");

        let response = app
            .oneshot(get("/api/options?years=2023", &cookie))
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["years"], serde_json::json!(["2024"]));
        assert_eq!(json["locations"], serde_json::json!(["A", "B"]));
        assert_eq!(json["months"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_summary_honors_explicit_months() {
        let app = app();
        let cookie = start_session(&app, true).await;
        app.clone().oneshot(upload_request(&cookie, "sales.csv", SAMPLE)).await.unwrap();

        let response = app
            .clone()
            .oneshot(get("/api/summary?years=2024&months=2024-01&locations=A&locations=B", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["total_billable"], "140");
        assert_eq!(json["selection"]["months"], serde_json::json!(["2024-01"]));
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0]["transaction_location"], "A");

        let response = app
            .oneshot(get("/chart.svg?years=2024&months=2024-02&locations=A&locations=B", &cookie))
            .await
            .unwrap();
        let svg = body_text(response).await;
        assert!(svg.contains("2024-02"));
        assert!(!svg.contains("2024-01"));
    }

    #[tokio::test]
    async fn test_htmx_partial_with_bar_chart() {
        let app = app();
        let cookie = start_session(&app, true).await;
        app.clone().oneshot(upload_request(&cookie, "sales.csv", SAMPLE)).await.unwrap();

        let request = Request::builder()
            .uri("/?years=2024&locations=A&locations=B&chart=bar")
            .header(header::COOKIE, &cookie)
            .header("hx-request", "true")
            .body(Body::empty())
            .unwrap();
        let html = body_text(app.clone().oneshot(request).await.unwrap()).await;
        assert!(!html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Total Billable Amount"));
        assert!(html.contains("320.00"));
        assert!(html.contains("Monthly Totals per Location"));
        assert!(html.contains("<svg"));
        assert!(html.contains("(Bar Chart)"));

        let response = app
            .oneshot(get("/chart.svg?years=2024&locations=A&chart=line", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert!(body_text(response).await.contains("(Line Chart)"));
    }

    #[tokio::test]
    async fn test_missing_date_column_shows_error_panel() {
        let app = app();
        let cookie = start_session(&app, true).await;
        let content = "transaction_location|total_delivered|total_returned\nA|100|10\n";
        let response = app.clone().oneshot(upload_request(&cookie, "bad.csv", content)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let html = body_text(app.clone().oneshot(get("/?years=2024&locations=A", &cookie)).await.unwrap()).await;
        assert!(html.contains("role='alert'"));
        assert!(html.contains("Missing required column: transaction_date"));
        assert!(!html.contains("<svg"));

        let response = app.oneshot(get("/api/summary", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_routes_require_unlock() {
        let app = app();
        let cookie = start_session(&app, false).await;
        let response = app.clone().oneshot(get("/api/options", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(Request::builder().uri("/api/summary").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let mut config = Config::default();
        config.auth.password = PASSWORD.to_string();
        config.upload.max_bytes = 64;
        let app = app_with(config);
        let cookie = start_session(&app, true).await;

        let response = app.oneshot(upload_request(&cookie, "sales.csv", SAMPLE)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
