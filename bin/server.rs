// Cash Checker - Web Server
// JSON API over the reconciliation engine, plus the single-page form

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use cash_checker::{
    format_with_separators, load_theme, normalize_digits, open_database, result_message,
    save_theme, ComparisonResult, Config, Ledger, Locale, ReconciliationEngine, Theme,
    DENOMINATIONS,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    default_locale: Locale,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Error returned by handlers, rendered in the same envelope
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        error!("{}", message);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            success: false,
            data: (),
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<cash_checker::Error> for ApiError {
    fn from(err: cash_checker::Error) -> Self {
        match err {
            cash_checker::Error::UnknownDenomination(_)
            | cash_checker::Error::DuplicateDenomination(_)
            | cash_checker::Error::InvalidTheme(_) => ApiError::bad_request(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Deserialize)]
struct CompareRequest {
    #[serde(default)]
    claimed_total: String,
    /// Denomination (as a string key) → count text. Keys naming the same
    /// value ("1000", "01000") are rejected.
    #[serde(default)]
    counts: HashMap<String, String>,
    locale: Option<Locale>,
}

#[derive(Serialize)]
struct CompareResponse {
    #[serde(flatten)]
    result: ComparisonResult,
    message: String,
}

#[derive(Serialize, Deserialize)]
struct ThemeBody {
    theme: String,
}

#[derive(Deserialize)]
struct FormatRequest {
    text: String,
}

#[derive(Serialize)]
struct FormatResponse {
    digits: String,
    formatted: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/denominations - Denominations in display order
async fn get_denominations() -> impl IntoResponse {
    Json(ApiResponse::ok(DENOMINATIONS.to_vec()))
}

/// POST /api/compare - Compare a claimed total against denomination counts
async fn compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<CompareResponse> {
    let mut counts = Vec::with_capacity(req.counts.len());
    for (key, count) in req.counts {
        let denomination: u64 = key
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request(format!("'{}' is not a denomination", key)))?;
        counts.push((denomination, count));
    }

    let ledger = Ledger::from_counts(counts)?;
    let result = ReconciliationEngine::new().compare_text(&req.claimed_total, &ledger);
    let message = result_message(&result, req.locale.unwrap_or(state.default_locale));

    info!(balanced = result.balanced, "{}", result.summary());

    Ok(Json(ApiResponse::ok(CompareResponse { result, message })))
}

/// POST /api/format - Normalize and group typed text
async fn format_text(Json(req): Json<FormatRequest>) -> impl IntoResponse {
    Json(ApiResponse::ok(FormatResponse {
        digits: normalize_digits(&req.text),
        formatted: format_with_separators(&req.text),
    }))
}

/// GET /api/theme - Stored theme preference
async fn get_theme(State(state): State<AppState>) -> ApiResult<ThemeBody> {
    let conn = state
        .db
        .lock()
        .map_err(|_| ApiError::internal("database lock poisoned"))?;
    let theme = load_theme(&conn)?;

    Ok(Json(ApiResponse::ok(ThemeBody {
        theme: theme.to_string(),
    })))
}

/// PUT /api/theme - Persist theme preference
async fn put_theme(
    State(state): State<AppState>,
    Json(body): Json<ThemeBody>,
) -> ApiResult<ThemeBody> {
    let theme: Theme = body.theme.parse()?;

    let conn = state
        .db
        .lock()
        .map_err(|_| ApiError::internal("database lock poisoned"))?;
    save_theme(&conn, theme)?;
    info!(theme = %theme, "theme saved");

    Ok(Json(ApiResponse::ok(ThemeBody {
        theme: theme.to_string(),
    })))
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/denominations", get(get_denominations))
        .route("/compare", post(compare))
        .route("/format", post(format_text))
        .route("/theme", get(get_theme).put(put_theme))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::from_env().context("Failed to read configuration")?;

    let conn = open_database(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;
    info!(path = %config.db_path.display(), "preference database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        default_locale: config.locale,
    };

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("server running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use cash_checker::setup_database;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        AppState {
            db: Arc::new(Mutex::new(conn)),
            default_locale: Locale::English,
        }
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_and_denominations() {
        let app = build_router(test_state());

        let (status, body) = send(app.clone(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");

        let (_, body) = send(app, Method::GET, "/api/denominations", None).await;
        assert_eq!(body["data"], json!([1000, 500, 200, 100, 50, 20]));
    }

    #[tokio::test]
    async fn test_compare_scenarios() {
        let app = build_router(test_state());

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/compare",
            Some(json!({ "claimed_total": "3,000", "counts": { "1000": "2", "500": "2" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["balanced"], true);
        assert_eq!(body["data"]["sign"], "equal");
        assert_eq!(body["data"]["message"], "No difference");

        let (_, body) = send(
            app.clone(),
            Method::POST,
            "/api/compare",
            Some(json!({ "claimed_total": "5000", "counts": { "1000": "3" }, "locale": "ar" })),
        )
        .await;
        assert_eq!(body["data"]["sign"], "over");
        assert_eq!(body["data"]["difference"], 2000);
        assert_eq!(body["data"]["message"], "لديك فارق بمقدار 2,000 جنيه");

        let (_, body) = send(app, Method::POST, "/api/compare", Some(json!({}))).await;
        assert_eq!(body["data"]["balanced"], true);
        assert_eq!(body["data"]["implied_total"], 0);
    }

    #[tokio::test]
    async fn test_compare_rejects_unknown_denomination() {
        let app = build_router(test_state());

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/compare",
            Some(json!({ "claimed_total": "10", "counts": { "10": "1" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unknown denomination: 10");

        let (status, _) = send(
            app,
            Method::POST,
            "/api/compare",
            Some(json!({ "counts": { "ten": "1" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compare_rejects_keys_naming_same_denomination() {
        // Both keys parse to 1000; neither may win by map order
        for _ in 0..20 {
            let app = build_router(test_state());

            let (status, body) = send(
                app,
                Method::POST,
                "/api/compare",
                Some(json!({ "claimed_total": "2000", "counts": { "1000": "2", "01000": "5" } })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Duplicate denomination: 1000");
        }
    }

    #[tokio::test]
    async fn test_index_served_without_static_route() {
        let app = build_router(test_state());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("claimed_total"));

        let response = app
            .oneshot(Request::builder().uri("/static/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_theme_round_trip() {
        let app = build_router(test_state());

        let (_, body) = send(app.clone(), Method::GET, "/api/theme", None).await;
        assert_eq!(body["data"]["theme"], "light");

        let (status, _) = send(
            app.clone(),
            Method::PUT,
            "/api/theme",
            Some(json!({ "theme": "dark" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(app.clone(), Method::GET, "/api/theme", None).await;
        assert_eq!(body["data"]["theme"], "dark");

        let (status, _) = send(app, Method::PUT, "/api/theme", Some(json!({ "theme": "blue" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_format() {
        let app = build_router(test_state());

        let (_, body) = send(app.clone(), Method::POST, "/api/format", Some(json!({ "text": "12a345" }))).await;
        assert_eq!(body["data"]["digits"], "12345");
        assert_eq!(body["data"]["formatted"], "12,345");

        // Already-grouped text comes back unchanged, so the page can compare
        // a reply against the current field value
        let (_, body) = send(app, Method::POST, "/api/format", Some(json!({ "text": "1,234" }))).await;
        assert_eq!(body["data"]["formatted"], "1,234");
    }
}
