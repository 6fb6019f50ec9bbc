//! Spot The Fake Backend Server
//!
//! Accepts image uploads, scores them with the heuristic detector and keeps
//! a report history readable by an administrator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SPOT THE FAKE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Detector               │ │
//! │  │  (Axum)   │  │  (JWT)    │  │  rules ─▶ policy        │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │              ┌────────┴────────┐                           │
//! │              ▼                 ▼                           │
//! │       ┌─────────────┐   ┌─────────────┐                    │
//! │       │ PostgreSQL  │   │  uploads/   │                    │
//! │       └─────────────┘   └─────────────┘                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod analysis;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod store;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    services::ServeDir,
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::analysis::{Detector, DetectorConfig};
use crate::store::{AdminStore, PgAdminStore, PgReportStore, ReportStore};
use crate::uploads::UploadStore;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::Config::from_env();

    tracing::info!("Spot The Fake server starting...");
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));
    if config.is_production() && config.jwt_secret == config::Config::default().jwt_secret {
        tracing::warn!("JWT_SECRET is the development default");
    }

    // Detector: rules + policy, loaded once
    let detector_config = DetectorConfig::load(
        config.detector_config.as_deref(),
        config.detector_preset.as_deref(),
        config.verdict_policy.as_deref(),
    ).context("Failed to load detector configuration")?;
    let detector = Detector::from_config(detector_config);
    tracing::info!(
        ruleset_version = detector.ruleset_version(),
        rules = detector.engine().rules().len(),
        policy = detector.policy_id(),
        "Detector loaded"
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("Failed to run migrations")?;

    let admins: Arc<dyn AdminStore> = Arc::new(PgAdminStore::new(pool.clone()));
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        handlers::auth::bootstrap_admin(admins.as_ref(), email, password).await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap admin: {:?}", e))?;
    } else {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, no admin account bootstrapped");
    }

    let uploads = UploadStore::new(config.upload_dir.clone());
    uploads.ensure_dir().await
        .with_context(|| format!("Failed to create upload dir {}", uploads.dir().display()))?;

    // Build application state
    let state = AppState {
        config: config.clone(),
        detector: Arc::new(detector),
        reports: Arc::new(PgReportStore::new(pool)),
        admins,
        uploads,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging; `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "spot_the_fake=debug,tower_http=debug".into()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub detector: Arc<Detector>,
    pub reports: Arc<dyn ReportStore>,
    pub admins: Arc<dyn AdminStore>,
    pub uploads: UploadStore,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(handlers::health::index))
        .route("/health", get(handlers::health::check))
        .route("/api/upload", post(handlers::upload::upload))
        .route("/api/admin/login", post(handlers::auth::login));

    // Admin routes (admin JWT auth)
    let admin_routes = Router::new()
        .route("/api/reports", get(handlers::reports::list))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_admin_auth
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(state.uploads.dir()))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::analysis::{DetectorConfig, PolicyConfig};
    use crate::models::{CreateReport, Report, ReportFilter};
    use crate::store::memory::{MemoryAdminStore, MemoryReportStore};

    const BOUNDARY: &str = "----spotfake-test-boundary";
    const ADMIN_EMAIL: &str = "admin@example.com";
    const ADMIN_PASSWORD: &str = "correct horse";

    struct TestApp {
        state: AppState,
        reports: Arc<MemoryReportStore>,
        _dir: tempfile::TempDir,
    }

    async fn test_app_with(detector: Detector) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let config = config::Config {
            jwt_secret: "test-secret".to_string(),
            upload_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let reports = Arc::new(MemoryReportStore::default());
        let admins = Arc::new(MemoryAdminStore::default());
        handlers::auth::bootstrap_admin(admins.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        let state = AppState {
            uploads: UploadStore::new(config.upload_dir.clone()),
            config,
            detector: Arc::new(detector),
            reports: reports.clone(),
            admins,
        };
        TestApp { state, reports, _dir: dir }
    }

    async fn test_app() -> TestApp {
        test_app_with(Detector::default()).await
    }

    fn multipart_request(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                field, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::post("/api/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::post("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap()
    }

    async fn read_body(resp: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn admin_token(app: &TestApp) -> String {
        let resp = create_router(app.state.clone())
            .oneshot(login_request(ADMIN_EMAIL, ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        read_body(resp).await["token"].as_str().unwrap().to_string()
    }

    // ── Health ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn health_reports_detector() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["ruleset_version"], 4);
        assert_eq!(body["policy"], "tiered");
    }

    #[tokio::test]
    async fn index_returns_banner() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // ── POST /api/upload ────────────────────────────────────────────

    #[tokio::test]
    async fn upload_scores_and_persists() {
        let app = test_app().await;
        let data = vec![0u8; 100_000];
        let resp = create_router(app.state.clone())
            .oneshot(multipart_request("image", "img1.png", "image/png", &data))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = read_body(resp).await;
        assert_eq!(body["result"]["verdict"], "Likely AI-Generated Image");
        assert_eq!(body["result"]["confidence"], 70);
        assert_eq!(body["result"]["reasons"].as_array().unwrap().len(), 2);

        assert_eq!(app.reports.len(), 1);
        let report = &app.reports.all()[0];
        assert_eq!(report.id.to_string(), body["report_id"].as_str().unwrap());
        assert_eq!(report.image_name, "img1.png");
        assert_eq!(report.image_size, 100_000);
        assert_eq!(report.image_type, "image/png");
        assert!(report.image_path.ends_with(".png"));

        let stored = app.state.uploads.dir().join(&report.image_path);
        assert_eq!(tokio::fs::metadata(stored).await.unwrap().len(), 100_000);
    }

    #[tokio::test]
    async fn upload_large_jpeg_is_real() {
        let app = test_app().await;
        let data = vec![1u8; 500_000];
        let resp = create_router(app.state.clone())
            .oneshot(multipart_request("image", "vacation_photo.jpg", "image/jpeg", &data))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = read_body(resp).await;
        assert_eq!(body["result"]["verdict"], "Likely Real Image");
        assert_eq!(body["result"]["confidence"], 95);
        assert_eq!(body["result"]["reasons"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn upload_uses_configured_policy() {
        let app = test_app_with(Detector::from_config(DetectorConfig {
            policy: PolicyConfig::from_id("proportional").unwrap(),
            ..DetectorConfig::legacy()
        }))
        .await;
        let resp = create_router(app.state.clone())
            .oneshot(multipart_request("image", "a.webp", "image/webp", &[7u8; 50_000]))
            .await
            .unwrap();
        let body = read_body(resp).await;
        assert_eq!(body["result"]["verdict"], "AI-Generated Image");
        assert_eq!(body["result"]["confidence"], 100);
        assert_eq!(body["result"]["reasons"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upload_without_image_returns_400() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(multipart_request("avatar", "a.png", "image/png", b"x"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = read_body(resp).await;
        assert_eq!(body["error"], "No image uploaded");
        assert_eq!(app.reports.len(), 0);
    }

    struct UnavailableReportStore;

    #[axum::async_trait]
    impl ReportStore for UnavailableReportStore {
        async fn insert(&self, _data: CreateReport) -> AppResult<Report> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }

        async fn list_recent(&self, _filter: &ReportFilter) -> AppResult<Vec<Report>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn upload_removes_file_when_report_insert_fails() {
        let app = test_app().await;
        let state = AppState {
            reports: Arc::new(UnavailableReportStore),
            ..app.state.clone()
        };
        let resp = create_router(state)
            .oneshot(multipart_request("image", "img1.png", "image/png", &[0u8; 1_000]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let mut entries = tokio::fs::read_dir(app.state.uploads.dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    // ── POST /api/admin/login ───────────────────────────────────────

    #[tokio::test]
    async fn login_rejects_bad_password() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(login_request(ADMIN_EMAIL, "wrong"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(login_request("nobody@example.com", ADMIN_PASSWORD))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_requires_email_and_password() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(login_request(ADMIN_EMAIL, ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── GET /api/reports ────────────────────────────────────────────

    #[tokio::test]
    async fn reports_require_token() {
        let app = test_app().await;
        let resp = create_router(app.state.clone())
            .oneshot(Request::get("/api/reports").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = create_router(app.state.clone())
            .oneshot(
                Request::get("/api/reports")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reports_reject_non_admin_role() {
        let app = test_app().await;
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = handlers::auth::Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "viewer@example.com".to_string(),
            role: "viewer".to_string(),
            exp: now + 3600,
            iat: now,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let resp = create_router(app.state.clone())
            .oneshot(
                Request::get("/api/reports")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reports_newest_first_for_admin() {
        let app = test_app().await;
        for name in ["first_upload.jpg", "second.webp"] {
            let resp = create_router(app.state.clone())
                .oneshot(multipart_request("image", name, "image/jpeg", &[0u8; 10]))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let token = admin_token(&app).await;
        let resp = create_router(app.state.clone())
            .oneshot(
                Request::get("/api/reports")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = read_body(resp).await;
        let reports = body.as_array().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["imageName"], "second.webp");
        assert_eq!(reports[1]["imageName"], "first_upload.jpg");
        assert!(reports[0]["createdAt"].is_string());

        let resp = create_router(app.state.clone())
            .oneshot(
                Request::get("/api/reports?limit=1&offset=1")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = read_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["imageName"], "first_upload.jpg");
    }
}
