//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{auth, generate, health, users};
use crate::core::CoreApp;
use crate::core::constants::{AUTH_BODY_LIMIT, DEFAULT_BODY_LIMIT};
use crate::data::{SqliteService, UserRepository};
use crate::domain::GenerationService;

/// Everything the router needs from the application
#[derive(Clone)]
pub struct RouterParts {
    pub database: Arc<SqliteService>,
    pub auth_manager: Arc<AuthManager>,
    pub allowed_origins: AllowedOrigins,
    pub generation: GenerationService,
}

/// Build the full API router
pub fn build_router(parts: RouterParts) -> Router {
    let RouterParts {
        database,
        auth_manager,
        allowed_origins,
        generation,
    } = parts;

    let users_repo: Arc<dyn UserRepository> = Arc::new(database.clone());

    let auth_state = AuthState {
        auth_manager: auth_manager.clone(),
        allowed_origins: allowed_origins.clone(),
        users: users_repo.clone(),
    };

    let health_routes = Router::new()
        .route("/", get(health::health))
        .with_state(health::HealthState {
            database,
            generation_enabled: generation.is_enabled(),
        });

    let auth_routes = auth::routes(
        auth_manager,
        allowed_origins.clone(),
        users_repo.clone(),
    )
    .layer(DefaultBodyLimit::max(AUTH_BODY_LIMIT));

    let users_routes = users::routes(users_repo).layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        require_auth,
    ));

    let generate_routes = generate::routes(generation).layer(
        axum::middleware::from_fn_with_state(auth_state, require_auth),
    );

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/api/docs") }))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api/v1/health", health_routes)
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/users", users_routes)
        .nest("/api/v1/generate", generate_routes)
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(&allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered. Returns CoreApp for graceful shutdown.
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(RouterParts {
            database: app.database.clone(),
            auth_manager: app.auth.clone(),
            allowed_origins,
            generation: app.generation.clone(),
        });

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "API server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
