use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Authentication core: token codec, authenticator, role gate.
pub mod auth;
pub mod token;
pub mod error;

// HTTP surface and its collaborators.
pub mod config;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;

// Route groups by access level (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{Authenticator, CurrentUser, RoleGate};
pub use config::AppConfig;
pub use error::{AuthError, StoreError};
pub use models::{Identity, Role};
pub use repository::{
    CredentialStore, CredentialStoreState, InMemoryCredentialStore, PostgresCredentialStore,
};
pub use token::TokenCodec;

/// ApiDoc
///
/// OpenAPI document for the authentication endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::verify_token, handlers::change_password,
        handlers::get_me, handlers::get_user
    ),
    components(
        schemas(
            models::Identity, models::LoginRequest, models::VerifyTokenRequest,
            models::ChangePasswordRequest,
        )
    ),
    tags(
        (name = "film-manager", description = "Film Manager authentication API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, immutable container for everything a request may need. Holds no per-request
/// or per-session data: any instance built from the same `jwt_secret` accepts tokens
/// issued by any other.
#[derive(Clone)]
pub struct AppState {
    /// Credential store used for login, password changes and user lookups.
    pub repo: CredentialStoreState,
    /// Authenticator wired to `repo` and a codec keyed by `config.jwt_secret`.
    pub auth: Authenticator,
    pub config: AppConfig,
}

impl AppState {
    /// Builds the token codec from the configured secret and wires the authenticator.
    pub fn new(repo: CredentialStoreState, config: AppConfig) -> Self {
        let codec = TokenCodec::new(&config.jwt_secret);
        let auth = Authenticator::new(repo.clone(), codec);
        Self { repo, auth, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for CredentialStoreState {
    fn from_ref(app_state: &AppState) -> CredentialStoreState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for Authenticator {
    fn from_ref(app_state: &AppState) -> Authenticator {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the route groups under `/api`, layers a `RoleGate` on each protected group,
/// and wraps everything in `with_http_layers`.
pub fn create_router(state: AppState) -> Router {
    let any_user = RoleGate::any_authenticated(state.auth.clone());
    let admin_only = RoleGate::new(state.auth.clone(), [Role::Admin]);

    let api = Router::new()
        // Public: no gate. Login must be reachable without a token.
        .merge(public::public_routes())
        // Authenticated: empty role requirement, any valid token.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(any_user, auth::require_roles)),
        )
        // Admin: requires ADMIN.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(admin_only, auth::require_roles)),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .route(HEALTH_PATH, get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    with_http_layers(base_router)
}

/// with_http_layers
///
/// Request id, tracing, panic recovery and CORS. A panicking handler is answered with
/// 500 and the connection stays usable.
pub fn with_http_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(CatchPanicLayer::new()),
        )
        .layer(cors)
}

const HEALTH_PATH: &str = "/health";
const SWAGGER_UI_PATH: &str = "/swagger-ui";
const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// route_table
///
/// Every `(method, path)` the router serves: the documented API from `ApiDoc`, followed
/// by the health check and the Swagger endpoints.
pub fn route_table() -> Vec<(&'static str, String)> {
    let doc = ApiDoc::openapi();
    let mut routes = Vec::new();
    for (path, item) in &doc.paths.paths {
        let methods = [
            ("GET", item.get.is_some()),
            ("POST", item.post.is_some()),
            ("PUT", item.put.is_some()),
            ("DELETE", item.delete.is_some()),
        ];
        for (method, _) in methods.into_iter().filter(|(_, present)| *present) {
            routes.push((method, path.clone()));
        }
    }

    routes.push(("GET", HEALTH_PATH.to_string()));
    routes.push(("GET", format!("{}/*", SWAGGER_UI_PATH)));
    routes.push(("GET", OPENAPI_JSON_PATH.to_string()));
    routes
}

/// log_routes
///
/// Logs every registered route once at startup.
pub fn log_routes() {
    for (method, path) in route_table() {
        tracing::info!("{} {}", method, path);
    }
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: every log line for a request carries its method, URI
/// and `x-request-id`. The `Authorization` header is never recorded.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
