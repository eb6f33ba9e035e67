use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::auth::{CookieSettings, GoogleOAuth};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{enforce_rate_limit, require_auth, RateGuard, RateLimiter, RateLimits};
use crate::search::SearchBackend;
use crate::services::{ConsoleService, DataSourceService, QueryService, SessionService, UserService};

/// Shared handler state. Services are cheap wrappers around the pool and
/// are built per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub search: Arc<dyn SearchBackend>,
    pub limiter: RateLimiter,
    pub config: Arc<AppConfig>,
    /// Present only when Google sign-in is configured
    pub google: Option<GoogleOAuth>,
}

impl AppState {
    pub fn new(pool: PgPool, search: Arc<dyn SearchBackend>, config: AppConfig) -> Self {
        let limiter = RateLimiter::new(
            Duration::from_secs(config.rate_limit.window_secs),
            config.rate_limit.max_keys,
        );
        Self {
            pool,
            search,
            limiter,
            config: Arc::new(config),
            google: None,
        }
    }

    pub fn with_google(mut self, google: GoogleOAuth) -> Self {
        self.google = Some(google);
        self
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone())
    }

    pub fn sessions(&self) -> SessionService {
        SessionService::new(self.pool.clone(), self.cookies().max_age_secs)
    }

    pub fn data_sources(&self) -> DataSourceService {
        DataSourceService::new(self.pool.clone())
    }

    pub fn consoles(&self) -> ConsoleService {
        ConsoleService::new(self.pool.clone())
    }

    pub fn queries(&self) -> QueryService {
        QueryService::new(self.pool.clone(), self.search.clone(), self.config.search.max_hits)
    }

    pub fn cookies(&self) -> CookieSettings {
        CookieSettings::from_config(&self.config.session)
    }
}

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut app = Router::new()
        .route("/", get(public::root::root_get))
        .route("/health", get(public::root::health_get))
        .merge(auth_public_routes(&state))
        .merge(auth_routes(&state))
        .merge(user_routes(&state))
        .merge(data_source_routes(&state))
        .merge(console_routes(&state));

    app = if config.web.enabled {
        let index_file = format!("{}/index.html", config.web.static_dir);
        app.fallback_service(ServeDir::new(&config.web.static_dir).fallback(ServeFile::new(index_file)))
    } else {
        app.fallback(|| async { ApiError::not_found("Resource not found") })
    };

    // Covers the fallback too, so it is a layer rather than a route layer
    if config.rate_limit.enabled {
        let guard = RateGuard::new(state.limiter.clone(), "root", RateLimits::root());
        app = app.layer(middleware::from_fn_with_state(guard, enforce_rate_limit));
    }

    // Global middleware
    app = app
        .layer(DefaultBodyLimit::max(config.security.max_request_size_bytes))
        .layer(RequestBodyLimitLayer::new(config.security.max_request_size_bytes))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("same-origin"),
        ));

    if let Some(cors) = cors_layer(&config) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn auth_public_routes(state: &AppState) -> Router<AppState> {
    use public::auth;

    let mut router = Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/check", get(auth::check_get))
        .route("/auth/logout", post(auth::logout_post));

    if state.google.is_some() {
        router = router.route("/auth/google", get(auth::google_get));
    }

    rate_limited(router, state, "auth", RateLimits::auth())
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use protected::auth;

    let router = Router::new().route("/auth/me", get(auth::me_get));

    authenticated(rate_limited(router, state, "auth", RateLimits::auth()), state)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use protected::user;

    let router = Router::new().route("/user", put(user::user_put));

    authenticated(rate_limited(router, state, "user", RateLimits::standard()), state)
}

fn data_source_routes(state: &AppState) -> Router<AppState> {
    use protected::{console, data_source};

    // Path params share names across routes so the matcher accepts them
    let router = Router::new()
        .route(
            "/data-source",
            get(data_source::data_source_list).post(data_source::data_source_post),
        )
        .route(
            "/data-source/:id",
            get(data_source::data_source_get)
                .put(data_source::data_source_put)
                .delete(data_source::data_source_delete),
        )
        .route(
            "/data-source/:id/console",
            get(console::console_list_for_data_source).post(console::console_post),
        )
        .route(
            "/data-source/:id/console/:console_id",
            get(console::console_get)
                .put(console::console_put)
                .delete(console::console_delete),
        )
        .route(
            "/data-source/:id/console/:console_id/execute",
            post(console::console_execute),
        );

    authenticated(rate_limited(router, state, "data-source", RateLimits::standard()), state)
}

fn console_routes(state: &AppState) -> Router<AppState> {
    use protected::console;

    let router = Router::new()
        .route("/console", get(console::console_list))
        .route("/console/:id", get(console::console_get_by_id))
        .route("/console/data-source/:id", get(console::console_list_for_data_source));

    authenticated(rate_limited(router, state, "console", RateLimits::standard()), state)
}

fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
}

/// Scope limit for a route group. Wrapped by `authenticated` it counts per
/// verified user, otherwise per client address.
fn rate_limited(
    router: Router<AppState>,
    state: &AppState,
    scope: &'static str,
    limits: RateLimits,
) -> Router<AppState> {
    if !state.config.rate_limit.enabled {
        return router;
    }
    let guard = RateGuard::new(state.limiter.clone(), scope, limits);
    router.route_layer(middleware::from_fn_with_state(guard, enforce_rate_limit))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| {
            let parsed = origin.parse();
            if parsed.is_err() {
                tracing::warn!("Invalid CORS origin ignored: {}", origin);
            }
            parsed.ok()
        })
        .collect();

    if origins.is_empty() {
        // same-origin only
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT, HeaderName::from_static("x-requested-with")]),
    )
}
