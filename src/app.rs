use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::memory::{
    MemoryFieldTemplateRepository, MemoryProfileFieldRepository, MemoryTroveRepository,
    MemoryUserRepository, MemoryWeaponRepository,
};
use crate::database::repositories::{
    FieldTemplateRepository, PgFieldTemplateRepository, PgProfileFieldRepository,
    PgTroveRepository, PgUserRepository, PgWeaponRepository, ProfileFieldRepository,
    TroveRepository, UserRepository, WeaponRepository,
};
use crate::handlers;
use crate::middleware::optional_auth_middleware;
use crate::services::{
    FieldTemplateService, ProfileFieldService, TroveService, UserService, WeaponService,
};

/// Storage backends for every service
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub weapons: Arc<dyn WeaponRepository>,
    pub troves: Arc<dyn TroveRepository>,
    pub templates: Arc<dyn FieldTemplateRepository>,
    pub fields: Arc<dyn ProfileFieldRepository>,
}

impl Repositories {
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            weapons: Arc::new(PgWeaponRepository::new(pool.clone())),
            troves: Arc::new(PgTroveRepository::new(pool.clone())),
            templates: Arc::new(PgFieldTemplateRepository::new(pool.clone())),
            fields: Arc::new(PgProfileFieldRepository::new(pool.clone())),
        }
    }

    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            weapons: Arc::new(MemoryWeaponRepository::new()),
            troves: Arc::new(MemoryTroveRepository::new()),
            templates: Arc::new(MemoryFieldTemplateRepository::new()),
            fields: Arc::new(MemoryProfileFieldRepository::new()),
        }
    }
}

/// Shared handler state. Cloned per request; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub users: Arc<UserService>,
    pub weapons: Arc<WeaponService>,
    pub troves: Arc<TroveService>,
    pub templates: Arc<FieldTemplateService>,
    pub fields: Arc<ProfileFieldService>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: PgPool, repos: Repositories) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            users: Arc::new(UserService::new(repos.users)),
            weapons: Arc::new(WeaponService::new(repos.weapons)),
            troves: Arc::new(TroveService::new(repos.troves)),
            templates: Arc::new(FieldTemplateService::new(repos.templates, repos.fields.clone())),
            fields: Arc::new(ProfileFieldService::new(repos.fields)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .merge(user_routes())
        .merge(weapon_routes())
        .merge(trove_routes())
        .merge(field_template_routes())
        .merge(profile_field_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(&config.security));

    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::list))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/users/:id/profile-fields", get(users::profile_fields))
}

fn weapon_routes() -> Router<AppState> {
    use handlers::weapons;

    Router::new()
        .route("/weapons", get(weapons::list).post(weapons::create))
        .route(
            "/weapons/:id",
            get(weapons::get).put(weapons::update).delete(weapons::delete),
        )
}

fn trove_routes() -> Router<AppState> {
    use handlers::troves;

    Router::new()
        .route("/troves", get(troves::list).post(troves::create))
        .route(
            "/troves/:id",
            get(troves::get).put(troves::update).delete(troves::delete),
        )
}

fn field_template_routes() -> Router<AppState> {
    use handlers::field_templates as templates;

    Router::new()
        .route(
            "/profile/field-templates",
            get(templates::list).post(templates::create),
        )
        .route("/profile/field-templates/apply", post(templates::apply_batch))
        .route("/profile/field-templates/key/:key", get(templates::get_by_key))
        .route(
            "/profile/field-templates/category/:category",
            get(templates::by_category),
        )
        .route(
            "/profile/field-templates/:id",
            get(templates::get).put(templates::update).delete(templates::delete),
        )
        .route("/profile/field-templates/:id/apply", post(templates::apply))
}

fn profile_field_routes() -> Router<AppState> {
    use handlers::profile_fields;

    Router::new().route(
        "/profile/fields/:id",
        get(profile_fields::get).delete(profile_fields::delete),
    )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
