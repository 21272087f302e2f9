mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::app_error::AppError;

use crate::config::{CorsConfig, under};
use crate::db::stage_db;
use crate::middleware::{REQUEST_ID_HEADER, RequestLogger};
use crate::routes as app_routes;
use crate::service::locks::PartitionLocks;
use rocket::{Build, Rocket, Route, catchers, http::Method};
use rocket_cors::{AllowedHeaders, AllowedOrigins, Cors, CorsOptions};
use rocket_okapi::okapi::merge::marge_spec_list;
use rocket_okapi::okapi::openapi3::OpenApi;
use rocket_okapi::settings::OpenApiSettings;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::get_openapi_route;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG wins over the configured level, e.g.
    //   RUST_LOG=timetable::service=debug  - conflict lookups
    //   RUST_LOG=info,sqlx=warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A global subscriber may already be installed when several rockets are built in one process.
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn cors_fairing(cors: &CorsConfig) -> Result<Cors, AppError> {
    cors.validate()?;

    let allowed_origins = if cors.is_wildcard() {
        AllowedOrigins::all()
    } else {
        let origins: Vec<&str> = cors.allowed_origins.iter().map(String::as_str).collect();
        AllowedOrigins::some_exact(&origins)
    };

    let methods = [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options, Method::Head];

    CorsOptions {
        allowed_origins,
        allowed_methods: methods.into_iter().map(From::from).collect(),
        allowed_headers: AllowedHeaders::some(&["Content-Type", "Accept", REQUEST_ID_HEADER]),
        expose_headers: [REQUEST_ID_HEADER.to_string()].into(),
        allow_credentials: cors.allow_credentials,
        ..Default::default()
    }
    .to_cors()
    .map_err(|e| AppError::InvalidConfiguration(format!("CORS: {e}")))
}

/// One group of handlers mounted under `<mount point><prefix>`.
struct ApiSection {
    prefix: &'static str,
    routes: Vec<Route>,
    openapi: OpenApi,
}

impl ApiSection {
    fn new(prefix: &'static str, (routes, openapi): (Vec<Route>, OpenApi)) -> Self {
        Self { prefix, routes, openapi }
    }
}

fn api_sections() -> Vec<ApiSection> {
    vec![
        ApiSection::new("/timetable", app_routes::timetable::routes()),
        ApiSection::new("/rooms", app_routes::room::routes()),
        ApiSection::new("/health", app_routes::health::routes()),
    ]
}

fn mount_api(mut rocket: Rocket<Build>, mount_point: &str, enable_swagger: bool) -> Result<Rocket<Build>, AppError> {
    let mut documents = Vec::new();
    for section in api_sections() {
        rocket = rocket.mount(under(mount_point, section.prefix), section.routes);
        documents.push((section.prefix, section.openapi));
    }

    if enable_swagger {
        let merged = marge_spec_list(&documents).map_err(|e| AppError::InvalidConfiguration(format!("OpenAPI merge: {e}")))?;
        let swagger = SwaggerUIConfig {
            url: under(mount_point, "openapi.json"),
            ..Default::default()
        };
        rocket = rocket
            .mount(mount_point, vec![get_openapi_route(merged, &OpenApiSettings::default())])
            .mount(under(mount_point, "docs"), make_swagger_ui(&swagger));
    }

    Ok(rocket.register(
        mount_point,
        catchers![
            app_routes::error::bad_request,
            app_routes::error::not_found,
            app_routes::error::conflict,
            app_routes::error::unprocessable_entity,
            app_routes::error::internal_error
        ],
    ))
}

/// Assembles the service: fairings, managed state and every API mount point.
/// The database pool is attached lazily on ignite.
pub fn build_rocket(config: Config) -> Result<Rocket<Build>, AppError> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let mut rocket = rocket::custom(figment)
        .attach(cors_fairing(&config.cors)?)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .manage(PartitionLocks::new());

    for mount_point in config.api.mount_points() {
        info!(mount_point = %mount_point, swagger = config.api.enable_swagger, "mounting api");
        rocket = mount_api(rocket, &mount_point, config.api.enable_swagger)?;
    }

    Ok(rocket)
}
