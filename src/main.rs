use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use staffdesk::database::connect_store;
use staffdesk::middleware::{
    RateLimitConfig, RateLimitMiddleware, RateLimitStore, RequestIdMiddleware, cleanup_rate_limits,
};
use staffdesk::{AppState, Config, routes};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Staffdesk API v1.0")
}

fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            "Authorization",
            "Content-Type",
            "Accept",
            "X-Requested-With",
            "X-Correlation-ID",
        ])
        .expose_headers(vec!["X-Correlation-ID"])
        .max_age(3600);

    if config.cors_origin == "*" {
        cors.allow_any_origin()
    } else {
        config
            .cors_origin
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    log::info!("Starting Staffdesk API server (environment: {})", config.environment);

    let store = connect_store(&config).await?;
    log::info!("Storage initialized ({:?})", config.storage);

    let app_state = web::Data::new(AppState::new(store, config.clone()));
    app_state.ensure_bootstrap_admin().await?;

    let rate_limit_config = RateLimitConfig::from_config(&config);
    let rate_limit_store = RateLimitStore::new();
    tokio::spawn(cleanup_rate_limits(
        rate_limit_store.clone(),
        rate_limit_config.window_seconds,
        300,
    ));

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(RateLimitMiddleware::with_store(
                rate_limit_config.clone(),
                rate_limit_store.clone(),
            ))
            .wrap(cors(&config))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .configure(routes::configure)
    })
    .bind(&server_address)?
    .run()
    .await?;

    Ok(())
}
