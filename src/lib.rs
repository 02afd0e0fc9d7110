pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use jsonwebtoken::DecodingKey;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use application::payment_service::PaymentService;
use config::AppConfig;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::product_repo::DieselProductCatalog;
use infrastructure::yookassa::YooKassaClient;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Everything the handlers need, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub payments: PaymentService,
    pub jwt_decoding_key: DecodingKey,
}

/// Wire the production adapters into the services.
pub fn build_state(pool: DbPool, config: &AppConfig) -> AppState {
    let repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let catalog = Arc::new(DieselProductCatalog::new(pool));
    let gateway = Arc::new(YooKassaClient::new(config.payment.clone()));

    AppState {
        orders: OrderService::new(
            repo.clone(),
            catalog,
            config.payment.default_currency.clone(),
        ),
        payments: PaymentService::new(repo, gateway, config.payment.frontend_url.clone()),
        jwt_decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
    }
}

/// API routes. Literal segments are registered before `{id}` so that
/// `/my-orders` and `/admin/all` are not swallowed by the id matcher.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/my-orders", web::get().to(handlers::orders::my_orders))
                    .route("/admin/all", web::get().to(handlers::orders::admin_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}/status", web::patch().to(handlers::orders::update_status)),
            )
            .service(
                web::scope("/payments")
                    .route("/create", web::post().to(handlers::payments::create_payment))
                    .route(
                        "/status/{order_id}",
                        web::get().to(handlers::payments::payment_status),
                    )
                    .route("/webhook", web::post().to(handlers::payments::webhook)),
            ),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .configure(configure_api)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
