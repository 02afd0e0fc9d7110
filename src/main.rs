use checkout_service::config::AppConfig;
use checkout_service::{build_server, build_state, create_pool, run_migrations};
use dotenvy::dotenv;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    let state = build_state(pool, &config);

    log::info!(
        "Starting server at http://{}:{}",
        config.host,
        config.port
    );

    build_server(state, &config.host, config.port)?.await
}
