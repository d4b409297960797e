use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;

use taskdesk::auth::{service, AuthMiddleware};
use taskdesk::config::Config;
use taskdesk::routes::{self, health};
use taskdesk::{store, AppError, AppState};

fn to_io(err: AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;
    let store = store::from_config(&config).await.map_err(to_io)?;
    let state = AppState::from_config(store, &config);

    if let Some(admin) = &config.bootstrap_admin {
        if service::ensure_bootstrap_admin(&state, admin)
            .await
            .map_err(to_io)?
        {
            log::info!("bootstrap admin {} created", admin.email);
        }
    }

    let state = web::Data::new(state);
    log::info!("Starting TaskDesk server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
