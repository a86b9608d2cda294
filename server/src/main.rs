use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use server::config::{AllowedOrigins, ServerConfig};
use server::connection::ConnectionIdSource;
use server::handlers;
use server::server::spawn_server;

fn cors(allowed_origins: &AllowedOrigins) -> Cors {
    let cors = match allowed_origins {
        AllowedOrigins::Any => Cors::default().allow_any_origin(),
        AllowedOrigins::List(origins) => origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials(),
    };
    cors.allowed_methods(vec!["GET", "POST"]).allow_any_header()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    log::info!("Allowed origins: {:?}", config.allowed_origins);

    let srv_tx = web::Data::new(spawn_server());
    let ids = web::Data::new(ConnectionIdSource::new());
    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);

    log::info!("Whiteboard server listening on {}", bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config.allowed_origins))
            .wrap(Logger::default())
            .app_data(srv_tx.clone())
            .app_data(ids.clone())
            .app_data(config.clone())
            .configure(handlers::root)
    })
    .bind(bind_addr.as_str())?
    .run()
    .await
}
