use actix_web::{middleware::Logger, App, HttpServer};
use marketplace::{configure, cors, open_store, AppState, Config};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    env_logger::init(); // Initialize the logger

    let store = open_store(&config)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let state = AppState::new(&config, store);

    let address = config.bind_address();
    let cors_origins = config.cors_origins.clone();
    log::info!("Server running on {}, CORS origins {:?}", address, cors_origins);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_origins))
            .wrap(Logger::default())
            .configure(configure(state.clone()))
    })
    .bind(address)?
    .run()
    .await
}
