#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP surface for the lake name resolver.
//!
//! Serves a single resolve endpoint backed by [`lake_resolver::ResolverFacade`].
//! The gazetteer and override table are loaded eagerly at startup so a bad
//! dataset fails the process before it ever binds a socket, rather than on
//! the first request.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use lake_resolver::{ResolverConfigExt, ResolverFacade};
use lake_resolver_models::ResolverConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ResolverConfig::from_env();
    let facade = ResolverFacade::new(config);

    log::info!("Loading gazetteer dataset...");
    facade.warm().expect("Failed to load gazetteer dataset");

    let state = web::Data::new(facade);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/resolve", web::get().to(handlers::resolve)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
