//! main file for the server

mod controller;
mod database;
pub mod model;
mod payment;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod util;

use crate::server::database::pool::Pool;
use crate::server::database::pool_config::PoolConfig;
use crate::server::database::postgres::PgStore;
use crate::server::model::config::ServerConfig;
use crate::server::payment::stripe::StripeClient;
use crate::server::state::AppState;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;

/// Run the server
pub async fn run(
    ServerConfig {
        addr,
        db_read_conn_str,
        db_write_conn_str,
        pool_size,
        payment,
    }: ServerConfig,
) -> anyhow::Result<()> {
    let read_pool = Pool::new("read");
    read_pool
        .init(&PoolConfig::new(db_read_conn_str, pool_size))
        .await?;
    let write_pool = Pool::new("write");
    write_pool
        .init(&PoolConfig::new(db_write_conn_str, pool_size))
        .await?;

    let payments = StripeClient::new(&payment).context("failed to build payment client")?;
    let data = web::Data::new(AppState::new(
        PgStore::new(read_pool, write_pool),
        payments,
        payment,
    ));

    info!("listening on {}", addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(routes::configure::<PgStore, StripeClient>)
    })
    .bind(addr)?
    .run()
    .await?;
    Ok(())
}
