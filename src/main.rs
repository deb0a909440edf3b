#[macro_use]
extern crate diesel;

mod admin;
mod appointments;
mod auth;
mod bookings;
mod config;
mod database;
mod error;
mod models;
mod notify;
mod protocol;
mod schema;
mod slots;
mod state;
mod store;
#[cfg(test)]
mod test_utils;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    config::Config,
    database::{build_pool, start_slot_lock_pruning, MysqlStore},
    notify::{LogMailer, Notifier},
    state::AppState,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let store = Arc::new(MysqlStore::new(build_pool(&config.database_url)?));

    if let Some(seed) = &config.admin {
        auth::utils::ensure_admin(store.as_ref(), seed)?;
    }

    start_slot_lock_pruning(store.clone());
    let notifier = Notifier::start(config.mail.clone(), Arc::new(LogMailer));
    let state = web::Data::new(AppState::new(
        config.schedule,
        store.clone(),
        store,
        notifier,
        config.session_ttl_secs,
    ));

    let allocator = state.bookings.allocator();
    info!(
        bays = allocator.capacity(),
        work_days = ?allocator.schedule().work_days(),
        "Time slots: {}",
        allocator.slot_labels().join(", ")
    );

    info!("Listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .configure(auth::config)
                    .configure(appointments::config)
                    .configure(admin::config),
            )
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}
