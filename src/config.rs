use crate::{
    notify::MailSettings,
    slots::{schedule::parse_work_days, GarageSchedule},
};
use anyhow::Context;
use std::{env, fmt::Display, str::FromStr};
use tracing::info;

pub struct Config {
    pub database_url: String,
    pub bind: String,
    pub session_ttl_secs: i64,
    pub schedule: GarageSchedule,
    pub mail: MailSettings,
    /// Staff account created at startup when missing.
    pub admin: Option<AdminSeed>,
}

pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not found")?;

        let defaults = GarageSchedule::default();
        let work_days = match env::var("GARAGE_WORK_DAYS") {
            Ok(days) => parse_work_days(&days).context("Invalid GARAGE_WORK_DAYS")?,
            Err(_) => defaults.work_days().to_vec(),
        };
        let schedule = GarageSchedule::new(
            try_load("GARAGE_OPENING_HOUR", defaults.opening_hour())?,
            try_load("GARAGE_CLOSING_HOUR", defaults.closing_hour())?,
            try_load("GARAGE_SLOT_MINUTES", defaults.slot_minutes())?,
            try_load("GARAGE_BAYS", defaults.bays())?,
            work_days,
        )
        .context("Invalid garage schedule")?;

        let admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                email,
                password,
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind: try_load("BIND_ADDR", "127.0.0.1:8080".to_string())?,
            session_ttl_secs: try_load("SESSION_TTL_SECS", 24 * 3600)?,
            schedule,
            mail: MailSettings {
                from: env::var("MAIL_FROM").ok(),
                shop_name: try_load("SHOP_NAME", "PneuExpress".to_string())?,
                app_url: try_load("APP_URL", "http://localhost:3000".to_string())?,
            },
            admin,
        })
    }
}

fn try_load<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid {} value '{}'", key, value)),
        Err(_) => {
            info!("{} not set, using default: {}", key, default);
            Ok(default)
        }
    }
}
