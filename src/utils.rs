use crate::error::ApiError;
use actix_web::{error::BlockingError, web};
use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

#[macro_export]
macro_rules! api_funcs {
    ( $( ( $method:ident, $func_name:ident, $url:expr, $status:ident $(, $arg:ident : $arg_ty:ty )* $(,)? ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[$method($url)]
                async fn $func_name(
                    state: web::Data<AppState>,
                    req: HttpRequest,
                    $( $arg: $arg_ty, )*
                ) -> Result<HttpResponse, ApiError> {
                    let response = [<$func_name _impl>](state, req, $( $arg ),*).await?;
                    Ok(HttpResponse::$status().json(response))
                }
            }
        )+
    };
}

/// Runs blocking store calls on the actix thread pool.
pub async fn block<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f).await.map_err(|err| match err {
        BlockingError::Error(err) => err,
        BlockingError::Canceled => ApiError::Storage(anyhow!("Blocking task canceled")),
    })
}

/// Offsets are kept as written: the calendar day is the one the client sent.
pub fn parse_time_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDateTime> {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";
    const TIME_FMT_SPECIAL: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
    const TIME_FMT_NAIVE: &str = "%Y-%m-%dT%H:%M:%S%.f";

    let s = s.as_ref();
    if let Some('Z') = s.chars().last() {
        NaiveDateTime::parse_from_str(s, TIME_FMT_SPECIAL).context("Invalid time")
    } else if let Ok(t) = DateTime::parse_from_str(s, TIME_FMT) {
        Ok(t.naive_local())
    } else {
        NaiveDateTime::parse_from_str(s, TIME_FMT_NAIVE).context("Invalid time")
    }
}

/// Accepts a plain `YYYY-MM-DD` or a full timestamp; only the calendar day is kept.
pub fn parse_day_str<S: AsRef<str>>(s: S) -> anyhow::Result<NaiveDate> {
    let s = s.as_ref().trim();
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(_) => parse_time_str(s).map(|t| t.date()).context("Invalid date"),
    }
}

/// Appointment dates are stored as the midnight of their day.
pub fn day_start(day: NaiveDate) -> NaiveDateTime {
    day.and_hms(0, 0, 0)
}

/// `[start, end)` of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (day_start(day), day_start(day.succ()))
}

pub fn format_time_str(time: &NaiveDateTime) -> String {
    const TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    format!("{}+00:00", time.format(TIME_FMT))
}

/// Emails are stored and compared in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
        .is_match(email)
}
