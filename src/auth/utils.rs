use crate::{
    config::AdminSeed,
    error::ApiError,
    models::{
        appointments::Appointment,
        users::{NewUser, Role, UserData},
    },
    state::AppState,
    store::AccountStore,
    utils::{block, normalize_email},
};
use actix_web::{http::header, web, HttpMessage, HttpRequest};
use blake2::{Blake2b, Digest};
use chrono::Utc;

pub const AUTH_COOKIE: &str = "auth-token";

/// The signed-in caller.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionUser {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl SessionUser {
    pub fn can_manage_appointments(&self) -> bool {
        self.role.can_manage_appointments()
    }

    /// Clients reach appointments linked to their account or booked with their email.
    pub fn can_access(&self, appointment: &Appointment) -> bool {
        self.can_manage_appointments()
            || appointment.user_id == Some(self.id)
            || appointment.email.eq_ignore_ascii_case(&self.email)
    }
}

impl From<UserData> for SessionUser {
    fn from(data: UserData) -> Self {
        Self {
            role: data.role(),
            id: data.id,
            email: data.email,
            name: data.name,
        }
    }
}

pub fn hash_password(password: &str) -> String {
    format!("{:x}", Blake2b::digest(password.as_bytes()))
}

pub fn generate_login_token(user_id: u64, role: Role) -> String {
    let nonce: [u8; 32] = rand::random();
    let mut hasher = Blake2b::new();
    hasher.update(user_id.to_be_bytes());
    hasher.update(role.as_str().as_bytes());
    hasher.update(Utc::now().to_rfc3339().as_bytes());
    hasher.update(nonce);
    format!("{:x}", hasher.finalize())
}

pub fn session_cookie(token: &str, ttl_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE, token, ttl_secs
    )
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", AUTH_COOKIE)
}

/// Cookie first, then `Authorization: Bearer`.
pub fn token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub async fn get_user_from_token(
    token: String,
    state: &web::Data<AppState>,
) -> Result<SessionUser, ApiError> {
    let accounts = state.accounts.clone();
    let max_login_time_secs = state.session_ttl_secs;

    block(move || {
        let data = match accounts.find_session(&token)? {
            Some(data) => data,
            None => return Err(ApiError::Unauthenticated("Not signed in".to_string())),
        };

        let time_diff = Utc::now()
            .naive_utc()
            .signed_duration_since(data.login_time);
        if time_diff.num_seconds() > max_login_time_secs {
            return Err(ApiError::Unauthenticated("Session has expired".to_string()));
        }

        accounts
            .find_user(data.user_id)?
            .map(SessionUser::from)
            .ok_or_else(|| ApiError::Unauthenticated("Not signed in".to_string()))
    })
    .await
}

pub async fn session_user(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<SessionUser, ApiError> {
    match token_from_request(req) {
        Some(token) => get_user_from_token(token, state).await,
        None => Err(ApiError::Unauthenticated("Not signed in".to_string())),
    }
}

/// Guests are allowed; a stale or unknown token counts as a guest.
pub async fn optional_session_user(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Option<SessionUser>, ApiError> {
    match session_user(state, req).await {
        Ok(user) => Ok(Some(user)),
        Err(ApiError::Unauthenticated(reason)) => {
            tracing::debug!(%reason, "continuing as guest");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

pub async fn staff_user(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<SessionUser, ApiError> {
    let user = session_user(state, req).await?;
    if !user.can_manage_appointments() {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}

/// Creates the configured admin account unless the email is already registered.
pub fn ensure_admin(accounts: &dyn AccountStore, seed: &AdminSeed) -> anyhow::Result<()> {
    let email = normalize_email(&seed.email);
    if let Some(user) = accounts.find_user_by_email(&email)? {
        tracing::info!(email = %user.email, role = %user.role, "admin account already exists");
        return Ok(());
    }

    let data = NewUser {
        email,
        password: hash_password(&seed.password),
        name: seed.name.clone(),
        role: Role::Admin.to_string(),
    };
    if let Some(user) = accounts.insert_user(data)? {
        tracing::info!(id = user.id, email = %user.email, "admin account created");
    }
    Ok(())
}
