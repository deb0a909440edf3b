mod requests;
mod responses;
pub mod utils;

use crate::{
    error::ApiError,
    models::{
        user_logins::UserLoginData,
        users::{NewUser, Role},
    },
    protocol::SimpleResponse,
    state::AppState,
    utils::{block, is_valid_email, normalize_email},
};
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use chrono::Utc;

use self::{
    requests::*,
    responses::*,
    utils::{
        expired_session_cookie, generate_login_token, hash_password, session_cookie,
        session_user, token_from_request, SessionUser,
    },
};

const MIN_PASSWORD_LEN: usize = 6;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me);
}

crate::api_funcs! {
    (get, me, "/auth/me", Ok),
}

#[post("/auth/register")]
async fn register(
    state: web::Data<AppState>,
    info: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let ttl = state.session_ttl_secs;
    let response = register_impl(state, info).await?;
    Ok(HttpResponse::Created()
        .header(header::SET_COOKIE, session_cookie(&response.login_token, ttl))
        .json(response))
}

#[post("/auth/login")]
async fn login(
    state: web::Data<AppState>,
    info: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let ttl = state.session_ttl_secs;
    let response = login_impl(state, info).await?;
    Ok(HttpResponse::Ok()
        .header(header::SET_COOKIE, session_cookie(&response.login_token, ttl))
        .json(response))
}

#[post("/auth/logout")]
async fn logout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    if let Some(token) = token_from_request(&req) {
        let accounts = state.accounts.clone();
        block(move || Ok(accounts.delete_session(&token)?)).await?;
    }
    Ok(HttpResponse::Ok()
        .header(header::SET_COOKIE, expired_session_cookie())
        .json(SimpleResponse::ok()))
}

async fn start_session(
    state: &web::Data<AppState>,
    user: SessionUser,
) -> Result<LoginResponse, ApiError> {
    let login_token = generate_login_token(user.id, user.role);
    let token_data = UserLoginData {
        token: login_token.clone(),
        user_id: user.id,
        login_time: Utc::now().naive_utc(),
    };
    let accounts = state.accounts.clone();
    block(move || Ok(accounts.insert_session(token_data)?)).await?;

    tracing::info!(user_id = user.id, role = %user.role, "signed in");
    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
        user: UserItem::from(&user),
    })
}

async fn register_impl(
    state: web::Data<AppState>,
    info: web::Json<RegisterRequest>,
) -> Result<LoginResponse, ApiError> {
    let info = info.into_inner();
    let name = info.name.trim().to_string();
    let email = normalize_email(&info.email);
    if name.is_empty() || email.is_empty() || info.password.is_empty() {
        return Err(ApiError::validation("Name, email and password are required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    if info.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let data = NewUser {
        email,
        password: hash_password(&info.password),
        name,
        role: Role::Client.to_string(),
    };
    let accounts = state.accounts.clone();
    let user = block(move || {
        accounts
            .insert_user(data)?
            .ok_or_else(|| ApiError::Conflict("An account already exists with this email".to_string()))
    })
    .await?;

    tracing::info!(user_id = user.id, "client registered");
    start_session(&state, SessionUser::from(user)).await
}

async fn login_impl(
    state: web::Data<AppState>,
    info: web::Json<LoginRequest>,
) -> Result<LoginResponse, ApiError> {
    let info = info.into_inner();
    if info.email.trim().is_empty() || info.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let accounts = state.accounts.clone();
    let email = normalize_email(&info.email);
    let user = block(move || Ok(accounts.find_user_by_email(&email)?)).await?;

    let hashed_password = hash_password(&info.password);
    let user = match user {
        Some(user) if user.password == hashed_password => user,
        _ => {
            return Err(ApiError::Unauthenticated(
                "Invalid email or password".to_string(),
            ))
        }
    };

    start_session(&state, SessionUser::from(user)).await
}

async fn me_impl(state: web::Data<AppState>, req: HttpRequest) -> Result<MeResponse, ApiError> {
    let user = session_user(&state, &req).await?;
    Ok(MeResponse {
        success: true,
        err: "".to_string(),
        user: UserItem::from(&user),
    })
}
