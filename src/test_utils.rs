use crate::{
    auth::utils::{generate_login_token, hash_password},
    models::{
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    notify::{tests::RecordingMailer, Notifier},
    slots::GarageSchedule,
    state::AppState,
    store::memory::MemoryStore,
};
use actix_web::web;
use chrono::Utc;
use std::sync::Arc;

/// Default schedule over an empty in-memory store. Must run inside an actix system.
pub fn test_state() -> (web::Data<AppState>, Arc<RecordingMailer>) {
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let notifier = Notifier::start(crate::notify::tests::settings(), mailer.clone());
    let state = AppState::new(
        GarageSchedule::default(),
        store.clone(),
        store,
        notifier,
        3600,
    );
    (web::Data::new(state), mailer)
}

pub fn add_user(state: &web::Data<AppState>, email: &str, password: &str, role: Role) -> UserData {
    let name = email.split('@').next().unwrap_or(email).to_string();
    state
        .accounts
        .insert_user(NewUser {
            email: email.to_string(),
            password: hash_password(password),
            name,
            role: role.to_string(),
        })
        .unwrap()
        .unwrap()
}

/// Registers an account and opens a session for it.
pub fn sign_in(state: &web::Data<AppState>, email: &str, role: Role) -> String {
    let user = add_user(state, email, "password", role);
    let token = generate_login_token(user.id, role);
    state
        .accounts
        .insert_session(UserLoginData {
            token: token.clone(),
            user_id: user.id,
            login_time: Utc::now().naive_utc(),
        })
        .unwrap();
    token
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
