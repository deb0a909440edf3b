mod responses;

use crate::{
    auth::utils::staff_user, error::ApiError, models::users::Role, state::AppState, utils::block,
};
use actix_web::{get, web, HttpRequest, HttpResponse};

use self::responses::*;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(list_clients);
}

crate::api_funcs! {
    (get, list_clients, "/users", Ok),
}

async fn list_clients_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<UsersResponse, ApiError> {
    let user = staff_user(&state, &req).await?;

    let accounts = state.accounts.clone();
    let clients = block(move || Ok(accounts.list_users(Role::Client)?)).await?;
    tracing::debug!(staff = user.id, count = clients.len(), "listed clients");

    Ok(UsersResponse {
        success: true,
        err: "".to_string(),
        users: clients.into_iter().map(ClientItem::from).collect(),
    })
}
