use super::utils::SessionUser;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct UserItem {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&SessionUser> for UserItem {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.to_string(),
        }
    }
}

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
    pub user: UserItem,
}

#[derive(Default, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub err: String,
    pub user: UserItem,
}
