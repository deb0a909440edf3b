use crate::models::users::UserData;
use serde::Serialize;

#[derive(Default, Serialize)]
pub struct ClientItem {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl From<UserData> for ClientItem {
    fn from(data: UserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
        }
    }
}

#[derive(Default, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub err: String,
    pub users: Vec<ClientItem>,
}
