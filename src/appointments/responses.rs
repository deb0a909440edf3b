use crate::{models::appointments::Appointment, utils::format_time_str};
use serde::Serialize;

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentItem {
    pub id: u64,
    pub user_id: Option<u64>,
    pub client_name: String,
    pub email: String,
    pub car_brand: String,
    pub date: String,
    pub time_slot: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentItem {
    fn from(data: Appointment) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            client_name: data.client_name,
            email: data.email,
            car_brand: data.car_brand,
            date: format_time_str(&data.date),
            time_slot: data.time_slot,
            created_at: format_time_str(&data.created_at),
            updated_at: format_time_str(&data.updated_at),
        }
    }
}

#[derive(Default, Serialize)]
pub struct AppointmentResponse {
    pub success: bool,
    pub err: String,
    pub appointment: AppointmentItem,
}

impl AppointmentResponse {
    pub fn ok(data: Appointment) -> Self {
        Self {
            success: true,
            err: "".to_string(),
            appointment: data.into(),
        }
    }
}

#[derive(Default, Serialize)]
pub struct AppointmentListResponse {
    pub success: bool,
    pub err: String,
    pub appointments: Vec<AppointmentItem>,
}

impl AppointmentListResponse {
    pub fn ok(data: Vec<Appointment>) -> Self {
        Self {
            success: true,
            err: "".to_string(),
            appointments: data.into_iter().map(AppointmentItem::from).collect(),
        }
    }
}

#[derive(Default, Serialize)]
pub struct AvailabilityResponse {
    pub success: bool,
    pub err: String,
    pub date: String,
    pub slots: Vec<String>,
}
