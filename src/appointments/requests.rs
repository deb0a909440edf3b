use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub car_brand: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time_slot: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub car_brand: Option<String>,
    pub date: Option<String>,
    pub time_slot: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}
