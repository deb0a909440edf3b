use crate::schema::appointments;
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Queryable, Clone, Debug, PartialEq)]
pub struct Appointment {
    pub id: u64,
    pub user_id: Option<u64>,
    pub client_name: String,
    pub email: String,
    pub car_brand: String,
    pub date: NaiveDateTime,
    pub time_slot: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appointment {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

#[derive(Insertable, Clone, Debug)]
#[table_name = "appointments"]
pub struct NewAppointment {
    pub user_id: Option<u64>,
    pub client_name: String,
    pub email: String,
    pub car_brand: String,
    pub date: NaiveDateTime,
    pub time_slot: String,
}

#[derive(AsChangeset, Default, Clone, Debug)]
#[table_name = "appointments"]
pub struct AppointmentChanges {
    pub client_name: Option<String>,
    pub email: Option<String>,
    pub car_brand: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub time_slot: Option<String>,
}

impl AppointmentChanges {
    /// diesel refuses an `UPDATE` with an empty `SET` clause.
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.email.is_none()
            && self.car_brand.is_none()
            && self.date.is_none()
            && self.time_slot.is_none()
    }

    /// True when a date or a slot was sent, whether or not it differs from the stored one.
    pub fn touches_schedule(&self) -> bool {
        self.date.is_some() || self.time_slot.is_some()
    }
}
