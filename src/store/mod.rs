//! Storage seams used by the booking logic and the HTTP handlers.
//!
//! Every method blocks; handlers call them through `web::block`.

#[cfg(test)]
pub mod memory;

use crate::{
    models::{
        appointments::{Appointment, AppointmentChanges, NewAppointment},
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    utils::normalize_email,
};
use chrono::{NaiveDate, NaiveDateTime};

/// Capacity guard applied when a write moves an appointment into a slot.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotCheck {
    pub day: NaiveDate,
    pub time_slot: String,
    pub capacity: u32,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Appointment),
    SlotFull,
    NotFound,
}

/// Listing filter. `user_id` and `email` match either way: an appointment belongs to a client if
/// it is linked to the account or was booked with the account email.
#[derive(Clone, Debug, Default)]
pub struct AppointmentFilter {
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub user_id: Option<u64>,
    pub email: Option<String>,
}

impl AppointmentFilter {
    pub fn owned_by(user_id: u64, email: &str) -> Self {
        Self {
            user_id: Some(user_id),
            email: Some(normalize_email(email)),
            ..Default::default()
        }
    }
}

pub trait AppointmentStore: Send + Sync {
    /// Appointments on `day` (00:00:00 to 23:59:59 inclusive) holding `time_slot`.
    fn count_in_slot(&self, day: NaiveDate, time_slot: &str) -> anyhow::Result<i64>;

    fn find(&self, id: u64) -> anyhow::Result<Option<Appointment>>;

    /// Ordered by `(date, time_slot)` ascending.
    fn list(&self, filter: &AppointmentFilter) -> anyhow::Result<Vec<Appointment>>;

    /// Counts and inserts as one step serialized per `(day, slot)`. `None` when the slot already
    /// holds `capacity` appointments.
    fn insert_within_capacity(
        &self,
        data: NewAppointment,
        capacity: u32,
    ) -> anyhow::Result<Option<Appointment>>;

    /// Applies `changes`. With a `check`, the target slot is counted without the appointment
    /// itself and the write is refused when it is already at capacity.
    fn update(
        &self,
        id: u64,
        changes: AppointmentChanges,
        check: Option<SlotCheck>,
    ) -> anyhow::Result<UpdateOutcome>;

    /// Returns the removed row.
    fn delete(&self, id: u64) -> anyhow::Result<Option<Appointment>>;
}

pub trait AccountStore: Send + Sync {
    fn find_user(&self, id: u64) -> anyhow::Result<Option<UserData>>;

    fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserData>>;

    /// `None` when the email is already registered.
    fn insert_user(&self, data: NewUser) -> anyhow::Result<Option<UserData>>;

    /// Ordered by name.
    fn list_users(&self, role: Role) -> anyhow::Result<Vec<UserData>>;

    fn insert_session(&self, data: UserLoginData) -> anyhow::Result<()>;

    fn find_session(&self, token: &str) -> anyhow::Result<Option<UserLoginData>>;

    fn delete_session(&self, token: &str) -> anyhow::Result<()>;
}
