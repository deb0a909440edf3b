use super::{AccountStore, AppointmentFilter, AppointmentStore, SlotCheck, UpdateOutcome};
use crate::{
    models::{
        appointments::{Appointment, AppointmentChanges, NewAppointment},
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    utils::day_bounds,
};
use anyhow::anyhow;
use chrono::{NaiveDate, Utc};
use std::sync::{Mutex, MutexGuard};

/// Store kept in process memory. One lock covers every table, so each trait call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: u64,
    appointments: Vec<Appointment>,
    users: Vec<UserData>,
    sessions: Vec<UserLoginData>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn count_in_slot(&self, day: NaiveDate, time_slot: &str, except: Option<u64>) -> i64 {
        let (start, end) = day_bounds(day);
        self.appointments
            .iter()
            .filter(|a| Some(a.id) != except)
            .filter(|a| a.date >= start && a.date < end && a.time_slot == time_slot)
            .count() as i64
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.inner.lock().map_err(|_| anyhow!("memory store poisoned"))
    }
}

impl AppointmentStore for MemoryStore {
    fn count_in_slot(&self, day: NaiveDate, time_slot: &str) -> anyhow::Result<i64> {
        Ok(self.lock()?.count_in_slot(day, time_slot, None))
    }

    fn find(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        Ok(self.lock()?.appointments.iter().find(|a| a.id == id).cloned())
    }

    fn list(&self, filter: &AppointmentFilter) -> anyhow::Result<Vec<Appointment>> {
        let tables = self.lock()?;
        let mut res = tables
            .appointments
            .iter()
            .filter(|a| filter.from.map_or(true, |from| a.date >= from))
            .filter(|a| filter.to.map_or(true, |to| a.date <= to))
            .filter(|a| match (filter.user_id, filter.email.as_deref()) {
                (None, None) => true,
                (user_id, email) => {
                    (user_id.is_some() && a.user_id == user_id)
                        || email.map_or(false, |email| a.email.eq_ignore_ascii_case(email))
                }
            })
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by(|a, b| (a.date, &a.time_slot).cmp(&(b.date, &b.time_slot)));
        Ok(res)
    }

    fn insert_within_capacity(
        &self,
        data: NewAppointment,
        capacity: u32,
    ) -> anyhow::Result<Option<Appointment>> {
        let mut tables = self.lock()?;
        if tables.count_in_slot(data.date.date(), &data.time_slot, None) >= i64::from(capacity) {
            return Ok(None);
        }

        let now = Utc::now().naive_utc();
        let appointment = Appointment {
            id: tables.next_id(),
            user_id: data.user_id,
            client_name: data.client_name,
            email: data.email,
            car_brand: data.car_brand,
            date: data.date,
            time_slot: data.time_slot,
            created_at: now,
            updated_at: now,
        };
        tables.appointments.push(appointment.clone());
        Ok(Some(appointment))
    }

    fn update(
        &self,
        id: u64,
        changes: AppointmentChanges,
        check: Option<SlotCheck>,
    ) -> anyhow::Result<UpdateOutcome> {
        let mut tables = self.lock()?;
        if !tables.appointments.iter().any(|a| a.id == id) {
            return Ok(UpdateOutcome::NotFound);
        }
        if let Some(check) = check {
            if tables.count_in_slot(check.day, &check.time_slot, Some(id))
                >= i64::from(check.capacity)
            {
                return Ok(UpdateOutcome::SlotFull);
            }
        }

        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| anyhow!("appointment {} vanished", id))?;
        if let Some(client_name) = changes.client_name {
            appointment.client_name = client_name;
        }
        if let Some(email) = changes.email {
            appointment.email = email;
        }
        if let Some(car_brand) = changes.car_brand {
            appointment.car_brand = car_brand;
        }
        if let Some(date) = changes.date {
            appointment.date = date;
        }
        if let Some(time_slot) = changes.time_slot {
            appointment.time_slot = time_slot;
        }
        appointment.updated_at = Utc::now().naive_utc();
        Ok(UpdateOutcome::Updated(appointment.clone()))
    }

    fn delete(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        let mut tables = self.lock()?;
        let pos = tables.appointments.iter().position(|a| a.id == id);
        Ok(pos.map(|pos| tables.appointments.remove(pos)))
    }
}

impl AccountStore for MemoryStore {
    fn find_user(&self, id: u64) -> anyhow::Result<Option<UserData>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserData>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn insert_user(&self, data: NewUser) -> anyhow::Result<Option<UserData>> {
        let mut tables = self.lock()?;
        if tables.users.iter().any(|u| u.email.eq_ignore_ascii_case(&data.email)) {
            return Ok(None);
        }
        let user = UserData {
            id: tables.next_id(),
            email: data.email,
            password: data.password,
            name: data.name,
            role: data.role,
            created_at: Utc::now().naive_utc(),
        };
        tables.users.push(user.clone());
        Ok(Some(user))
    }

    fn list_users(&self, role: Role) -> anyhow::Result<Vec<UserData>> {
        let mut res = self
            .lock()?
            .users
            .iter()
            .filter(|u| u.role == role.as_str())
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(res)
    }

    fn insert_session(&self, data: UserLoginData) -> anyhow::Result<()> {
        self.lock()?.sessions.push(data);
        Ok(())
    }

    fn find_session(&self, token: &str) -> anyhow::Result<Option<UserLoginData>> {
        Ok(self
            .lock()?
            .sessions
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    fn delete_session(&self, token: &str) -> anyhow::Result<()> {
        self.lock()?.sessions.retain(|s| s.token != token);
        Ok(())
    }
}
