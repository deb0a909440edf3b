use super::{last_insert_id, MysqlStore};
use crate::{
    models::{
        appointments::{Appointment, AppointmentChanges, NewAppointment},
        slot_locks::SlotLock,
    },
    store::{AppointmentFilter, AppointmentStore, SlotCheck, UpdateOutcome},
    utils::day_bounds,
};
use anyhow::Context;
use chrono::NaiveDate;
use diesel::{prelude::*, MysqlConnection};

fn count_in_slot(
    conn: &MysqlConnection,
    day: NaiveDate,
    time_slot: &str,
    except: Option<u64>,
) -> anyhow::Result<i64> {
    use crate::schema::appointments;

    let (start_time, end_time) = day_bounds(day);
    let mut query = appointments::table
        .filter(appointments::date.ge(start_time))
        .filter(appointments::date.lt(end_time))
        .filter(appointments::time_slot.eq(time_slot))
        .into_boxed();
    if let Some(id) = except {
        query = query.filter(appointments::id.ne(id));
    }
    query
        .count()
        .get_result::<i64>(conn)
        .context("DB error")
}

/// Makes sure the lock row of a slot exists. Runs outside of the booking transaction: two
/// transactions racing on `INSERT IGNORE` for the same key can deadlock.
fn ensure_slot_lock(conn: &MysqlConnection, day: NaiveDate, time_slot: &str) -> anyhow::Result<()> {
    use crate::schema::slot_locks;

    let data = SlotLock {
        day,
        time_slot: time_slot.to_string(),
    };
    diesel::insert_or_ignore_into(slot_locks::table)
        .values(&data)
        .execute(conn)
        .context("DB error")?;
    Ok(())
}

/// Blocks until no other transaction holds the slot, then holds it until commit.
fn lock_slot(conn: &MysqlConnection, day: NaiveDate, time_slot: &str) -> anyhow::Result<()> {
    use crate::schema::slot_locks;

    let query = slot_locks::table
        .filter(slot_locks::day.eq(day))
        .filter(slot_locks::time_slot.eq(time_slot))
        .for_update();
    let res = query
        .clone()
        .get_result::<SlotLock>(conn)
        .optional()
        .context("DB error")?;
    // pruned between `ensure_slot_lock` and here
    if res.is_none() {
        ensure_slot_lock(conn, day, time_slot)?;
        query.get_result::<SlotLock>(conn).context("DB error")?;
    }
    Ok(())
}

impl MysqlStore {
    /// Drops the lock rows of days before `before`. Returns how many were removed.
    pub fn prune_slot_locks(&self, before: NaiveDate) -> anyhow::Result<usize> {
        use crate::schema::slot_locks;

        let conn = self.conn()?;
        diesel::delete(slot_locks::table.filter(slot_locks::day.lt(before)))
            .execute(&conn)
            .context("DB error")
    }
}

impl AppointmentStore for MysqlStore {
    fn count_in_slot(&self, day: NaiveDate, time_slot: &str) -> anyhow::Result<i64> {
        let conn = self.conn()?;
        count_in_slot(&conn, day, time_slot, None)
    }

    fn find(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        appointments::table
            .find(id)
            .get_result::<Appointment>(&conn)
            .optional()
            .context("DB error")
    }

    fn list(&self, filter: &AppointmentFilter) -> anyhow::Result<Vec<Appointment>> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        let mut query = appointments::table.into_boxed();
        if let Some(from) = filter.from {
            query = query.filter(appointments::date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(appointments::date.le(to));
        }
        query = match (filter.user_id, filter.email.clone()) {
            (Some(user_id), Some(email)) => query.filter(
                appointments::user_id
                    .eq(Some(user_id))
                    .or(appointments::email.eq(email)),
            ),
            (Some(user_id), None) => query.filter(appointments::user_id.eq(Some(user_id))),
            (None, Some(email)) => query.filter(appointments::email.eq(email)),
            (None, None) => query,
        };
        query
            .order((appointments::date.asc(), appointments::time_slot.asc()))
            .get_results::<Appointment>(&conn)
            .context("DB error")
    }

    fn insert_within_capacity(
        &self,
        data: NewAppointment,
        capacity: u32,
    ) -> anyhow::Result<Option<Appointment>> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        let day = data.date.date();
        ensure_slot_lock(&conn, day, &data.time_slot)?;

        conn.transaction(|| {
            lock_slot(&conn, day, &data.time_slot)?;
            if count_in_slot(&conn, day, &data.time_slot, None)? >= i64::from(capacity) {
                return Ok(None);
            }

            diesel::insert_into(appointments::table)
                .values(&data)
                .execute(&conn)
                .context("DB error")?;
            let id = diesel::select(last_insert_id)
                .get_result::<u64>(&conn)
                .context("DB error")?;
            appointments::table
                .find(id)
                .get_result::<Appointment>(&conn)
                .map(Some)
                .context("DB error")
        })
    }

    fn update(
        &self,
        id: u64,
        changes: AppointmentChanges,
        check: Option<SlotCheck>,
    ) -> anyhow::Result<UpdateOutcome> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        if let Some(check) = &check {
            ensure_slot_lock(&conn, check.day, &check.time_slot)?;
        }

        conn.transaction(|| {
            if let Some(check) = &check {
                lock_slot(&conn, check.day, &check.time_slot)?;
            }
            let current = appointments::table
                .find(id)
                .for_update()
                .get_result::<Appointment>(&conn)
                .optional()
                .context("DB error")?;
            let current = match current {
                Some(current) => current,
                None => return Ok(UpdateOutcome::NotFound),
            };

            if let Some(check) = &check {
                let booked = count_in_slot(&conn, check.day, &check.time_slot, Some(id))?;
                if booked >= i64::from(check.capacity) {
                    return Ok(UpdateOutcome::SlotFull);
                }
            }
            if changes.is_empty() {
                return Ok(UpdateOutcome::Updated(current));
            }

            diesel::update(appointments::table.find(id))
                .set(&changes)
                .execute(&conn)
                .context("DB error")?;
            appointments::table
                .find(id)
                .get_result::<Appointment>(&conn)
                .map(UpdateOutcome::Updated)
                .context("DB error")
        })
    }

    fn delete(&self, id: u64) -> anyhow::Result<Option<Appointment>> {
        use crate::schema::appointments;

        let conn = self.conn()?;
        conn.transaction(|| {
            let res = appointments::table
                .find(id)
                .for_update()
                .get_result::<Appointment>(&conn)
                .optional()
                .context("DB error")?;
            if res.is_some() {
                diesel::delete(appointments::table.find(id))
                    .execute(&conn)
                    .context("DB error")?;
            }
            Ok(res)
        })
    }
}
