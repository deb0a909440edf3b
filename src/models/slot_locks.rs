use crate::schema::slot_locks;
use chrono::NaiveDate;

#[derive(Queryable, Insertable)]
#[table_name = "slot_locks"]
pub struct SlotLock {
    pub day: NaiveDate,
    pub time_slot: String,
}
