//! Capacity-bounded time slots.
//!
//! The allocator only reads. Bookings are admitted by the store, which repeats the count inside
//! the write transaction (see [`AppointmentStore::insert_within_capacity`]).

pub mod schedule;

use crate::store::AppointmentStore;
use chrono::NaiveDate;
use std::sync::Arc;

pub use self::schedule::GarageSchedule;

#[derive(Clone)]
pub struct SlotAllocator {
    schedule: Arc<GarageSchedule>,
    labels: Arc<[String]>,
    store: Arc<dyn AppointmentStore>,
}

impl SlotAllocator {
    pub fn new(schedule: GarageSchedule, store: Arc<dyn AppointmentStore>) -> Self {
        let labels = schedule.slot_labels().into();
        Self {
            schedule: Arc::new(schedule),
            labels,
            store,
        }
    }

    pub fn schedule(&self) -> &GarageSchedule {
        &self.schedule
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        self.schedule.is_work_day(date)
    }

    pub fn slot_labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_slot_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn capacity(&self) -> u32 {
        self.schedule.bays()
    }

    /// Storage errors are returned as they are.
    pub fn count_bookings(&self, date: NaiveDate, time_slot: &str) -> anyhow::Result<i64> {
        self.store.count_in_slot(date, time_slot)
    }

    pub fn admits(&self, booked: i64) -> bool {
        booked < i64::from(self.capacity())
    }

    pub fn is_slot_available(&self, date: NaiveDate, time_slot: &str) -> anyhow::Result<bool> {
        if !self.is_work_day(date) {
            return Ok(false);
        }
        let booked = self.count_bookings(date, time_slot)?;
        Ok(self.admits(booked))
    }

    pub fn available_slots_for_date(&self, date: NaiveDate) -> anyhow::Result<Vec<String>> {
        if !self.is_work_day(date) {
            return Ok(Vec::new());
        }

        let mut slots = Vec::with_capacity(self.labels.len());
        for label in self.labels.iter() {
            if self.is_slot_available(date, label)? {
                slots.push(label.clone());
            }
        }
        Ok(slots)
    }
}
