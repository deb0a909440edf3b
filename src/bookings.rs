use crate::{
    models::appointments::{Appointment, AppointmentChanges, NewAppointment},
    slots::SlotAllocator,
    store::{AppointmentStore, SlotCheck, UpdateOutcome},
    utils::day_start,
};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Slot {time_slot} on {day} is not available")]
    SlotUnavailable { day: NaiveDate, time_slot: String },

    #[error("Appointment {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Writes appointments, admitting each one against the capacity of its slot.
#[derive(Clone)]
pub struct BookingService {
    allocator: SlotAllocator,
    store: Arc<dyn AppointmentStore>,
}

impl BookingService {
    pub fn new(allocator: SlotAllocator, store: Arc<dyn AppointmentStore>) -> Self {
        Self { allocator, store }
    }

    pub fn allocator(&self) -> &SlotAllocator {
        &self.allocator
    }

    pub fn create(&self, mut data: NewAppointment) -> Result<Appointment, BookingError> {
        let day = data.date.date();
        data.date = day_start(day);
        if !self.allocator.is_work_day(day) {
            return Err(BookingError::SlotUnavailable {
                day,
                time_slot: data.time_slot,
            });
        }

        let time_slot = data.time_slot.clone();
        match self
            .store
            .insert_within_capacity(data, self.allocator.capacity())?
        {
            Some(appointment) => {
                tracing::info!(
                    id = appointment.id,
                    %day,
                    time_slot = %appointment.time_slot,
                    "appointment booked"
                );
                Ok(appointment)
            }
            None => {
                tracing::info!(%day, %time_slot, "slot full, booking refused");
                Err(BookingError::SlotUnavailable { day, time_slot })
            }
        }
    }

    /// Only a change of day or slot is checked against availability; keeping the current pair
    /// never conflicts with the appointment itself.
    pub fn update(
        &self,
        id: u64,
        mut changes: AppointmentChanges,
    ) -> Result<Appointment, BookingError> {
        let current = self.store.find(id)?.ok_or(BookingError::NotFound(id))?;

        changes.date = changes.date.map(|date| day_start(date.date()));
        let target_date = changes.date.unwrap_or_else(|| day_start(current.day()));
        let target_slot = changes
            .time_slot
            .clone()
            .unwrap_or_else(|| current.time_slot.clone());
        let day = target_date.date();
        let moved = day != current.day() || target_slot != current.time_slot;

        let check = if moved {
            if !self.allocator.is_work_day(day) {
                return Err(BookingError::SlotUnavailable {
                    day,
                    time_slot: target_slot,
                });
            }
            // write the pair that was checked, even if only half of it was sent
            changes.date = Some(target_date);
            changes.time_slot = Some(target_slot.clone());
            Some(SlotCheck {
                day,
                time_slot: target_slot.clone(),
                capacity: self.allocator.capacity(),
            })
        } else {
            None
        };

        match self.store.update(id, changes, check)? {
            UpdateOutcome::Updated(appointment) => {
                if moved {
                    tracing::info!(id, %day, time_slot = %target_slot, "appointment rescheduled");
                }
                Ok(appointment)
            }
            UpdateOutcome::SlotFull => Err(BookingError::SlotUnavailable {
                day,
                time_slot: target_slot,
            }),
            UpdateOutcome::NotFound => Err(BookingError::NotFound(id)),
        }
    }

    pub fn cancel(&self, id: u64) -> Result<Appointment, BookingError> {
        let appointment = self.store.delete(id)?.ok_or(BookingError::NotFound(id))?;
        tracing::info!(id, "appointment cancelled");
        Ok(appointment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{slots::GarageSchedule, store::memory::MemoryStore};
    use chrono::NaiveDateTime;
    use std::{sync::Barrier, thread};

    // 2025-12-08 is a Monday
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd(2025, 12, 8)
    }

    fn at(day: NaiveDate) -> NaiveDateTime {
        day.and_hms(0, 0, 0)
    }

    fn request(date: NaiveDateTime, time_slot: &str) -> NewAppointment {
        NewAppointment {
            user_id: None,
            client_name: "Marie Dupuis".to_string(),
            email: "marie.dupuis@example.com".to_string(),
            car_brand: "Honda Civic".to_string(),
            date,
            time_slot: time_slot.to_string(),
        }
    }

    fn service() -> BookingService {
        let store: Arc<dyn AppointmentStore> = Arc::new(MemoryStore::new());
        let allocator = SlotAllocator::new(GarageSchedule::default(), store.clone());
        BookingService::new(allocator, store)
    }

    #[test]
    fn books_until_the_slot_is_full() {
        let bookings = service();

        for _ in 0..3 {
            bookings.create(request(at(monday()), "08:00")).unwrap();
        }
        let err = bookings
            .create(request(at(monday()), "08:00"))
            .unwrap_err();

        assert!(matches!(err, BookingError::SlotUnavailable { .. }));
        assert!(bookings.create(request(at(monday()), "09:00")).is_ok());
    }

    #[test]
    fn refuses_closed_days() {
        let bookings = service();

        let err = bookings
            .create(request(at(monday().pred()), "08:00"))
            .unwrap_err();

        assert!(matches!(
            err,
            BookingError::SlotUnavailable { day, .. } if day == monday().pred()
        ));
    }

    #[test]
    fn concurrent_bookings_never_exceed_capacity() {
        const EXTRA: usize = 4;
        let bookings = service();
        let attempts = bookings.allocator().capacity() as usize + EXTRA;
        let barrier = Arc::new(Barrier::new(attempts));

        let handles = (0..attempts)
            .map(|_| {
                let bookings = bookings.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    bookings.create(request(monday().and_hms(10, 0, 0), "10:00"))
                })
            })
            .collect::<Vec<_>>();
        let results = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        let booked = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::SlotUnavailable { .. })))
            .count();
        assert_eq!(booked, 3);
        assert_eq!(refused, EXTRA);
        assert_eq!(
            bookings
                .allocator()
                .count_bookings(monday(), "10:00")
                .unwrap(),
            3
        );
    }

    #[test]
    fn end_of_day_timestamps_count_against_their_day() {
        let bookings = service();
        let late = monday().and_hms_nano(23, 59, 59, 999_500_000);

        let results = (0..6)
            .map(|_| bookings.create(request(late, "10:00")))
            .collect::<Vec<_>>();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        for appointment in results.iter().filter_map(|r| r.as_ref().ok()) {
            assert_eq!(appointment.date, at(monday()));
        }
        assert!(!bookings
            .allocator()
            .available_slots_for_date(monday())
            .unwrap()
            .contains(&"10:00".to_string()));
    }

    #[test]
    fn concurrent_moves_never_overfill_a_slot() {
        let bookings = service();
        bookings.create(request(at(monday()), "13:00")).unwrap();
        let movers = ["08:00", "08:00", "08:00", "09:00", "09:00", "09:00"]
            .iter()
            .map(|slot| bookings.create(request(at(monday()), slot)).unwrap().id)
            .collect::<Vec<_>>();
        let barrier = Arc::new(Barrier::new(movers.len()));

        let handles = movers
            .into_iter()
            .map(|id| {
                let bookings = bookings.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let changes = AppointmentChanges {
                        time_slot: Some("13:00".to_string()),
                        ..Default::default()
                    };
                    barrier.wait();
                    bookings.update(id, changes)
                })
            })
            .collect::<Vec<_>>();
        let moved = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(moved, 2);
        assert_eq!(
            bookings
                .allocator()
                .count_bookings(monday(), "13:00")
                .unwrap(),
            3
        );
        let left = bookings.allocator().count_bookings(monday(), "08:00").unwrap()
            + bookings.allocator().count_bookings(monday(), "09:00").unwrap();
        assert_eq!(left, 4);
    }

    #[test]
    fn unchanged_slot_is_not_rechecked() {
        let bookings = service();
        let own = bookings.create(request(at(monday()), "09:00")).unwrap();
        for _ in 0..2 {
            bookings.create(request(at(monday()), "09:00")).unwrap();
        }

        let changes = AppointmentChanges {
            date: Some(at(monday())),
            time_slot: Some("09:00".to_string()),
            car_brand: Some("Ford F-150".to_string()),
            ..Default::default()
        };
        let updated = bookings.update(own.id, changes).unwrap();

        assert_eq!(updated.car_brand, "Ford F-150");
        assert_eq!(updated.time_slot, "09:00");
    }

    #[test]
    fn moving_into_a_full_slot_conflicts() {
        let bookings = service();
        let own = bookings.create(request(at(monday()), "09:00")).unwrap();
        for _ in 0..3 {
            bookings.create(request(at(monday()), "11:00")).unwrap();
        }

        let changes = AppointmentChanges {
            time_slot: Some("11:00".to_string()),
            ..Default::default()
        };
        let err = bookings.update(own.id, changes).unwrap_err();

        assert!(matches!(err, BookingError::SlotUnavailable { .. }));
        let unchanged = bookings.update(own.id, AppointmentChanges::default()).unwrap();
        assert_eq!(unchanged.time_slot, "09:00");
    }

    #[test]
    fn moving_to_another_day_keeps_the_slot() {
        let bookings = service();
        let own = bookings.create(request(at(monday()), "14:00")).unwrap();
        let tuesday = monday().succ();

        let changes = AppointmentChanges {
            date: Some(at(tuesday)),
            ..Default::default()
        };
        let moved = bookings.update(own.id, changes).unwrap();

        assert_eq!(moved.day(), tuesday);
        assert_eq!(moved.time_slot, "14:00");
        assert_eq!(
            bookings
                .allocator()
                .count_bookings(monday(), "14:00")
                .unwrap(),
            0
        );
    }

    #[test]
    fn moving_to_a_weekend_conflicts() {
        let bookings = service();
        let own = bookings.create(request(at(monday()), "14:00")).unwrap();

        let changes = AppointmentChanges {
            date: Some(at(monday().pred())),
            ..Default::default()
        };

        assert!(matches!(
            bookings.update(own.id, changes).unwrap_err(),
            BookingError::SlotUnavailable { .. }
        ));
    }

    #[test]
    fn cancel_frees_capacity() {
        let bookings = service();
        let ids = (0..3)
            .map(|_| bookings.create(request(at(monday()), "15:00")).unwrap().id)
            .collect::<Vec<_>>();
        assert!(!bookings
            .allocator()
            .is_slot_available(monday(), "15:00")
            .unwrap());

        let cancelled = bookings.cancel(ids[0]).unwrap();

        assert_eq!(cancelled.id, ids[0]);
        assert!(bookings
            .allocator()
            .is_slot_available(monday(), "15:00")
            .unwrap());
        assert!(matches!(
            bookings.cancel(ids[0]).unwrap_err(),
            BookingError::NotFound(_)
        ));
    }

    #[test]
    fn unknown_appointment() {
        let bookings = service();

        assert!(matches!(
            bookings.update(42, AppointmentChanges::default()).unwrap_err(),
            BookingError::NotFound(42)
        ));
    }
}
