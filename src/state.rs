use crate::{
    bookings::BookingService,
    notify::Notifier,
    slots::{GarageSchedule, SlotAllocator},
    store::{AccountStore, AppointmentStore},
};
use std::sync::Arc;

/// Shared by every worker; all mutable state lives in the stores.
pub struct AppState {
    pub bookings: BookingService,
    pub appointments: Arc<dyn AppointmentStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub notifier: Notifier,
    pub session_ttl_secs: i64,
}

impl AppState {
    pub fn new(
        schedule: GarageSchedule,
        appointments: Arc<dyn AppointmentStore>,
        accounts: Arc<dyn AccountStore>,
        notifier: Notifier,
        session_ttl_secs: i64,
    ) -> Self {
        let allocator = SlotAllocator::new(schedule, appointments.clone());
        Self {
            bookings: BookingService::new(allocator, appointments.clone()),
            appointments,
            accounts,
            notifier,
            session_ttl_secs,
        }
    }
}
