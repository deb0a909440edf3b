use super::requests::{CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::{
    auth::utils::SessionUser,
    error::ApiError,
    models::appointments::{Appointment, AppointmentChanges, NewAppointment},
    slots::SlotAllocator,
    state::AppState,
    utils::{block, day_start, is_valid_email, normalize_email, parse_day_str},
};
use actix_web::web;

fn required(field: String) -> Result<String, ApiError> {
    let field = field.trim();
    if field.is_empty() {
        return Err(ApiError::validation("All fields are required"));
    }
    Ok(field.to_string())
}

fn check_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::validation("Invalid email address"));
    }
    Ok(())
}

fn check_time_slot(allocator: &SlotAllocator, time_slot: &str) -> Result<(), ApiError> {
    if !allocator.is_slot_label(time_slot) {
        return Err(ApiError::validation(format!(
            "Unknown time slot '{}'",
            time_slot
        )));
    }
    Ok(())
}

pub fn new_appointment(
    info: CreateAppointmentRequest,
    allocator: &SlotAllocator,
    user_id: Option<u64>,
) -> Result<NewAppointment, ApiError> {
    let data = NewAppointment {
        user_id,
        client_name: required(info.client_name)?,
        email: normalize_email(&required(info.email)?),
        car_brand: required(info.car_brand)?,
        date: day_start(parse_day_str(required(info.date)?).map_err(ApiError::validation)?),
        time_slot: required(info.time_slot)?,
    };
    check_email(&data.email)?;
    check_time_slot(allocator, &data.time_slot)?;
    Ok(data)
}

pub fn appointment_changes(
    info: UpdateAppointmentRequest,
    allocator: &SlotAllocator,
) -> Result<AppointmentChanges, ApiError> {
    let changes = AppointmentChanges {
        client_name: info.client_name.map(required).transpose()?,
        email: info
            .email
            .map(|email| required(email).map(|email| normalize_email(&email)))
            .transpose()?,
        car_brand: info.car_brand.map(required).transpose()?,
        date: info
            .date
            .map(|date| {
                parse_day_str(required(date)?)
                    .map(day_start)
                    .map_err(ApiError::validation)
            })
            .transpose()?,
        time_slot: info.time_slot.map(required).transpose()?,
    };
    if let Some(email) = &changes.email {
        check_email(email)?;
    }
    if let Some(time_slot) = &changes.time_slot {
        check_time_slot(allocator, time_slot)?;
    }
    Ok(changes)
}

/// Loads an appointment the caller may act on.
pub async fn load_accessible(
    state: &web::Data<AppState>,
    user: &SessionUser,
    id: u64,
) -> Result<Appointment, ApiError> {
    let store = state.appointments.clone();
    let appointment = block(move || Ok(store.find(id)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;

    if !user.can_access(&appointment) {
        tracing::warn!(user_id = user.id, appointment = id, "access to appointment denied");
        return Err(ApiError::Forbidden);
    }
    Ok(appointment)
}
