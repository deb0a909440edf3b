mod requests;
mod responses;
mod utils;

use crate::{
    auth::utils::{optional_session_user, session_user, staff_user},
    error::ApiError,
    notify::Notification,
    protocol::MessageResponse,
    state::AppState,
    store::AppointmentFilter,
    utils::{block, day_start, normalize_email, parse_day_str},
};
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use self::{
    requests::*,
    responses::*,
    utils::{appointment_changes, load_accessible, new_appointment},
};

pub fn config(cfg: &mut web::ServiceConfig) {
    // `my` must come before `{id}`
    cfg.service(list_appointments)
        .service(create_appointment)
        .service(my_appointments)
        .service(view_appointment)
        .service(update_appointment)
        .service(delete_appointment)
        .service(availability);
}

crate::api_funcs! {
    (get, list_appointments, "/appointments", Ok, query: web::Query<ListQuery>),
    (post, create_appointment, "/appointments", Created, info: web::Json<CreateAppointmentRequest>),
    (get, my_appointments, "/appointments/my", Ok),
    (get, view_appointment, "/appointments/{id}", Ok, path: web::Path<u64>),
    (put, update_appointment, "/appointments/{id}", Ok, path: web::Path<u64>, info: web::Json<UpdateAppointmentRequest>),
    (delete, delete_appointment, "/appointments/{id}", Ok, path: web::Path<u64>),
    (get, availability, "/availability", Ok, query: web::Query<AvailabilityQuery>),
}

async fn list_appointments_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListQuery>,
) -> Result<AppointmentListResponse, ApiError> {
    staff_user(&state, &req).await?;

    let query = query.into_inner();
    // appointments sit at the midnight of their day, so both bounds are inclusive days
    let from = query
        .from
        .map(|from| parse_day_str(from).map(day_start).map_err(ApiError::validation))
        .transpose()?;
    let to = query
        .to
        .map(|to| parse_day_str(to).map(day_start).map_err(ApiError::validation))
        .transpose()?;
    let filter = AppointmentFilter {
        from,
        to,
        email: query
            .email
            .map(|email| normalize_email(&email))
            .filter(|email| !email.is_empty()),
        ..Default::default()
    };

    let store = state.appointments.clone();
    let appos = block(move || Ok(store.list(&filter)?)).await?;
    Ok(AppointmentListResponse::ok(appos))
}

async fn create_appointment_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    info: web::Json<CreateAppointmentRequest>,
) -> Result<AppointmentResponse, ApiError> {
    let user = optional_session_user(&state, &req).await?;
    let data = new_appointment(
        info.into_inner(),
        state.bookings.allocator(),
        user.map(|user| user.id),
    )?;

    let bookings = state.bookings.clone();
    let appointment = block(move || Ok(bookings.create(data)?)).await?;

    state
        .notifier
        .notify(Notification::Confirmed(appointment.clone()));
    Ok(AppointmentResponse::ok(appointment))
}

async fn my_appointments_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<AppointmentListResponse, ApiError> {
    let user = session_user(&state, &req).await?;

    let filter = AppointmentFilter::owned_by(user.id, &user.email);
    let store = state.appointments.clone();
    let appos = block(move || Ok(store.list(&filter)?)).await?;
    Ok(AppointmentListResponse::ok(appos))
}

async fn view_appointment_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u64>,
) -> Result<AppointmentResponse, ApiError> {
    let user = session_user(&state, &req).await?;
    let appointment = load_accessible(&state, &user, path.into_inner()).await?;
    Ok(AppointmentResponse::ok(appointment))
}

async fn update_appointment_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u64>,
    info: web::Json<UpdateAppointmentRequest>,
) -> Result<AppointmentResponse, ApiError> {
    let user = session_user(&state, &req).await?;
    let id = load_accessible(&state, &user, path.into_inner()).await?.id;

    let changes = appointment_changes(info.into_inner(), state.bookings.allocator())?;
    let notify = changes.touches_schedule();
    let bookings = state.bookings.clone();
    let appointment = block(move || Ok(bookings.update(id, changes)?)).await?;

    if notify {
        state
            .notifier
            .notify(Notification::Modified(appointment.clone()));
    }
    Ok(AppointmentResponse::ok(appointment))
}

async fn delete_appointment_impl(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<u64>,
) -> Result<MessageResponse, ApiError> {
    let user = session_user(&state, &req).await?;
    let id = load_accessible(&state, &user, path.into_inner()).await?.id;

    let bookings = state.bookings.clone();
    let appointment = block(move || Ok(bookings.cancel(id)?)).await?;

    state.notifier.notify(Notification::Cancelled(appointment));
    Ok(MessageResponse::ok("Appointment deleted"))
}

async fn availability_impl(
    state: web::Data<AppState>,
    _req: HttpRequest,
    query: web::Query<AvailabilityQuery>,
) -> Result<AvailabilityResponse, ApiError> {
    let date = match query.into_inner().date {
        Some(date) if !date.trim().is_empty() => date,
        _ => return Err(ApiError::validation("Date is required")),
    };
    let day = parse_day_str(&date).map_err(ApiError::validation)?;

    let bookings = state.bookings.clone();
    let slots = block(move || Ok(bookings.allocator().available_slots_for_date(day)?)).await?;
    Ok(AvailabilityResponse {
        success: true,
        err: "".to_string(),
        date,
        slots,
    })
}
