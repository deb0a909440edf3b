pub mod appointments;
pub mod slot_locks;
pub mod users;

pub mod user_logins;
