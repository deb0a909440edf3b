use crate::schema::users;
use chrono::NaiveDateTime;
use std::{fmt, str::FromStr};

#[derive(Queryable, Identifiable, Clone, Debug)]
#[table_name = "users"]
pub struct UserData {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl UserData {
    /// Unknown role strings fall back to the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_else(|_| {
            tracing::warn!(user_id = self.id, role = %self.role, "unknown role, treating as client");
            Role::Client
        })
    }
}

#[derive(Insertable, Clone, Debug)]
#[table_name = "users"]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Client,
    Employee,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Employee => "employee",
            Role::Admin => "admin",
        }
    }

    /// Staff can see, edit and cancel every appointment and list the client base.
    pub fn can_manage_appointments(self) -> bool {
        matches!(self, Role::Employee | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Unknown role '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_staff_manage_appointments() {
        assert!(!Role::Client.can_manage_appointments());
        assert!(Role::Employee.can_manage_appointments());
        assert!(Role::Admin.can_manage_appointments());
    }

    #[test]
    fn role_round_trips_through_storage_text() {
        for role in [Role::Client, Role::Employee, Role::Admin].iter() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert!("superuser".parse::<Role>().is_err());
    }
}
