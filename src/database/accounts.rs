use super::{last_insert_id, MysqlStore};
use crate::{
    models::{
        user_logins::UserLoginData,
        users::{NewUser, Role, UserData},
    },
    store::AccountStore,
};
use anyhow::Context;
use diesel::prelude::*;

impl AccountStore for MysqlStore {
    fn find_user(&self, id: u64) -> anyhow::Result<Option<UserData>> {
        use crate::schema::users;

        let conn = self.conn()?;
        users::table
            .find(id)
            .get_result::<UserData>(&conn)
            .optional()
            .context("DB error")
    }

    fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserData>> {
        use crate::schema::users;

        let conn = self.conn()?;
        users::table
            .filter(users::email.eq(email))
            .get_result::<UserData>(&conn)
            .optional()
            .context("DB error")
    }

    fn insert_user(&self, data: NewUser) -> anyhow::Result<Option<UserData>> {
        use crate::schema::users;

        let conn = self.conn()?;
        conn.transaction(|| {
            let res = users::table
                .filter(users::email.eq(&data.email))
                .count()
                .get_result::<i64>(&conn)
                .context("DB error")?;
            if res > 0 {
                return Ok(None);
            }

            diesel::insert_into(users::table)
                .values(&data)
                .execute(&conn)
                .context("DB error")?;
            let id = diesel::select(last_insert_id)
                .get_result::<u64>(&conn)
                .context("DB error")?;
            users::table
                .find(id)
                .get_result::<UserData>(&conn)
                .map(Some)
                .context("DB error")
        })
    }

    fn list_users(&self, role: Role) -> anyhow::Result<Vec<UserData>> {
        use crate::schema::users;

        let conn = self.conn()?;
        users::table
            .filter(users::role.eq(role.as_str()))
            .order(users::name.asc())
            .get_results::<UserData>(&conn)
            .context("DB error")
    }

    fn insert_session(&self, data: UserLoginData) -> anyhow::Result<()> {
        use crate::schema::user_logins;

        let conn = self.conn()?;
        diesel::insert_into(user_logins::table)
            .values(data)
            .execute(&conn)
            .context("DB error")?;
        Ok(())
    }

    fn find_session(&self, token: &str) -> anyhow::Result<Option<UserLoginData>> {
        use crate::schema::user_logins;

        let conn = self.conn()?;
        user_logins::table
            .filter(user_logins::token.eq(token))
            .order(user_logins::login_time.desc())
            .limit(1)
            .get_result::<UserLoginData>(&conn)
            .optional()
            .context("DB error")
    }

    fn delete_session(&self, token: &str) -> anyhow::Result<()> {
        use crate::schema::user_logins;

        let conn = self.conn()?;
        diesel::delete(user_logins::table.filter(user_logins::token.eq(token)))
            .execute(&conn)
            .context("DB error")?;
        Ok(())
    }
}
