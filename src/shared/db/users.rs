use super::{
    like_pattern,
    models::{NewUser, User},
    schema::users,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

fn users_query(search: Option<&str>) -> users::BoxedQuery<'static, Sqlite> {
    let mut query = users::table
        .filter(users::deleted_at.is_null())
        .into_boxed();
    if let Some(term) = search.filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            users::full_name
                .like(pattern.clone())
                .or(users::email.like(pattern)),
        );
    }
    query
}

impl DBAccessManager {
    pub fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        users::table
            .filter(users::email.eq(email))
            .filter(users::deleted_at.is_null())
            .select(User::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding user by email:"))
    }

    pub fn find_user_by_uuid(&mut self, uuid: &str) -> Result<Option<User>, AppError> {
        users::table
            .filter(users::uuid.eq(uuid))
            .filter(users::deleted_at.is_null())
            .select(User::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding user:"))
    }

    pub fn find_user_by_id(&mut self, id: i32) -> Result<Option<User>, AppError> {
        users::table
            .filter(users::id.eq(id))
            .filter(users::deleted_at.is_null())
            .select(User::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding user:"))
    }

    /// Soft-deleted rows still hold the unique email.
    pub fn email_taken(&mut self, email: &str) -> Result<bool, AppError> {
        let count: i64 = users::table
            .filter(users::email.eq(email))
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While checking email:"))?;
        Ok(count > 0)
    }

    pub fn create_user(&mut self, new_user: NewUser) -> Result<User, AppError> {
        diesel::insert_into(users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating user:"))
    }

    pub fn record_login(&mut self, user_id: i32, ip: Option<String>) -> Result<User, AppError> {
        let at = now();
        diesel::update(users::table.find(user_id))
            .set((
                users::last_login_at.eq(Some(at)),
                users::last_login_ip.eq(ip),
                users::updated_at.eq(at),
            ))
            .returning(User::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While recording login:"))
    }

    pub fn set_user_role(&mut self, user_id: i32, role: &str) -> Result<(), AppError> {
        diesel::update(users::table.find(user_id))
            .set((users::role.eq(role), users::updated_at.eq(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating user role:"))?;
        Ok(())
    }

    pub fn list_users(
        &mut self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        let total: i64 = users_query(search)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting users:"))?;
        let rows = users_query(search)
            .order(users::id.asc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(User::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing users:"))?;

        Ok(Page::new(rows, total, page))
    }
}
