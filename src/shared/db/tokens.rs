use super::{models::NewPersonalAccessToken, schema::personal_access_tokens, DBAccessManager};
use crate::shared::{errors::AppError, utils::now};
use diesel::prelude::*;

impl DBAccessManager {
    pub fn store_token(&mut self, token: NewPersonalAccessToken) -> Result<(), AppError> {
        diesel::insert_into(personal_access_tokens::table)
            .values(&token)
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While storing token:"))?;
        Ok(())
    }

    /// True when the token id is stored for `user_id` and not expired.
    /// Marks the token as used.
    pub fn touch_token(&mut self, token_id: &str, user_id: i32) -> Result<bool, AppError> {
        let at = now();
        let updated = diesel::update(
            personal_access_tokens::table
                .filter(personal_access_tokens::token_id.eq(token_id))
                .filter(personal_access_tokens::user_id.eq(user_id))
                .filter(personal_access_tokens::expires_at.gt(at)),
        )
        .set(personal_access_tokens::last_used_at.eq(Some(at)))
        .execute(&mut self.connection)
        .map_err(|err| AppError::from_diesel_err(err, "While checking token:"))?;
        Ok(updated > 0)
    }

    pub fn revoke_token(&mut self, token_id: &str) -> Result<(), AppError> {
        diesel::delete(
            personal_access_tokens::table.filter(personal_access_tokens::token_id.eq(token_id)),
        )
        .execute(&mut self.connection)
        .map_err(|err| AppError::from_diesel_err(err, "While revoking token:"))?;
        Ok(())
    }

    pub fn purge_expired_tokens(&mut self) -> Result<usize, AppError> {
        diesel::delete(
            personal_access_tokens::table.filter(personal_access_tokens::expires_at.le(now())),
        )
        .execute(&mut self.connection)
        .map_err(|err| AppError::from_diesel_err(err, "While purging tokens:"))
    }
}
