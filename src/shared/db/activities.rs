use super::{
    models::{Activity, NewActivity},
    schema::activities,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::errors::AppError;
use diesel::{prelude::*, sqlite::Sqlite};

fn activities_query(activity_type: Option<&str>) -> activities::BoxedQuery<'static, Sqlite> {
    let mut query = activities::table.into_boxed();
    if let Some(activity_type) = activity_type {
        query = query.filter(activities::activity_type.eq(activity_type.to_string()));
    }
    query
}

impl DBAccessManager {
    pub fn log_activity(&mut self, activity: NewActivity) -> Result<(), AppError> {
        diesel::insert_into(activities::table)
            .values(&activity)
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While logging activity:"))?;
        Ok(())
    }

    pub fn list_activities(
        &mut self,
        activity_type: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<Activity>, AppError> {
        let total: i64 = activities_query(activity_type)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting activities:"))?;
        let rows = activities_query(activity_type)
            .order((activities::created_at.desc(), activities::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(Activity::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing activities:"))?;
        Ok(Page::new(rows, total, page))
    }
}
