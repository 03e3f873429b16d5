use super::{
    like_pattern,
    models::{NewProperty, Property, PropertyChangeset},
    schema::properties,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct PropertyFilter {
    pub customer_id: Option<i32>,
    pub status: Option<String>,
    pub property_type: Option<String>,
    pub search: Option<String>,
}

fn properties_query(filter: &PropertyFilter) -> properties::BoxedQuery<'static, Sqlite> {
    let mut query = properties::table
        .filter(properties::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(properties::customer_id.eq(customer_id));
    }
    if let Some(status) = &filter.status {
        query = query.filter(properties::status.eq(status.clone()));
    }
    if let Some(property_type) = &filter.property_type {
        query = query.filter(properties::property_type.eq(property_type.clone()));
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            properties::property_name
                .like(pattern.clone())
                .or(properties::property_number.like(pattern.clone()))
                .or(properties::address.like(pattern)),
        );
    }
    query
}

impl DBAccessManager {
    pub fn list_properties(
        &mut self,
        filter: &PropertyFilter,
        page: PageRequest,
    ) -> Result<Page<Property>, AppError> {
        let total: i64 = properties_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting properties:"))?;
        let rows = properties_query(filter)
            .order(properties::created_at.desc())
            .limit(page.per_page)
            .offset(page.offset())
            .select(Property::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing properties:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_property_by_uuid(&mut self, uuid: &str) -> Result<Option<Property>, AppError> {
        properties::table
            .filter(properties::uuid.eq(uuid))
            .filter(properties::deleted_at.is_null())
            .select(Property::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding property:"))
    }

    pub fn find_property_by_id(&mut self, id: i32) -> Result<Option<Property>, AppError> {
        properties::table
            .filter(properties::id.eq(id))
            .filter(properties::deleted_at.is_null())
            .select(Property::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding property:"))
    }

    pub fn create_property(&mut self, new_property: NewProperty) -> Result<Property, AppError> {
        diesel::insert_into(properties::table)
            .values(&new_property)
            .returning(Property::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating property:"))
    }

    pub fn update_property(
        &mut self,
        property_id: i32,
        mut changes: PropertyChangeset,
    ) -> Result<Property, AppError> {
        changes.updated_at = Some(now());
        diesel::update(properties::table.find(property_id))
            .set(&changes)
            .returning(Property::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating property:"))
    }

    pub fn soft_delete_property(&mut self, property_id: i32) -> Result<(), AppError> {
        diesel::update(properties::table.find(property_id))
            .set(properties::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting property:"))?;
        Ok(())
    }
}
