use super::{
    models::{NewWaterUsage, WaterUsage},
    schema::water_usage,
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::round2};
use chrono::NaiveDateTime;
use diesel::{
    dsl::{count_star, sum},
    prelude::*,
    sqlite::Sqlite,
};
use serde::Serialize;

#[derive(Debug, Default, Clone)]
pub struct UsageFilter {
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub property_id: Option<i32>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub anomaly: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UsageSummary {
    pub total_consumption: f64,
    pub total_cost: f64,
    pub records: i64,
    pub anomalies: i64,
}

fn water_usage_query(filter: &UsageFilter) -> water_usage::BoxedQuery<'static, Sqlite> {
    let mut query = water_usage::table.into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(water_usage::customer_id.eq(customer_id));
    }
    if let Some(device_id) = filter.device_id {
        query = query.filter(water_usage::device_id.eq(device_id));
    }
    if let Some(property_id) = filter.property_id {
        query = query.filter(water_usage::property_id.eq(property_id));
    }
    if let Some(from) = filter.from {
        query = query.filter(water_usage::reading_date.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(water_usage::reading_date.le(to));
    }
    if let Some(anomaly) = filter.anomaly {
        query = query.filter(water_usage::is_anomaly.eq(anomaly));
    }
    query
}

impl DBAccessManager {
    pub fn insert_water_usage(&mut self, usage: NewWaterUsage) -> Result<WaterUsage, AppError> {
        diesel::insert_into(water_usage::table)
            .values(&usage)
            .returning(WaterUsage::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While storing water usage:"))
    }

    /// Billed (non-anomalous) volume of a meter since `month_start`.
    pub fn month_to_date_consumption(
        &mut self,
        device_id: i32,
        month_start: NaiveDateTime,
    ) -> Result<f64, AppError> {
        let total: Option<f64> = water_usage::table
            .filter(water_usage::device_id.eq(device_id))
            .filter(water_usage::reading_date.ge(month_start))
            .filter(water_usage::is_anomaly.eq(false))
            .select(sum(water_usage::consumption))
            .first(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While summing consumption:"))?;
        Ok(total.unwrap_or(0.0))
    }

    pub fn list_water_usage(
        &mut self,
        filter: &UsageFilter,
        page: PageRequest,
    ) -> Result<Page<WaterUsage>, AppError> {
        let total: i64 = water_usage_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting water usage:"))?;
        let rows = water_usage_query(filter)
            .order((water_usage::reading_date.desc(), water_usage::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(WaterUsage::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing water usage:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn usage_summary(&mut self, filter: &UsageFilter) -> Result<UsageSummary, AppError> {
        let (consumption, cost, records): (Option<f64>, Option<f64>, i64) = water_usage_query(filter)
            .select((
                sum(water_usage::consumption),
                sum(water_usage::cost),
                count_star(),
            ))
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While summarising water usage:"))?;
        let anomalies: i64 = water_usage_query(filter)
            .filter(water_usage::is_anomaly.eq(true))
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting anomalies:"))?;
        Ok(UsageSummary {
            total_consumption: round2(consumption.unwrap_or(0.0)),
            total_cost: round2(cost.unwrap_or(0.0)),
            records,
            anomalies,
        })
    }

    /// Next export chunk: rows with id greater than `after_id`, oldest first.
    pub fn water_usage_after(
        &mut self,
        filter: &UsageFilter,
        after_id: i32,
        limit: i64,
    ) -> Result<Vec<WaterUsage>, AppError> {
        water_usage_query(filter)
            .filter(water_usage::id.gt(after_id))
            .order(water_usage::id.asc())
            .limit(limit)
            .select(WaterUsage::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While exporting water usage:"))
    }
}
