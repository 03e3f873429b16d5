use super::{
    models::{NewPricingTier, PricingTier, PricingTierChangeset},
    schema::pricing_tiers,
    DBAccessManager,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{
    prelude::*,
    sqlite::{Sqlite, SqliteConnection},
};

impl DBAccessManager {
    pub fn list_pricing_tiers(&mut self, active_only: bool) -> Result<Vec<PricingTier>, AppError> {
        let mut query: pricing_tiers::BoxedQuery<'_, Sqlite> = pricing_tiers::table
            .filter(pricing_tiers::deleted_at.is_null())
            .into_boxed();
        if active_only {
            query = query.filter(pricing_tiers::is_active.eq(true));
        }
        query
            .order((pricing_tiers::customer_tier.asc(), pricing_tiers::id.asc()))
            .select(PricingTier::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing pricing tiers:"))
    }

    pub fn find_pricing_tier_by_uuid(&mut self, uuid: &str) -> Result<Option<PricingTier>, AppError> {
        pricing_tiers::table
            .filter(pricing_tiers::uuid.eq(uuid))
            .filter(pricing_tiers::deleted_at.is_null())
            .select(PricingTier::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding pricing tier:"))
    }

    pub fn active_tier_for(&mut self, customer_tier: &str) -> Result<Option<PricingTier>, AppError> {
        pricing_tiers::table
            .filter(pricing_tiers::customer_tier.eq(customer_tier))
            .filter(pricing_tiers::is_active.eq(true))
            .filter(pricing_tiers::deleted_at.is_null())
            .order(pricing_tiers::updated_at.desc())
            .select(PricingTier::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding active pricing tier:"))
    }

    /// Inserts the tier; an active tier retires the other active tiers of
    /// the same customer tier.
    pub fn create_pricing_tier(&mut self, new_tier: NewPricingTier) -> Result<PricingTier, AppError> {
        self.connection.transaction::<_, AppError, _>(|conn| {
            if new_tier.is_active {
                deactivate_tiers(conn, &new_tier.customer_tier, None)?;
            }
            diesel::insert_into(pricing_tiers::table)
                .values(&new_tier)
                .returning(PricingTier::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While creating pricing tier:"))
        })
    }

    pub fn update_pricing_tier(
        &mut self,
        tier: &PricingTier,
        mut changes: PricingTierChangeset,
    ) -> Result<PricingTier, AppError> {
        changes.updated_at = Some(now());
        let tier_id = tier.id;
        let customer_tier = changes
            .customer_tier
            .clone()
            .unwrap_or_else(|| tier.customer_tier.clone());
        let will_be_active = changes.is_active.unwrap_or(tier.is_active);
        self.connection.transaction::<_, AppError, _>(|conn| {
            if will_be_active {
                deactivate_tiers(conn, &customer_tier, Some(tier_id))?;
            }
            diesel::update(pricing_tiers::table.find(tier_id))
                .set(&changes)
                .returning(PricingTier::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While updating pricing tier:"))
        })
    }

    pub fn soft_delete_pricing_tier(&mut self, tier_id: i32) -> Result<(), AppError> {
        diesel::update(pricing_tiers::table.find(tier_id))
            .set((
                pricing_tiers::deleted_at.eq(Some(now())),
                pricing_tiers::is_active.eq(false),
            ))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting pricing tier:"))?;
        Ok(())
    }
}

fn deactivate_tiers(
    conn: &mut SqliteConnection,
    customer_tier: &str,
    except_id: Option<i32>,
) -> Result<(), AppError> {
    let target = pricing_tiers::table
        .filter(pricing_tiers::customer_tier.eq(customer_tier))
        .filter(pricing_tiers::is_active.eq(true))
        .filter(pricing_tiers::id.ne(except_id.unwrap_or(0)));
    diesel::update(target)
        .set((
            pricing_tiers::is_active.eq(false),
            pricing_tiers::updated_at.eq(now()),
        ))
        .execute(conn)
        .map_err(|err| AppError::from_diesel_err(err, "While retiring pricing tiers:"))?;
    Ok(())
}
