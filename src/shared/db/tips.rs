use super::{
    like_pattern,
    models::{NewTip, NewTipEngagement, Tip, TipChangeset, TipEngagement, TipEngagementState},
    schema::{tip_engagements, water_conservation_tips as tips},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{
    engagement::{apply_action, EngagementAction},
    errors::AppError,
    utils::{new_uuid, now},
};
use diesel::{prelude::*, sql_types::Integer, sqlite::Sqlite};
use serde::Serialize;

diesel::define_sql_function!(fn random() -> Integer);

#[derive(Debug, Default, Clone)]
pub struct TipFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EngagementOutcome {
    pub tip: Tip,
    pub engagement: TipEngagement,
}

fn tips_query(filter: &TipFilter) -> tips::BoxedQuery<'static, Sqlite> {
    let mut query = tips::table.filter(tips::deleted_at.is_null()).into_boxed();
    if let Some(category) = &filter.category {
        query = query.filter(tips::category.eq(category.clone()));
    }
    if let Some(difficulty) = &filter.difficulty {
        query = query.filter(tips::difficulty.eq(difficulty.clone()));
    }
    if let Some(status) = &filter.status {
        query = query.filter(tips::status.eq(status.clone()));
    }
    if let Some(term) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        query = query.filter(
            tips::title
                .like(pattern.clone())
                .or(tips::description.like(pattern)),
        );
    }
    query
}

impl DBAccessManager {
    pub fn list_tips(&mut self, filter: &TipFilter, page: PageRequest) -> Result<Page<Tip>, AppError> {
        let total: i64 = tips_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting tips:"))?;
        let rows = tips_query(filter)
            .order((tips::like_count.desc(), tips::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(Tip::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing tips:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn random_tips(&mut self, filter: &TipFilter, limit: i64) -> Result<Vec<Tip>, AppError> {
        tips_query(filter)
            .order(random())
            .limit(limit)
            .select(Tip::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While picking tips:"))
    }

    pub fn find_tip_by_uuid(&mut self, uuid: &str) -> Result<Option<Tip>, AppError> {
        tips::table
            .filter(tips::uuid.eq(uuid))
            .filter(tips::deleted_at.is_null())
            .select(Tip::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding tip:"))
    }

    pub fn create_tip(&mut self, new_tip: NewTip) -> Result<Tip, AppError> {
        diesel::insert_into(tips::table)
            .values(&new_tip)
            .returning(Tip::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating tip:"))
    }

    pub fn update_tip(&mut self, tip_id: i32, mut changes: TipChangeset) -> Result<Tip, AppError> {
        changes.updated_at = Some(now());
        diesel::update(tips::table.find(tip_id))
            .set(&changes)
            .returning(Tip::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating tip:"))
    }

    pub fn soft_delete_tip(&mut self, tip_id: i32) -> Result<(), AppError> {
        diesel::update(tips::table.find(tip_id))
            .set(tips::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting tip:"))?;
        Ok(())
    }

    pub fn increment_tip_views(&mut self, tip_id: i32) -> Result<Tip, AppError> {
        diesel::update(tips::table.find(tip_id))
            .set(tips::view_count.eq(tips::view_count + 1))
            .returning(Tip::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting tip view:"))
    }

    /// Applies one engagement action for the customer and moves the tip's
    /// counters by what actually changed.
    pub fn engage_tip(
        &mut self,
        tip_id: i32,
        customer_id: i32,
        action: EngagementAction,
        notes: Option<String>,
        rating: Option<i32>,
    ) -> Result<EngagementOutcome, AppError> {
        self.connection.transaction::<_, AppError, _>(|conn| {
            let at = now();
            diesel::insert_or_ignore_into(tip_engagements::table)
                .values(&NewTipEngagement {
                    uuid: new_uuid(),
                    tip_id,
                    customer_id,
                    created_at: at,
                    updated_at: at,
                })
                .execute(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While opening engagement:"))?;

            let existing: TipEngagement = tip_engagements::table
                .filter(tip_engagements::tip_id.eq(tip_id))
                .filter(tip_engagements::customer_id.eq(customer_id))
                .select(TipEngagement::as_select())
                .first(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While loading engagement:"))?;

            let mut state = TipEngagementState {
                viewed: existing.viewed,
                liked: existing.liked,
                bookmarked: existing.bookmarked,
                implemented: existing.implemented,
                viewed_at: existing.viewed_at,
                liked_at: existing.liked_at,
                bookmarked_at: existing.bookmarked_at,
                implemented_at: existing.implemented_at,
                implementation_notes: existing.implementation_notes.clone(),
                implementation_rating: existing.implementation_rating,
                updated_at: existing.updated_at,
            };
            let delta = apply_action(&mut state, action, notes, rating, at);

            let engagement = diesel::update(tip_engagements::table.find(existing.id))
                .set(&state)
                .returning(TipEngagement::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While saving engagement:"))?;

            let tip = diesel::update(tips::table.find(tip_id))
                .set((
                    tips::view_count.eq(tips::view_count + delta.views),
                    tips::like_count.eq(tips::like_count + delta.likes),
                    tips::implementation_count.eq(tips::implementation_count + delta.implementations),
                ))
                .returning(Tip::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While updating tip counters:"))?;

            Ok(EngagementOutcome { tip, engagement })
        })
    }
}
