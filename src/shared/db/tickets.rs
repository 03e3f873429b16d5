use super::{
    models::{
        NewSupportTicket, NewTicketAttachment, NewTicketMessage, SupportTicket, TicketAttachment,
        TicketChangeset, TicketMessage,
    },
    schema::{support_tickets, ticket_attachments, ticket_messages},
    DBAccessManager, Page, PageRequest,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::{prelude::*, sqlite::Sqlite};

#[derive(Debug, Default, Clone)]
pub struct TicketFilter {
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

fn tickets_query(filter: &TicketFilter) -> support_tickets::BoxedQuery<'static, Sqlite> {
    let mut query = support_tickets::table
        .filter(support_tickets::deleted_at.is_null())
        .into_boxed();
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(support_tickets::customer_id.eq(customer_id));
    }
    if let Some(assigned_to) = filter.assigned_to {
        query = query.filter(support_tickets::assigned_to.eq(assigned_to));
    }
    if let Some(status) = &filter.status {
        query = query.filter(support_tickets::status.eq(status.clone()));
    }
    if let Some(category) = &filter.category {
        query = query.filter(support_tickets::category.eq(category.clone()));
    }
    if let Some(priority) = &filter.priority {
        query = query.filter(support_tickets::priority.eq(priority.clone()));
    }
    query
}

impl DBAccessManager {
    pub fn list_tickets(
        &mut self,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> Result<Page<SupportTicket>, AppError> {
        let total: i64 = tickets_query(filter)
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting tickets:"))?;
        let rows = tickets_query(filter)
            .order((support_tickets::opened_at.desc(), support_tickets::id.desc()))
            .limit(page.per_page)
            .offset(page.offset())
            .select(SupportTicket::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing tickets:"))?;
        Ok(Page::new(rows, total, page))
    }

    pub fn find_ticket_by_uuid(&mut self, uuid: &str) -> Result<Option<SupportTicket>, AppError> {
        support_tickets::table
            .filter(support_tickets::uuid.eq(uuid))
            .filter(support_tickets::deleted_at.is_null())
            .select(SupportTicket::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding ticket:"))
    }

    pub fn find_ticket_by_id(&mut self, id: i32) -> Result<Option<SupportTicket>, AppError> {
        support_tickets::table
            .find(id)
            .filter(support_tickets::deleted_at.is_null())
            .select(SupportTicket::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding ticket:"))
    }

    pub fn create_ticket(&mut self, new_ticket: NewSupportTicket) -> Result<SupportTicket, AppError> {
        diesel::insert_into(support_tickets::table)
            .values(&new_ticket)
            .returning(SupportTicket::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While creating ticket:"))
    }

    pub fn update_ticket(
        &mut self,
        ticket_id: i32,
        mut changes: TicketChangeset,
    ) -> Result<SupportTicket, AppError> {
        changes.updated_at = Some(now());
        diesel::update(support_tickets::table.find(ticket_id))
            .set(&changes)
            .returning(SupportTicket::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While updating ticket:"))
    }

    pub fn ticket_messages(
        &mut self,
        ticket_id: i32,
        include_internal: bool,
    ) -> Result<Vec<TicketMessage>, AppError> {
        let mut query: ticket_messages::BoxedQuery<'_, Sqlite> = ticket_messages::table
            .filter(ticket_messages::ticket_id.eq(ticket_id))
            .into_boxed();
        if !include_internal {
            query = query.filter(ticket_messages::is_internal.eq(false));
        }
        query
            .order((ticket_messages::created_at.asc(), ticket_messages::id.asc()))
            .select(TicketMessage::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading ticket messages:"))
    }

    pub fn add_ticket_message(&mut self, message: NewTicketMessage) -> Result<TicketMessage, AppError> {
        diesel::insert_into(ticket_messages::table)
            .values(&message)
            .returning(TicketMessage::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While adding ticket message:"))
    }

    pub fn ticket_attachments(&mut self, ticket_id: i32) -> Result<Vec<TicketAttachment>, AppError> {
        ticket_attachments::table
            .filter(ticket_attachments::ticket_id.eq(ticket_id))
            .order(ticket_attachments::id.asc())
            .select(TicketAttachment::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading ticket attachments:"))
    }

    pub fn add_ticket_attachment(
        &mut self,
        attachment: NewTicketAttachment,
    ) -> Result<TicketAttachment, AppError> {
        diesel::insert_into(ticket_attachments::table)
            .values(&attachment)
            .returning(TicketAttachment::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While adding ticket attachment:"))
    }
}
