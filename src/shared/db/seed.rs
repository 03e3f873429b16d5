//! Idempotent catalogue of roles, permissions and reference pricing.

use super::{
    json::Json,
    models::{NewPermission, NewPricingTier, NewRole, NewUser},
    DBAccessManager,
};
use crate::shared::{
    billing::default_tiers,
    config::SeedConfig,
    errors::{AppError, ErrorType},
    security::hash_password,
    utils::{new_uuid, now},
};
use serde::Serialize;

/// (name, slug, description, category)
pub const PERMISSIONS: &[(&str, &str, &str, &str)] = &[
    ("View Dashboard", "dashboard.view", "View dashboard page", "dashboard"),
    ("View Analytics", "dashboard.analytics", "View analytics data", "dashboard"),
    ("View Users", "users.view", "View users list", "users"),
    ("Create Users", "users.create", "Create new users", "users"),
    ("Edit Users", "users.edit", "Edit existing users", "users"),
    ("Delete Users", "users.delete", "Delete users", "users"),
    ("View Customers", "customers.view", "View customers list", "customers"),
    ("Create Customers", "customers.create", "Create new customers", "customers"),
    ("Edit Customers", "customers.edit", "Edit existing customers", "customers"),
    ("Delete Customers", "customers.delete", "Delete customers", "customers"),
    ("View Properties", "properties.view", "View properties list", "properties"),
    ("Create Properties", "properties.create", "Create new properties", "properties"),
    ("Edit Properties", "properties.edit", "Edit existing properties", "properties"),
    ("Delete Properties", "properties.delete", "Delete properties", "properties"),
    ("View Devices", "devices.view", "View devices list", "devices"),
    ("Create Devices", "devices.create", "Create new devices", "devices"),
    ("Edit Devices", "devices.edit", "Edit existing devices", "devices"),
    ("Delete Devices", "devices.delete", "Delete devices", "devices"),
    ("View Water Usage", "water-usage.view", "View water usage data", "water-usage"),
    ("Export Water Usage", "water-usage.export", "Export water usage reports", "water-usage"),
    ("View Payments", "payments.view", "View payments list", "payments"),
    ("Process Payments", "payments.process", "Process payment transactions", "payments"),
    ("Refund Payments", "payments.refund", "Refund payments", "payments"),
    ("View Vouchers", "vouchers.view", "View vouchers list", "vouchers"),
    ("Create Vouchers", "vouchers.create", "Create new vouchers", "vouchers"),
    ("Edit Vouchers", "vouchers.edit", "Edit existing vouchers", "vouchers"),
    ("Delete Vouchers", "vouchers.delete", "Delete vouchers", "vouchers"),
    ("View Tickets", "tickets.view", "View support tickets", "tickets"),
    ("Create Tickets", "tickets.create", "Create new tickets", "tickets"),
    ("Assign Tickets", "tickets.assign", "Assign tickets to technicians", "tickets"),
    ("Resolve Tickets", "tickets.resolve", "Resolve support tickets", "tickets"),
    ("View Roles", "roles.view", "View roles list", "roles"),
    ("Create Roles", "roles.create", "Create new roles", "roles"),
    ("Edit Roles", "roles.edit", "Edit existing roles", "roles"),
    ("Delete Roles", "roles.delete", "Delete roles", "roles"),
    ("View Work Orders", "work-orders.view", "View work orders list", "work-orders"),
    ("Create Work Orders", "work-orders.create", "Create new work orders", "work-orders"),
    ("Assign Work Orders", "work-orders.assign", "Assign work orders to technicians", "work-orders"),
    ("Complete Work Orders", "work-orders.complete", "Complete work orders", "work-orders"),
    ("View Reports", "reports.view", "View reports", "reports"),
    ("Export Reports", "reports.export", "Export reports", "reports"),
    ("View Settings", "settings.view", "View settings", "settings"),
    ("Edit Settings", "settings.edit", "Edit settings", "settings"),
    ("Create Tips", "tips.create", "Create conservation tips", "tips"),
    ("Edit Tips", "tips.edit", "Edit conservation tips", "tips"),
    ("Delete Tips", "tips.delete", "Delete conservation tips", "tips"),
    ("View Pricing", "pricing.view", "View pricing tiers", "pricing"),
    ("Manage Pricing", "pricing.manage", "Manage pricing tiers", "pricing"),
];

/// (name, slug, description)
pub const ROLES: &[(&str, &str, &str)] = &[
    ("Administrator", "admin", "Full system access with all permissions"),
    ("Technician", "technician", "Field technician for device installation and maintenance"),
    ("Customer", "customer", "Regular customer with limited access"),
];

const TECHNICIAN_CATEGORIES: &[&str] = &[
    "dashboard",
    "customers",
    "properties",
    "devices",
    "work-orders",
    "tickets",
];

const CUSTOMER_PERMISSIONS: &[&str] = &[
    "dashboard.view",
    "water-usage.view",
    "payments.view",
    "tickets.view",
    "tickets.create",
];

#[derive(Debug, Serialize)]
pub struct SeedReport {
    pub permissions: usize,
    pub roles: usize,
}

pub fn seed_rbac(db: &mut DBAccessManager) -> Result<SeedReport, AppError> {
    let at = now();
    let mut all_ids = Vec::with_capacity(PERMISSIONS.len());
    let mut technician_ids = Vec::new();
    let mut customer_ids = Vec::new();

    for (name, slug, description, category) in PERMISSIONS {
        let id = db.ensure_permission(NewPermission {
            uuid: new_uuid(),
            name: name.to_string(),
            slug: slug.to_string(),
            category: category.to_string(),
            description: Some(description.to_string()),
            is_active: true,
            created_at: at,
            updated_at: at,
        })?;
        all_ids.push(id);
        if TECHNICIAN_CATEGORIES.contains(category) {
            technician_ids.push(id);
        }
        if CUSTOMER_PERMISSIONS.contains(slug) {
            customer_ids.push(id);
        }
    }

    for (name, slug, description) in ROLES {
        let role = db.ensure_role(NewRole {
            uuid: new_uuid(),
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
            is_system_role: true,
            is_active: true,
            metadata: None,
            created_at: at,
            updated_at: at,
        })?;
        let grants = match *slug {
            "admin" => &all_ids,
            "technician" => &technician_ids,
            _ => &customer_ids,
        };
        db.grant_permissions(role.id, grants)?;
    }

    log::info!(
        "RBAC catalogue ready: {} permissions, {} roles",
        PERMISSIONS.len(),
        ROLES.len()
    );
    Ok(SeedReport {
        permissions: PERMISSIONS.len(),
        roles: ROLES.len(),
    })
}

/// Creates the configured administrator unless the email is already taken.
pub fn seed_admin(db: &mut DBAccessManager, config: &SeedConfig) -> Result<(), AppError> {
    if config.admin_email.trim().is_empty() || config.admin_password.is_empty() {
        return Ok(());
    }
    if db.email_taken(&config.admin_email)? {
        return Ok(());
    }
    let at = now();
    let user = db.create_user(NewUser {
        uuid: new_uuid(),
        full_name: config.admin_name.clone(),
        email: config.admin_email.clone(),
        password: hash_password(&config.admin_password)?,
        role: String::from("admin"),
        phone: None,
        address: None,
        is_active: true,
        created_at: at,
        updated_at: at,
    })?;
    if let Some(role) = db.find_role_by_slug("admin")? {
        db.attach_role(user.id, role.id)?;
    }
    log::info!("Seeded administrator {}", user.email);
    Ok(())
}

/// Installs the reference tiers for every customer tier lacking an active one.
/// Returns how many tiers were created.
pub fn seed_default_pricing(db: &mut DBAccessManager) -> Result<usize, AppError> {
    let mut created = 0;
    for (tier_name, customer_tier, ranges, admin_fee, minimum_charge) in default_tiers() {
        if db.active_tier_for(customer_tier)?.is_some() {
            continue;
        }
        let model = if ranges.len() > 1 { "tiered" } else { "flat" };
        let price_ranges = serde_json::to_value(&ranges).map_err(|err| {
            AppError::new(
                &format!("Error serializing price ranges: {}", err),
                ErrorType::Internal,
            )
        })?;
        let at = now();
        db.create_pricing_tier(NewPricingTier {
            uuid: new_uuid(),
            tier_name: tier_name.to_string(),
            customer_tier: customer_tier.to_string(),
            pricing_model: model.to_string(),
            price_ranges: Json(price_ranges),
            admin_fee,
            minimum_charge,
            description: None,
            is_active: true,
            created_at: at,
            updated_at: at,
        })?;
        created += 1;
    }
    Ok(created)
}
