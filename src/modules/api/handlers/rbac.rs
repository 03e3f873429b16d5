use super::{found, record_activity, ActivityEntry};
use crate::{
    modules::api::{
        filters::{AuthUser, ClientInfo},
        models::{validated, AssignRolesBody, CreateRoleBody, UpdateRoleBody},
        responder::{respond, respond_message, respond_with},
    },
    shared::{
        db::{
            models::{NewRole, Permission, Role, RoleChangeset},
            seed::seed_rbac,
            DBAccessManager,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        utils::{new_uuid, now},
    },
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use warp::{http::StatusCode, reply::Response, Rejection};

#[derive(Debug, Serialize)]
pub struct RoleView {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub users_count: i64,
}

fn role_views(db: &mut DBAccessManager, roles: Vec<Role>) -> Result<Vec<RoleView>, AppError> {
    let ids: Vec<i32> = roles.iter().map(|role| role.id).collect();
    let mut permissions = db.permissions_by_role(&ids)?;
    let counts = db.count_users_by_role(&ids)?;
    Ok(roles
        .into_iter()
        .map(|role| RoleView {
            permissions: permissions.remove(&role.id).unwrap_or_default(),
            users_count: counts.get(&role.id).copied().unwrap_or(0),
            role,
        })
        .collect())
}

fn role_view(db: &mut DBAccessManager, role: Role) -> Result<RoleView, AppError> {
    role_views(db, vec![role])?
        .pop()
        .ok_or_else(|| AppError::not_found("Role"))
}

/// "Field Supervisor" -> "field-supervisor"
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

#[utoipa::path(
    get,
    path = "/api/roles/list",
    responses(
        (status = 200, description = "Roles with permissions and user counts"),
        (status = 403, description = "Missing roles.view", body = ErrorMessage),
    )
)]
pub async fn list_roles(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let roles = db.list_roles()?;
    respond(role_views(&mut db, roles), StatusCode::OK)
}

pub async fn list_permissions(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let mut grouped: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for permission in db.list_permissions()? {
        grouped
            .entry(permission.category.clone())
            .or_default()
            .push(permission);
    }
    respond(Ok(grouped), StatusCode::OK)
}

pub async fn create_role(
    auth: AuthUser,
    body: CreateRoleBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let slug = body
        .slug
        .as_deref()
        .map(slugify)
        .unwrap_or_else(|| slugify(&body.name));
    if slug.is_empty() {
        return Err(AppError::field("slug", "The slug field is required.").into());
    }
    if db.find_role_by_slug(&slug)?.is_some() {
        return Err(AppError::field("slug", "The slug has already been taken.").into());
    }

    let at = now();
    let role = db.create_role(
        NewRole {
            uuid: new_uuid(),
            name: body.name.trim().to_string(),
            slug,
            description: body.description,
            is_system_role: false,
            is_active: body.is_active.unwrap_or(true),
            metadata: None,
            created_at: at,
            updated_at: at,
        },
        &body.permissions,
    )?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "role",
            subject_id: role.id,
            activity_type: "role_created",
            action: "create",
            description: format!("Role {} created", role.name),
            properties: Some(json!({ "permissions": body.permissions })),
        },
        &client,
    );
    let view = role_view(&mut db, role)?;
    respond_with(view, "Role created successfully", StatusCode::CREATED)
}

pub async fn update_role(
    uuid: String,
    auth: AuthUser,
    body: UpdateRoleBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let role = found(db.find_role_by_uuid(&uuid)?, "Role")?;

    let slug = match body.slug.as_deref().map(slugify) {
        Some(_) if role.is_system_role => None,
        Some(slug) if slug != role.slug => {
            if db.find_role_by_slug(&slug)?.is_some() {
                return Err(AppError::field("slug", "The slug has already been taken.").into());
            }
            Some(slug)
        }
        _ => None,
    };

    let role = db.update_role(
        role.id,
        RoleChangeset {
            name: body.name.map(|name| name.trim().to_string()),
            slug,
            description: body.description,
            is_active: body.is_active,
            updated_at: now(),
        },
        body.permissions.as_deref(),
    )?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "role",
            subject_id: role.id,
            activity_type: "role_updated",
            action: "update",
            description: format!("Role {} updated", role.name),
            properties: None,
        },
        &client,
    );
    let view = role_view(&mut db, role)?;
    respond_with(view, "Role updated successfully", StatusCode::OK)
}

pub async fn delete_role(
    uuid: String,
    auth: AuthUser,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let role = found(db.find_role_by_uuid(&uuid)?, "Role")?;
    if role.is_system_role {
        return Err(AppError::new("System roles cannot be deleted", ErrorType::Forbidden).into());
    }
    db.soft_delete_role(role.id)?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "role",
            subject_id: role.id,
            activity_type: "role_deleted",
            action: "delete",
            description: format!("Role {} deleted", role.name),
            properties: None,
        },
        &client,
    );
    respond_message("Role deleted successfully")
}

pub async fn assign_roles(
    auth: AuthUser,
    body: AssignRolesBody,
    client: ClientInfo,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let user = found(db.find_user_by_id(body.user_id)?, "User")?;
    let roles = db.assign_roles(user.id, &body.role_ids)?;

    // the legacy column follows the first assigned role
    if let Some(primary) = roles.first() {
        db.set_user_role(user.id, &primary.slug)?;
    }
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "user",
            subject_id: user.id,
            activity_type: "roles_assigned",
            action: "update",
            description: format!("Roles of {} replaced", user.email),
            properties: Some(json!({ "role_ids": body.role_ids })),
        },
        &client,
    );
    respond_with(
        json!({ "user": user, "roles": roles }),
        "Roles assigned successfully",
        StatusCode::OK,
    )
}

pub async fn users_detailed(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let users = db.users_with_roles()?;
    let mut rows = Vec::with_capacity(users.len());
    for (user, roles) in users {
        let mut permissions: Vec<String> = db.permissions_of_user(user.id)?.into_iter().collect();
        permissions.sort();
        rows.push(json!({ "user": user, "roles": roles, "permissions": permissions }));
    }
    respond(Ok(rows), StatusCode::OK)
}

pub async fn initialize(_auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    let report = seed_rbac(&mut db)?;
    respond_with(report, "Default roles and permissions initialized", StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(slugify("Field Supervisor"), "field-supervisor");
        assert_eq!(slugify("  Billing / Ops  "), "billing-ops");
        assert_eq!(slugify("!!!"), "");
    }
}
