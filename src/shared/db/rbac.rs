use super::{
    models::{NewPermission, NewRole, NewRolePermission, NewUserRole, Permission, Role, RoleChangeset, User},
    schema::{permissions, role_permissions, roles, user_roles, users},
    DBAccessManager,
};
use crate::shared::{errors::AppError, utils::now};
use diesel::prelude::*;
use std::collections::{HashMap, HashSet};

impl DBAccessManager {
    pub fn roles_of_user(&mut self, user_id: i32) -> Result<Vec<Role>, AppError> {
        user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq(user_id))
            .filter(roles::deleted_at.is_null())
            .filter(roles::is_active.eq(true))
            .order(roles::id.asc())
            .select(Role::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading user roles:"))
    }

    pub fn permissions_of_user(&mut self, user_id: i32) -> Result<HashSet<String>, AppError> {
        let slugs: Vec<String> = user_roles::table
            .inner_join(roles::table.inner_join(role_permissions::table.inner_join(permissions::table)))
            .filter(user_roles::user_id.eq(user_id))
            .filter(roles::deleted_at.is_null())
            .filter(roles::is_active.eq(true))
            .filter(permissions::is_active.eq(true))
            .select(permissions::slug)
            .distinct()
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading user permissions:"))?;
        Ok(slugs.into_iter().collect())
    }

    pub fn list_roles(&mut self) -> Result<Vec<Role>, AppError> {
        roles::table
            .filter(roles::deleted_at.is_null())
            .order(roles::id.asc())
            .select(Role::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing roles:"))
    }

    pub fn list_permissions(&mut self) -> Result<Vec<Permission>, AppError> {
        permissions::table
            .order((permissions::category.asc(), permissions::id.asc()))
            .select(Permission::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing permissions:"))
    }

    /// Permissions carried by each of `role_ids`.
    pub fn permissions_by_role(
        &mut self,
        role_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<Permission>>, AppError> {
        let rows: Vec<(i32, Permission)> = role_permissions::table
            .inner_join(permissions::table)
            .filter(role_permissions::role_id.eq_any(role_ids))
            .order(permissions::id.asc())
            .select((role_permissions::role_id, Permission::as_select()))
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading role permissions:"))?;

        let mut grouped: HashMap<i32, Vec<Permission>> = HashMap::new();
        for (role_id, permission) in rows {
            grouped.entry(role_id).or_default().push(permission);
        }
        Ok(grouped)
    }

    pub fn count_users_by_role(&mut self, role_ids: &[i32]) -> Result<HashMap<i32, i64>, AppError> {
        let rows: Vec<(i32, i64)> = user_roles::table
            .inner_join(users::table)
            .filter(user_roles::role_id.eq_any(role_ids))
            .filter(users::deleted_at.is_null())
            .group_by(user_roles::role_id)
            .select((user_roles::role_id, diesel::dsl::count_star()))
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While counting role users:"))?;
        Ok(rows.into_iter().collect())
    }

    pub fn find_role_by_uuid(&mut self, uuid: &str) -> Result<Option<Role>, AppError> {
        roles::table
            .filter(roles::uuid.eq(uuid))
            .filter(roles::deleted_at.is_null())
            .select(Role::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding role:"))
    }

    pub fn find_role_by_slug(&mut self, slug: &str) -> Result<Option<Role>, AppError> {
        roles::table
            .filter(roles::slug.eq(slug))
            .filter(roles::deleted_at.is_null())
            .select(Role::as_select())
            .first(&mut self.connection)
            .optional()
            .map_err(|err| AppError::from_diesel_err(err, "While finding role:"))
    }

    fn existing_permission_ids(&mut self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        let found: Vec<i32> = permissions::table
            .filter(permissions::id.eq_any(ids))
            .select(permissions::id)
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While checking permissions:"))?;
        if found.len() != ids.iter().collect::<HashSet<_>>().len() {
            return Err(AppError::field(
                "permissions",
                "One or more selected permissions are invalid.",
            ));
        }
        Ok(found)
    }

    pub fn create_role(&mut self, new_role: NewRole, permission_ids: &[i32]) -> Result<Role, AppError> {
        let permission_ids = self.existing_permission_ids(permission_ids)?;
        self.connection.transaction::<_, AppError, _>(|conn| {
            let role = diesel::insert_into(roles::table)
                .values(&new_role)
                .returning(Role::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While creating role:"))?;
            sync_permissions(conn, role.id, &permission_ids)?;
            Ok(role)
        })
    }

    pub fn update_role(
        &mut self,
        role_id: i32,
        changes: RoleChangeset,
        permission_ids: Option<&[i32]>,
    ) -> Result<Role, AppError> {
        let permission_ids = match permission_ids {
            Some(ids) => Some(self.existing_permission_ids(ids)?),
            None => None,
        };
        self.connection.transaction::<_, AppError, _>(|conn| {
            let role = diesel::update(roles::table.find(role_id))
                .set(&changes)
                .returning(Role::as_returning())
                .get_result(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While updating role:"))?;
            if let Some(ids) = permission_ids {
                sync_permissions(conn, role.id, &ids)?;
            }
            Ok(role)
        })
    }

    pub fn soft_delete_role(&mut self, role_id: i32) -> Result<(), AppError> {
        diesel::update(roles::table.find(role_id))
            .set(roles::deleted_at.eq(Some(now())))
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While deleting role:"))?;
        Ok(())
    }

    /// Replaces the user's role set.
    pub fn assign_roles(&mut self, user_id: i32, role_ids: &[i32]) -> Result<Vec<Role>, AppError> {
        let unique: HashSet<i32> = role_ids.iter().copied().collect();
        let found: i64 = roles::table
            .filter(roles::id.eq_any(role_ids))
            .filter(roles::deleted_at.is_null())
            .count()
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While checking roles:"))?;
        if found as usize != unique.len() {
            return Err(AppError::field("role_ids", "One or more selected roles are invalid."));
        }

        let at = now();
        self.connection.transaction::<_, AppError, _>(|conn| {
            diesel::delete(user_roles::table.filter(user_roles::user_id.eq(user_id)))
                .execute(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While detaching roles:"))?;
            let rows: Vec<NewUserRole> = unique
                .iter()
                .map(|role_id| NewUserRole {
                    user_id,
                    role_id: *role_id,
                    created_at: at,
                    updated_at: at,
                })
                .collect();
            if rows.is_empty() {
                return Ok(());
            }
            diesel::insert_into(user_roles::table)
                .values(&rows)
                .execute(conn)
                .map_err(|err| AppError::from_diesel_err(err, "While attaching roles:"))?;
            Ok(())
        })?;
        self.roles_of_user(user_id)
    }

    pub fn attach_role(&mut self, user_id: i32, role_id: i32) -> Result<(), AppError> {
        let at = now();
        diesel::insert_or_ignore_into(user_roles::table)
            .values(&NewUserRole {
                user_id,
                role_id,
                created_at: at,
                updated_at: at,
            })
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While attaching role:"))?;
        Ok(())
    }

    pub fn users_with_roles(&mut self) -> Result<Vec<(User, Vec<Role>)>, AppError> {
        let all_users: Vec<User> = users::table
            .filter(users::deleted_at.is_null())
            .order(users::id.asc())
            .select(User::as_select())
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While listing users:"))?;
        let user_ids: Vec<i32> = all_users.iter().map(|u| u.id).collect();

        let rows: Vec<(i32, Role)> = user_roles::table
            .inner_join(roles::table)
            .filter(user_roles::user_id.eq_any(&user_ids))
            .filter(roles::deleted_at.is_null())
            .select((user_roles::user_id, Role::as_select()))
            .load(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While loading user roles:"))?;
        let mut by_user: HashMap<i32, Vec<Role>> = HashMap::new();
        for (user_id, role) in rows {
            by_user.entry(user_id).or_default().push(role);
        }

        Ok(all_users
            .into_iter()
            .map(|user| {
                let roles = by_user.remove(&user.id).unwrap_or_default();
                (user, roles)
            })
            .collect())
    }

    /// Inserts the permission when its slug is unknown; returns its id.
    pub fn ensure_permission(&mut self, permission: NewPermission) -> Result<i32, AppError> {
        diesel::insert_or_ignore_into(permissions::table)
            .values(&permission)
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While seeding permission:"))?;
        permissions::table
            .filter(permissions::slug.eq(&permission.slug))
            .select(permissions::id)
            .first(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While seeding permission:"))
    }

    /// Inserts the role when its slug is unknown; returns the stored row.
    pub fn ensure_role(&mut self, role: NewRole) -> Result<Role, AppError> {
        if let Some(existing) = self.find_role_by_slug(&role.slug)? {
            return Ok(existing);
        }
        diesel::insert_into(roles::table)
            .values(&role)
            .returning(Role::as_returning())
            .get_result(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While seeding role:"))
    }

    pub fn grant_permissions(&mut self, role_id: i32, permission_ids: &[i32]) -> Result<(), AppError> {
        let at = now();
        let rows: Vec<NewRolePermission> = permission_ids
            .iter()
            .map(|permission_id| NewRolePermission {
                role_id,
                permission_id: *permission_id,
                created_at: at,
                updated_at: at,
            })
            .collect();
        if rows.is_empty() {
            return Ok(());
        }
        diesel::insert_or_ignore_into(role_permissions::table)
            .values(&rows)
            .execute(&mut self.connection)
            .map_err(|err| AppError::from_diesel_err(err, "While granting permissions:"))?;
        Ok(())
    }
}

fn sync_permissions(
    conn: &mut diesel::sqlite::SqliteConnection,
    role_id: i32,
    permission_ids: &[i32],
) -> Result<(), AppError> {
    diesel::delete(role_permissions::table.filter(role_permissions::role_id.eq(role_id)))
        .execute(conn)
        .map_err(|err| AppError::from_diesel_err(err, "While syncing permissions:"))?;
    if permission_ids.is_empty() {
        return Ok(());
    }
    let at = now();
    let rows: Vec<NewRolePermission> = permission_ids
        .iter()
        .map(|permission_id| NewRolePermission {
            role_id,
            permission_id: *permission_id,
            created_at: at,
            updated_at: at,
        })
        .collect();
    diesel::insert_into(role_permissions::table)
        .values(&rows)
        .execute(conn)
        .map_err(|err| AppError::from_diesel_err(err, "While syncing permissions:"))?;
    Ok(())
}
