use super::{record_activity, ActivityEntry};
use crate::{
    modules::api::{
        filters::{AuthUser, ClientInfo},
        models::{validated, LoginBody, RegisterBody},
        responder::{respond, respond_with},
        ApiContext,
    },
    shared::{
        config::AuthConfig,
        db::{
            models::{Customer, NewPersonalAccessToken, NewUser, Role, User},
            DBAccessManager,
        },
        errors::{AppError, ErrorMessage, ErrorType},
        security::{generate_jwt, hash_password, verify_password},
        utils::{new_uuid, now},
    },
};
use cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use serde::Serialize;
use serde_json::json;
use warp::{
    http::{header, HeaderValue, StatusCode},
    reply::Response,
    Rejection,
};

/// A user with everything the frontend needs to gate its views.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Role>,
    pub permissions: Vec<String>,
    pub customer: Option<Customer>,
}

pub fn load_profile(db: &mut DBAccessManager, user: User) -> Result<UserProfile, AppError> {
    let roles = db.roles_of_user(user.id)?;
    let mut permissions: Vec<String> = db.permissions_of_user(user.id)?.into_iter().collect();
    permissions.sort();
    let customer = db.customer_for_user(user.id)?;
    Ok(UserProfile {
        user,
        roles,
        permissions,
        customer,
    })
}

fn issue_token(db: &mut DBAccessManager, config: &AuthConfig, user: &User) -> Result<String, AppError> {
    let issued_at = now();
    let token_id = new_uuid();
    let token = generate_jwt(
        &user.uuid,
        &token_id,
        &config.jwt_secret,
        issued_at.and_utc().timestamp(),
        config.token_ttl_secs,
    )
    .map_err(|err| {
        AppError::new(
            &format!("Internal Error: token could not be signed: {}", err),
            ErrorType::Internal,
        )
    })?;
    db.store_token(NewPersonalAccessToken {
        user_id: user.id,
        token_id,
        name: String::from("auth_token"),
        expires_at: issued_at + chrono::Duration::seconds(config.token_ttl_secs as i64),
        created_at: issued_at,
    })?;
    Ok(token)
}

fn session_cookie(config: &AuthConfig, token: &str) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.token_ttl_secs as i64))
        .build()
}

fn with_cookie(mut res: Response, cookie: Cookie<'_>) -> Result<Response, Rejection> {
    let value = HeaderValue::from_str(&cookie.to_string()).map_err(|err| {
        AppError::new(
            &format!("Internal Error: invalid cookie: {}", err),
            ErrorType::Internal,
        )
    })?;
    res.headers_mut().append(header::SET_COOKIE, value);
    Ok(res)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "User registered successfully"),
        (status = 422, description = "Validation errors", body = ErrorMessage),
        (status = 429, description = "Too many attempts", body = ErrorMessage),
    )
)]
pub async fn register(
    body: RegisterBody,
    client: ClientInfo,
    ctx: ApiContext,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let email = body.email.trim().to_lowercase();
    if db.email_taken(&email)? {
        return Err(AppError::field("email", "The email has already been taken.").into());
    }

    let at = now();
    let user = db.create_user(NewUser {
        uuid: new_uuid(),
        full_name: body.name.trim().to_string(),
        email,
        password: hash_password(&body.password)?,
        role: String::from("customer"),
        phone: body.phone,
        address: body.address,
        is_active: true,
        created_at: at,
        updated_at: at,
    })?;
    if let Some(role) = db.find_role_by_slug("customer")? {
        db.attach_role(user.id, role.id)?;
    }

    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(user.id),
            subject_type: "user",
            subject_id: user.id,
            activity_type: "user_registered",
            action: "create",
            description: String::from("New user registered"),
            properties: Some(json!({ "email": user.email })),
        },
        &client,
    );
    log::info!("Registered user {}", user.email);

    let token = issue_token(&mut db, &ctx.configs.auth, &user)?;
    let profile = load_profile(&mut db, user)?;
    respond_with(
        json!({ "user": profile, "token": token }),
        "User registered successfully",
        StatusCode::CREATED,
    )
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials", body = ErrorMessage),
        (status = 403, description = "Account is inactive", body = ErrorMessage),
        (status = 422, description = "Validation errors", body = ErrorMessage),
    )
)]
pub async fn login(
    body: LoginBody,
    client: ClientInfo,
    ctx: ApiContext,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    let body = validated(body)?;
    let email = body.email.trim().to_lowercase();

    let user = match db.find_user_by_email(&email)? {
        Some(user) if verify_password(&body.password, &user.password) => user,
        _ => {
            log::warn!("Failed login for {}", email);
            return Err(AppError::new("Invalid credentials", ErrorType::AuthError).into());
        }
    };
    if !user.is_active {
        log::warn!("Login of inactive account {}", email);
        return Err(AppError::new("Account is inactive", ErrorType::Forbidden).into());
    }

    let user = db.record_login(user.id, client.ip.clone())?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(user.id),
            subject_type: "user",
            subject_id: user.id,
            activity_type: "user_login",
            action: "login",
            description: String::from("User logged in"),
            properties: None,
        },
        &client,
    );

    let token = issue_token(&mut db, &ctx.configs.auth, &user)?;
    let profile = load_profile(&mut db, user)?;
    let res = respond_with(
        json!({ "user": profile, "token": token }),
        "Login successful",
        StatusCode::OK,
    )?;
    with_cookie(res, session_cookie(&ctx.configs.auth, &token))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user with roles and permissions"),
        (status = 401, description = "Unauthenticated", body = ErrorMessage),
    )
)]
pub async fn me(auth: AuthUser, mut db: DBAccessManager) -> Result<Response, Rejection> {
    respond(load_profile(&mut db, auth.user), StatusCode::OK)
}

pub async fn logout(
    auth: AuthUser,
    client: ClientInfo,
    ctx: ApiContext,
    mut db: DBAccessManager,
) -> Result<Response, Rejection> {
    db.revoke_token(&auth.token_id)?;
    record_activity(
        &mut db,
        ActivityEntry {
            user_id: Some(auth.user.id),
            subject_type: "user",
            subject_id: auth.user.id,
            activity_type: "user_logout",
            action: "logout",
            description: String::from("User logged out"),
            properties: None,
        },
        &client,
    );

    let mut removal = Cookie::build((ctx.configs.auth.cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .build();
    removal.make_removal();
    let res = crate::modules::api::responder::respond_message("Logged out successfully")?;
    with_cookie(res, removal)
}

pub async fn refresh(auth: AuthUser, ctx: ApiContext, mut db: DBAccessManager) -> Result<Response, Rejection> {
    db.revoke_token(&auth.token_id)?;
    let token = issue_token(&mut db, &ctx.configs.auth, &auth.user)?;
    let profile = load_profile(&mut db, auth.user)?;
    let res = respond_with(
        json!({ "user": profile, "token": token }),
        "Token refreshed successfully",
        StatusCode::OK,
    )?;
    with_cookie(res, session_cookie(&ctx.configs.auth, &token))
}
