use super::ApiContext;
use crate::shared::{
    config::RateLimitSettings,
    db::{
        get_db_access_manager,
        models::{Customer, User},
        DBAccessManager, DbPool,
    },
    errors::{AppError, ErrorType},
    security::decode_jwt,
};
use cookie::Cookie;
use serde::de::DeserializeOwned;
use std::{collections::HashSet, convert::Infallible, net::SocketAddr};
use warp::{
    filters::BoxedFilter,
    http::{header, Method},
    Filter, Rejection,
};
use warp_rate_limit::{with_rate_limit, RateLimitConfig, RateLimitInfo};

pub fn with_context(ctx: ApiContext) -> impl Filter<Extract = (ApiContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

pub fn with_json_body<T: DeserializeOwned + Send>(
    limit: u64,
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(limit).and(warp::body::json())
}

pub fn with_cors(origin: Option<&str>) -> warp::filters::cors::Cors {
    let cors = warp::cors()
        .allow_headers(vec![
            header::CONTENT_TYPE.as_str(),
            header::AUTHORIZATION.as_str(),
            "X-Device-Secret",
        ])
        .allow_methods(&[
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]);
    match origin {
        Some(origin) => cors.allow_origin(origin).allow_credentials(true).build(),
        None => cors.allow_any_origin().build(),
    }
}

pub fn with_db_access_manager(
    pool: DbPool,
) -> impl Filter<Extract = (DBAccessManager,), Error = Rejection> + Clone {
    warp::any()
        .map(move || pool.clone())
        .and_then(|pool: DbPool| async move {
            get_db_access_manager(pool).map_err(warp::reject::custom)
        })
}

/// Per-client limiter for the public auth routes; a pass-through when
/// disabled.
pub fn rate_limited(settings: &RateLimitSettings) -> BoxedFilter<()> {
    if !settings.enabled {
        return warp::any().boxed();
    }
    let config = RateLimitConfig::max_per_window(settings.max_requests, settings.window_secs);
    with_rate_limit(config)
        .map(|_info: RateLimitInfo| ())
        .untuple_one()
        .boxed()
}

#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

pub fn with_client_info() -> impl Filter<Extract = (ClientInfo,), Error = Rejection> + Clone {
    warp::addr::remote()
        .and(warp::header::optional::<String>("x-forwarded-for"))
        .and(warp::header::optional::<String>("user-agent"))
        .map(
            |remote: Option<SocketAddr>, forwarded: Option<String>, user_agent: Option<String>| {
                let forwarded = forwarded
                    .as_deref()
                    .and_then(|value| value.split(',').next())
                    .map(|ip| ip.trim().to_string())
                    .filter(|ip| !ip.is_empty());
                ClientInfo {
                    ip: forwarded.or_else(|| remote.map(|addr| addr.ip().to_string())),
                    user_agent,
                }
            },
        )
}

/// The caller behind a verified token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token_id: String,
    pub permissions: HashSet<String>,
    pub customer: Option<Customer>,
}

impl AuthUser {
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn require(&self, permission: &str) -> Result<(), AppError> {
        if self.can(permission) {
            return Ok(());
        }
        Err(AppError::new(
            &format!("Unauthorized. Required permission: {}", permission),
            ErrorType::Forbidden,
        ))
    }

    pub fn customer_id(&self) -> Option<i32> {
        self.customer.as_ref().map(|customer| customer.id)
    }

    /// `None` when the caller holds `staff_permission` and sees every
    /// customer's rows, otherwise the caller's own customer id.
    pub fn customer_scope(&self, staff_permission: &str) -> Result<Option<i32>, AppError> {
        if self.can(staff_permission) {
            return Ok(None);
        }
        match self.customer_id() {
            Some(id) => Ok(Some(id)),
            None => Err(AppError::new(
                &format!("Unauthorized. Required permission: {}", staff_permission),
                ErrorType::Forbidden,
            )),
        }
    }
}

/// An explicit bearer header wins over the session cookie.
pub fn token_from_headers(
    cookie_header: Option<&str>,
    authorization: Option<&str>,
    cookie_name: &str,
) -> Option<String> {
    let bearer = authorization
        .filter(|value| value.starts_with("Bearer "))
        .map(|value| value.trim_start_matches("Bearer ").trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    cookie_header?
        .split(';')
        .filter_map(|cookie| Cookie::parse(cookie.trim()).ok())
        .find(|parsed| parsed.name() == cookie_name && !parsed.value().is_empty())
        .map(|parsed| parsed.value().to_string())
}

pub fn authenticate(db: &mut DBAccessManager, secret: &str, token: &str) -> Result<AuthUser, AppError> {
    let claims = decode_jwt(token, secret).map_err(|err| {
        log::warn!("Rejected token: {}", err);
        AppError::unauthenticated()
    })?;

    let user = match db.find_user_by_uuid(&claims.sub)? {
        Some(user) if user.is_active => user,
        Some(_) => {
            log::warn!("Token of inactive user {} rejected", claims.sub);
            return Err(AppError::unauthenticated());
        }
        None => {
            log::warn!("Token of unknown user {} rejected", claims.sub);
            return Err(AppError::unauthenticated());
        }
    };

    if !db.touch_token(&claims.jti, user.id)? {
        log::warn!("Revoked or expired token {} presented by {}", claims.jti, user.email);
        return Err(AppError::unauthenticated());
    }

    let permissions = db.permissions_of_user(user.id)?;
    let customer = db.customer_for_user(user.id)?;
    Ok(AuthUser {
        user,
        token_id: claims.jti,
        permissions,
        customer,
    })
}

pub fn with_auth(ctx: ApiContext) -> impl Filter<Extract = (AuthUser,), Error = Rejection> + Clone {
    warp::header::optional::<String>("cookie")
        .and(warp::header::optional::<String>("authorization"))
        .and(with_context(ctx))
        .and_then(
            |cookie_header: Option<String>, authorization: Option<String>, ctx: ApiContext| async move {
                let token = token_from_headers(
                    cookie_header.as_deref(),
                    authorization.as_deref(),
                    &ctx.configs.auth.cookie_name,
                )
                .ok_or_else(|| {
                    log::warn!("Request without credentials");
                    warp::reject::custom(AppError::unauthenticated())
                })?;
                let mut db = get_db_access_manager(ctx.pool.clone())?;
                authenticate(&mut db, &ctx.configs.auth.jwt_secret, &token).map_err(warp::reject::custom)
            },
        )
}

/// `with_auth` plus a permission gate.
pub fn with_permission(
    ctx: ApiContext,
    permission: &'static str,
) -> impl Filter<Extract = (AuthUser,), Error = Rejection> + Clone {
    with_auth(ctx).and_then(move |auth: AuthUser| async move {
        auth.require(permission).map_err(warp::reject::custom)?;
        Ok::<_, Rejection>(auth)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let token = token_from_headers(
            Some("theme=dark; session=from-cookie"),
            Some("Bearer from-header"),
            "session",
        );
        assert_eq!(token.as_deref(), Some("from-header"));

        let token = token_from_headers(Some("theme=dark; session=from-cookie"), Some("Basic abc"), "session");
        assert_eq!(token.as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_header_is_stripped() {
        let token = token_from_headers(None, Some("Bearer abc.def"), "session");
        assert_eq!(token.as_deref(), Some("abc.def"));
        assert!(token_from_headers(None, Some("Basic abc"), "session").is_none());
        assert!(token_from_headers(Some("session="), None, "session").is_none());
    }
}
