use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::errors::ApiError;
use crate::model::role::Role;
use crate::models::TokenType;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use sqlx::MySqlPool;

/// Bearer-token gate for the protected API scope. Verifies the access token,
/// then resolves the subject against the users table so a token for a
/// deleted or deactivated account is rejected, not trusted.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req.app_data::<Data<Config>>().ok_or_else(|| {
        tracing::error!("App config missing from auth middleware");
        ApiError::Internal
    })?;

    let pool = req.app_data::<Data<MySqlPool>>().ok_or_else(|| {
        tracing::error!("DB pool missing from auth middleware");
        ApiError::Internal
    })?;

    let header_value = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Invalid Authorization header encoding"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Authorization header must start with Bearer"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;

    if claims.token_type != TokenType::Access {
        return Err(ApiError::unauthenticated("Access token required").into());
    }

    let row = sqlx::query_as::<_, (u64, String, u8, bool)>(
        r#"
        SELECT id, username, role_id, is_active
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(claims.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::from)?;

    let (user_id, username, role_id, is_active) = match row {
        Some(r) => r,
        None => {
            return Err(
                ApiError::unauthenticated("The user belonging to this token no longer exists")
                    .into(),
            );
        }
    };

    if !is_active {
        return Err(ApiError::unauthenticated("This account has been deactivated").into());
    }

    let role = Role::from_id(role_id).ok_or_else(|| ApiError::unauthenticated("Invalid role"))?;

    req.extensions_mut().insert(AuthUser {
        user_id,
        username,
        role,
    });

    next.call(req).await
}
