use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    errors::ApiError,
    model::role::Role,
    models::{LoginReqDto, TokenType, UserReq, UserSql},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::utils::username_cache;
use crate::utils::username_filter;

/// Public registration only ever grants the employee role; reviewer
/// accounts are provisioned by an administrator, not self-service.
fn validate_public_role(role_id: u8) -> Result<Role, ApiError> {
    match Role::from_id(role_id) {
        Some(Role::Employee) => Ok(Role::Employee),
        Some(_) => Err(ApiError::bad_request(
            "Reviewer roles cannot be self-registered",
        )),
        None => Err(ApiError::bad_request("Invalid role")),
    }
}

/// Inserts a new user and keeps the availability filter/cache populated.
async fn insert_user(
    username: &str,
    email: &str,
    password: &str,
    role_id: u8,
    pool: &MySqlPool,
) -> Result<(), ApiError> {
    let hashed = hash_password(password);

    let result = sqlx::query(
        r#"INSERT INTO users (username, email, password, role_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(username)
    .bind(email)
    .bind(hashed)
    .bind(role_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            username_filter::insert(username);
            username_cache::mark_taken(username).await;
            Ok(())
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Err(ApiError::bad_request("Username or email already exists"));
                }
            }
            error!(error = %e, "Failed to register user");
            Err(ApiError::Internal)
        }
    }
}

/// true  => username AVAILABLE
/// false => username TAKEN
pub async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let username = username.to_lowercase();

    // Cuckoo filter: fast negative
    if !username_filter::might_exist(&username) {
        return true;
    }

    // Moka cache: fast positive
    if username_cache::is_taken(&username).await {
        return false;
    }

    // Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(&username)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// User registration handler
pub async fn register(
    user: web::Json<UserReq>,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let username = user.username.trim();
    let email = user.email.trim();
    let password = &user.password;

    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ApiError::bad_request(
            "Username, email and password must not be empty",
        ));
    }

    let role = validate_public_role(user.role_id)?;

    if !is_username_available(username, pool.get_ref()).await {
        return Err(ApiError::bad_request("Username already taken"));
    }

    insert_user(username, email, password, role as u8, pool.get_ref()).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "message": "User registered successfully"
    })))
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    info!("Login request received");

    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(ApiError::bad_request("Username and password required"));
    }

    debug!("Fetching user from database");

    let db_user = sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, username, email, password, role_id, end_date, is_active
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(&user.username)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| {
        info!("Invalid credentials: user not found");
        ApiError::unauthenticated("Invalid credentials")
    })?;

    if !db_user.is_active {
        info!("Login rejected: account deactivated");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    debug!("Generating token pair");

    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    // Non-fatal
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!("Login successful");

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "access_token": access_token,
        "refresh_token": refresh_token,
    })))
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthenticated("Missing token"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthenticated("Invalid token"))?;

    let claims = verify_token(token, &config.jwt_secret)
        .map_err(|_| ApiError::unauthenticated("Invalid or expired token"))?;

    if claims.token_type != TokenType::Refresh {
        return Err(ApiError::unauthenticated("Refresh token required"));
    }

    let record = sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await?;

    let (record_id, record_user_id) = match record {
        Some((id, user_id, false)) => (id, user_id),
        _ => return Err(ApiError::unauthenticated("Invalid or expired token")),
    };

    // Rotate: revoke the old refresh token before issuing a new one
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await?;

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await?;

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub,
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "access_token": access_token,
        "refresh_token": new_refresh_token,
    })))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // Revoke is idempotent; succeed even if the token was never stored
    let _ = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool.get_ref())
        .await;

    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_registration_never_grants_reviewer_roles() {
        // Hr (1) and HrDirector (2) would pass require_reviewer(); the
        // public endpoint must refuse both.
        assert!(matches!(
            validate_public_role(Role::Hr as u8),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_public_role(Role::HrDirector as u8),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn self_registration_grants_the_employee_role() {
        assert_eq!(
            validate_public_role(Role::Employee as u8).unwrap(),
            Role::Employee
        );
    }

    #[test]
    fn unknown_role_ids_are_rejected() {
        assert!(validate_public_role(0).is_err());
        assert!(validate_public_role(9).is_err());
    }
}
