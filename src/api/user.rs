use crate::auth::auth::AuthUser;
use crate::errors::ApiError;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::ToSchema;

/// Minimal identity projection for supervisory dashboards.
/// The credential column is never selected.
#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@company.com")]
    pub email: String,
    #[schema(example = 3)]
    pub role_id: u8,
    /// End date of the most recently accepted absence, if any.
    #[schema(example = "2026-01-09", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All users with their recorded end dates", body = [UserSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let users = sqlx::query_as::<_, UserSummary>(
        r#"
        SELECT id, username, email, role_id, end_date, is_active
        FROM users
        ORDER BY username ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": users.len(),
        "data": users,
    })))
}
