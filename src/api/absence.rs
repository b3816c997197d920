use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::errors::ApiError;
use crate::model::absence::{Absence, AbsenceStatus, AbsenceType};
use crate::utils::proof;
use crate::api::eligibility::check_window;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::ToSchema;

/// Admin listings are capped; supervisory dashboards never need more.
const ADMIN_LIST_CAP: u32 = 1000;

#[derive(Deserialize, ToSchema)]
pub struct CreateAbsence {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sickness")]
    pub absence_type: AbsenceType,
    #[schema(example = "/uploads/proof-123.pdf", value_type = Option<String>)]
    pub proof_url: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeclineAbsence {
    #[schema(example = "Overlaps the department audit week")]
    pub justification: String,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct AbsenceResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sickness", value_type = String)]
    pub absence_type: String,
    #[schema(example = "/uploads/proof-123.pdf", value_type = Option<String>)]
    pub proof_url: Option<String>,
    #[schema(example = "pending", value_type = String)]
    pub status: String,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Admin projection: absence joined to minimal owner identity.
/// Never carries the owner's credential field.
#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct AbsenceWithOwner {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@company.com")]
    pub email: String,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub absence_type: String,
    pub proof_url: Option<String>,
    pub status: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct RejectedWithOwner {
    pub id: u64,
    pub user_id: u64,
    pub username: String,
    pub email: String,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub absence_type: String,
    pub proof_url: Option<String>,
    pub justification: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

fn validate_justification(raw: &str) -> Result<&str, ApiError> {
    let justification = raw.trim();
    if justification.is_empty() {
        return Err(ApiError::bad_request("Justification is required"));
    }
    Ok(justification)
}

/// Owner may remove a request only while it is still pending;
/// reviewers may always remove.
fn may_delete(is_reviewer: bool, is_owner: bool, status: &str) -> bool {
    is_reviewer || (is_owner && status == "pending")
}

/// Effects of accepting a pending absence: the row moves to `accepted` and
/// the owner's recorded end date becomes exactly the absence's end date.
struct AcceptEffects {
    new_status: AbsenceStatus,
    owner_id: u64,
    owner_end_date: NaiveDate,
}

fn accept_effects(absence: &Absence) -> AcceptEffects {
    AcceptEffects {
        new_status: AbsenceStatus::Accepted,
        owner_id: absence.user_id,
        owner_end_date: absence.end_date,
    }
}

/// Field-for-field mirror of a declined absence, bound into the archive row.
struct RejectedRecord<'a> {
    user_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    absence_type: &'a str,
    proof_url: Option<&'a str>,
    justification: &'a str,
}

fn rejected_record<'a>(absence: &'a Absence, justification: &'a str) -> RejectedRecord<'a> {
    RejectedRecord {
        user_id: absence.user_id,
        start_date: absence.start_date,
        end_date: absence.end_date,
        absence_type: &absence.absence_type,
        proof_url: absence.proof_url.as_deref(),
        justification,
    }
}

/// Zero rows from a guarded mutation means the absence was missing, removed,
/// or no longer pending.
fn guard_processed(rows_affected: u64) -> Result<(), ApiError> {
    if rows_affected == 0 {
        return Err(ApiError::not_found("Absence not found or already processed"));
    }
    Ok(())
}

async fn load_live_absence(pool: &MySqlPool, id: u64) -> Result<Absence, ApiError> {
    sqlx::query_as::<_, Absence>(
        r#"
        SELECT id, user_id, start_date, end_date, absence_type, proof_url,
               status, removed, created_at
        FROM absences
        WHERE id = ? AND removed = 0
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Absence not found"))
}

/* =========================
Create absence request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/absences",
    request_body(
        content = CreateAbsence,
        description = "Absence request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Absence request submitted", body = AbsenceResponse),
        (status = 400, description = "Invalid dates or start inside the eligibility window"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn create_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAbsence>,
) -> Result<impl Responder, ApiError> {
    let payload = payload.into_inner();

    // Owner comes from the session, never from the payload.
    let recorded_end = sqlx::query_scalar::<_, Option<NaiveDate>>(
        "SELECT end_date FROM users WHERE id = ?",
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::unauthenticated("The user belonging to this token no longer exists"))?;

    check_window(payload.start_date, payload.end_date, recorded_end)?;

    let result = sqlx::query(
        r#"
        INSERT INTO absences (user_id, start_date, end_date, absence_type, proof_url, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.absence_type.to_string())
    .bind(&payload.proof_url)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Failed to create absence");
        ApiError::Internal
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": "success",
        "absence": {
            "id": result.last_insert_id(),
            "user_id": auth.user_id,
            "start_date": payload.start_date,
            "end_date": payload.end_date,
            "absence_type": payload.absence_type,
            "proof_url": payload.proof_url,
            "status": "pending",
        }
    })))
}

/* =========================
List caller's own absences
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/absences/me",
    responses(
        (status = 200, description = "Caller's absences, newest first", body = [AbsenceResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn list_my_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let absences = sqlx::query_as::<_, AbsenceResponse>(
        r#"
        SELECT id, user_id, start_date, end_date, absence_type, proof_url, status, created_at
        FROM absences
        WHERE user_id = ? AND removed = 0
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": absences.len(),
        "data": absences,
    })))
}

async fn list_by_status(
    pool: &MySqlPool,
    status: AbsenceStatus,
) -> Result<Vec<AbsenceWithOwner>, ApiError> {
    let rows = sqlx::query_as::<_, AbsenceWithOwner>(
        r#"
        SELECT a.id, a.user_id, u.username, u.email,
               a.start_date, a.end_date, a.absence_type, a.proof_url, a.status, a.created_at
        FROM absences a
        JOIN users u ON u.id = a.user_id
        WHERE a.status = ? AND a.removed = 0
        ORDER BY a.created_at DESC
        LIMIT ?
        "#,
    )
    .bind(status.to_string())
    .bind(ADMIN_LIST_CAP)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/* =========================
Admin listings
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/absences/pending",
    responses(
        (status = 200, description = "All pending absences with owner identity", body = [AbsenceWithOwner]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn list_pending(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let absences = list_by_status(pool.get_ref(), AbsenceStatus::Pending).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": absences.len(),
        "data": absences,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/absences/accepted",
    responses(
        (status = 200, description = "All accepted absences with owner identity", body = [AbsenceWithOwner]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn list_accepted(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let absences = list_by_status(pool.get_ref(), AbsenceStatus::Accepted).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": absences.len(),
        "data": absences,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/absences/rejected",
    responses(
        (status = 200, description = "Declined absences archive with owner identity", body = [RejectedWithOwner]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn list_rejected(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let rejected = sqlx::query_as::<_, RejectedWithOwner>(
        r#"
        SELECT r.id, r.user_id, u.username, u.email,
               r.start_date, r.end_date, r.absence_type, r.proof_url,
               r.justification, r.created_at
        FROM rejected_absences r
        JOIN users u ON u.id = r.user_id
        ORDER BY r.created_at DESC
        LIMIT ?
        "#,
    )
    .bind(ADMIN_LIST_CAP)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": rejected.len(),
        "data": rejected,
    })))
}

/* =========================
Accept (HR roles)
========================= */
#[utoipa::path(
    patch,
    path = "/api/v1/absences/{id}/accept",
    params(
        ("id" = u64, Path, description = "ID of the absence to accept")
    ),
    responses(
        (status = 200, description = "Absence accepted; owner's recorded end date updated"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Absence not found or already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn accept_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let absence_id = path.into_inner();
    let absence = load_live_absence(pool.get_ref(), absence_id).await?;
    let effects = accept_effects(&absence);

    // Conditional update closes the window for two concurrent accepts:
    // only one caller can move pending -> accepted.
    let result = sqlx::query(
        r#"
        UPDATE absences
        SET status = ?
        WHERE id = ? AND status = ? AND removed = 0
        "#,
    )
    .bind(effects.new_status.to_string())
    .bind(absence_id)
    .bind(AbsenceStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await?;

    guard_processed(result.rows_affected())?;

    // Unconditional overwrite: the accepted absence's end date becomes the
    // owner's recorded end date even if it is earlier than the stored one.
    sqlx::query("UPDATE users SET end_date = ? WHERE id = ?")
        .bind(effects.owner_end_date)
        .bind(effects.owner_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(
        absence_id,
        user_id = absence.user_id,
        reviewer = auth.user_id,
        "Absence accepted"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Absence accepted",
    })))
}

/* =========================
Decline (HR roles)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/absences/{id}/decline",
    params(
        ("id" = u64, Path, description = "ID of the absence to decline")
    ),
    request_body = DeclineAbsence,
    responses(
        (status = 200, description = "Absence declined and archived"),
        (status = 400, description = "Missing justification"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Absence not found or already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn decline_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<DeclineAbsence>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    // Validate before any write; an empty justification must leave
    // the absence untouched.
    let justification = validate_justification(&payload.justification)?;

    let absence_id = path.into_inner();

    let mut tx = pool.begin().await?;

    let absence = sqlx::query_as::<_, Absence>(
        r#"
        SELECT id, user_id, start_date, end_date, absence_type, proof_url,
               status, removed, created_at
        FROM absences
        WHERE id = ? AND status = 'pending' AND removed = 0
        "#,
    )
    .bind(absence_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Absence not found or already processed"))?;

    let record = rejected_record(&absence, justification);

    sqlx::query(
        r#"
        INSERT INTO rejected_absences
            (user_id, start_date, end_date, absence_type, proof_url, justification)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.user_id)
    .bind(record.start_date)
    .bind(record.end_date)
    .bind(record.absence_type)
    .bind(record.proof_url)
    .bind(record.justification)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query("DELETE FROM absences WHERE id = ? AND status = 'pending'")
        .bind(absence.id)
        .execute(&mut *tx)
        .await?;

    if let Err(e) = guard_processed(deleted.rows_affected()) {
        tx.rollback().await?;
        return Err(e);
    }

    tx.commit().await?;

    tracing::info!(
        absence_id,
        user_id = absence.user_id,
        reviewer = auth.user_id,
        "Absence declined"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Absence declined",
    })))
}

/* =========================
Delete (owner-if-pending or HR roles)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/absences/{id}",
    params(
        ("id" = u64, Path, description = "ID of the absence to remove")
    ),
    responses(
        (status = 200, description = "Absence removed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner, or the request was already processed"),
        (status = 404, description = "Absence not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn delete_absence(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let absence_id = path.into_inner();
    let absence = load_live_absence(pool.get_ref(), absence_id).await?;

    let is_owner = absence.user_id == auth.user_id;
    if !may_delete(auth.is_reviewer(), is_owner, &absence.status) {
        return Err(ApiError::forbidden(
            "You may only remove your own pending requests",
        ));
    }

    sqlx::query("UPDATE absences SET removed = 1 WHERE id = ?")
        .bind(absence_id)
        .execute(pool.get_ref())
        .await?;

    // Best-effort: a failed file removal is logged, never surfaced.
    if let Some(url) = absence.proof_url {
        proof::cleanup_local_proof(url, config.get_ref().clone());
    }

    tracing::info!(absence_id, caller = auth.user_id, "Absence removed");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "message": "Absence removed",
    })))
}

/* =========================
List a specific user's absences (HR roles)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/absences",
    params(
        ("id" = u64, Path, description = "Owner user ID")
    ),
    responses(
        (status = 200, description = "The user's absences, newest first", body = [AbsenceResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Absence"
)]
pub async fn list_user_absences(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_reviewer()?;

    let user_id = path.into_inner();

    let absences = sqlx::query_as::<_, AbsenceResponse>(
        r#"
        SELECT id, user_id, start_date, end_date, absence_type, proof_url, status, created_at
        FROM absences
        WHERE user_id = ? AND removed = 0
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "results": absences.len(),
        "data": absences,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pending_absence() -> Absence {
        Absence {
            id: 11,
            user_id: 42,
            start_date: d("2024-03-20"),
            end_date: d("2024-04-01"),
            absence_type: "sickness".to_string(),
            proof_url: Some("/uploads/proof-11.pdf".to_string()),
            status: "pending".to_string(),
            removed: false,
            created_at: None,
        }
    }

    #[test]
    fn accepting_sets_owner_end_date_to_exactly_the_absence_end_date() {
        let absence = pending_absence();
        let effects = accept_effects(&absence);

        assert_eq!(effects.new_status, AbsenceStatus::Accepted);
        assert_eq!(effects.owner_id, 42);
        assert_eq!(effects.owner_end_date, d("2024-04-01"));
    }

    #[test]
    fn guarded_mutation_with_no_rows_maps_to_not_found() {
        assert!(matches!(guard_processed(0), Err(ApiError::NotFound(_))));
        assert!(guard_processed(1).is_ok());
    }

    #[test]
    fn declined_absence_is_mirrored_into_the_archive() {
        let absence = pending_absence();
        let record = rejected_record(&absence, "overlaps audit week");

        assert_eq!(record.user_id, absence.user_id);
        assert_eq!(record.start_date, absence.start_date);
        assert_eq!(record.end_date, absence.end_date);
        assert_eq!(record.absence_type, absence.absence_type);
        assert_eq!(record.proof_url.unwrap(), "/uploads/proof-11.pdf");
        assert_eq!(record.justification, "overlaps audit week");
    }

    #[test]
    fn empty_justification_is_rejected() {
        assert!(validate_justification("").is_err());
        assert!(validate_justification("   \t\n").is_err());
    }

    #[test]
    fn justification_is_trimmed() {
        assert_eq!(
            validate_justification("  overlaps audit week  ").unwrap(),
            "overlaps audit week"
        );
    }

    #[test]
    fn owner_may_delete_only_while_pending() {
        assert!(may_delete(false, true, "pending"));
        assert!(!may_delete(false, true, "accepted"));
    }

    #[test]
    fn reviewer_may_always_delete() {
        assert!(may_delete(true, false, "pending"));
        assert!(may_delete(true, false, "accepted"));
    }

    #[test]
    fn stranger_may_never_delete() {
        assert!(!may_delete(false, false, "pending"));
        assert!(!may_delete(false, false, "accepted"));
    }
}
