use crate::api::absence::{
    AbsenceResponse, AbsenceWithOwner, CreateAbsence, DeclineAbsence, RejectedWithOwner,
};
use crate::api::user::UserSummary;
use crate::model::absence::{AbsenceStatus, AbsenceType};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## HR Leave Management

Employees submit absence requests; HR reviewer roles accept or decline them.

### Key Features
- **Absence Requests**
  - Submit a request with a date range, type and optional proof document
  - View your own request history
- **Review Workflow**
  - Accept a pending request (updates the owner's recorded end date)
  - Decline with a mandatory justification (archived, irreversible)
- **Supervisory Views**
  - Pending / accepted / rejected listings joined to owner identity

### Security
All `/api` endpoints require **JWT Bearer authentication**. Review
operations are restricted to the **HR** and **HR Director** roles.

### Response Format
Success envelope: `{"status": "success", ...}`.
Error envelope: `{"status": "fail" | "error", "message": ...}`.
"#,
    ),
    paths(
        crate::api::absence::create_absence,
        crate::api::absence::list_my_absences,
        crate::api::absence::list_pending,
        crate::api::absence::list_accepted,
        crate::api::absence::list_rejected,
        crate::api::absence::accept_absence,
        crate::api::absence::decline_absence,
        crate::api::absence::delete_absence,
        crate::api::absence::list_user_absences,
        crate::api::user::list_users,
    ),
    components(
        schemas(
            CreateAbsence,
            DeclineAbsence,
            AbsenceResponse,
            AbsenceWithOwner,
            RejectedWithOwner,
            AbsenceType,
            AbsenceStatus,
            UserSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Absence", description = "Absence request and review APIs"),
        (name = "User", description = "User listing APIs for reviewers"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
