use crate::errors::ApiError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Identity resolved by the auth middleware: token verified and the subject
/// confirmed to still exist as a live user. Role checks hang off this type,
/// so a handler cannot check roles without the gate having run first.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            // Reaching a handler without the middleware is a routing
            // misconfiguration, not a client error.
            None => {
                tracing::error!("AuthUser extracted on a route without the auth middleware");
                ready(Err(ApiError::Internal.into()))
            }
        }
    }
}

impl AuthUser {
    /// Either of the elevated HR roles may review cross-user absence data.
    pub fn require_reviewer(&self) -> Result<(), ApiError> {
        if self.role.is_reviewer() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "You do not have permission to perform this action",
            ))
        }
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role) -> AuthUser {
        AuthUser {
            user_id: 7,
            username: "test".to_string(),
            role,
        }
    }

    #[test]
    fn reviewer_roles_pass_the_role_gate() {
        assert!(user_with(Role::Hr).require_reviewer().is_ok());
        assert!(user_with(Role::HrDirector).require_reviewer().is_ok());
    }

    #[test]
    fn employee_is_forbidden() {
        let err = user_with(Role::Employee).require_reviewer().unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
