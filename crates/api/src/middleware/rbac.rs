//! Role guards for handler signatures.
//!
//! Each guard authenticates through [`AuthUser`] and then answers 403 when
//! the caller's role is not allowed. Taking `RequireValidator(user)` as a
//! handler argument is the whole authorization check for that route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use confdesk_core::error::CoreError;
use confdesk_core::roles::{can_validate, ROLE_ADMIN, ROLE_PARTICIPANT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

macro_rules! role_guard {
    ($(#[$doc:meta])* $name:ident, $allowed:expr, $denied:literal) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                let allowed: fn(&str) -> bool = $allowed;
                if !allowed(&user.role) {
                    return Err(AppError::Core(CoreError::Forbidden($denied.into())));
                }
                Ok($name(user))
            }
        }
    };
}

role_guard!(
    /// Admin only.
    RequireAdmin,
    |role| role == ROLE_ADMIN,
    "Admin role required"
);

role_guard!(
    /// Validators and admins. Admins may work any gate.
    RequireValidator,
    can_validate,
    "Validator or Admin role required"
);

role_guard!(
    /// Endpoints acting on the caller's own registration.
    RequireParticipant,
    |role| role == ROLE_PARTICIPANT,
    "Participant role required"
);

role_guard!(
    /// Any signed-in account.
    RequireAuth,
    |_| true,
    "Authentication required"
);
