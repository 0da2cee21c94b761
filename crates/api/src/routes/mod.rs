pub mod admin;
pub mod assignments;
pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod health;
pub mod hotels;
pub mod me;
pub mod participants;
pub mod resources;
pub mod scans;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                     service + database health (public)
///
/// /auth/register                              participant sign-up (public)
/// /auth/login                                 login (public)
/// /auth/refresh                               refresh (public)
/// /auth/logout                                logout (requires auth)
/// /auth/me                                    current user
///
/// /participants                               list (admin)
/// /participants/by-reference/{code}           lookup (validator)
/// /participants/{id}                          get, update (admin)
/// /participants/{id}/payment/approve          approve payment (admin)
/// /participants/{id}/payment/reject           reject proof (admin)
/// /participants/{id}/accreditation            override (admin, PUT)
/// /participants/{id}/accreditation/decline    decline (validator)
///
/// /me/participant                             own record (participant)
/// /me/payment-proof                           submit proof (participant)
/// /me/scans, /me/bookings, /me/resources      own history (participant)
/// /me/assignments                             own duty slots (validator)
///
/// /scans                                      list (validator; admin sees all)
/// /scans/accreditation                        accredit by QR (validator)
/// /scans/meal                                 serve a meal slot (validator)
///
/// /assignments                                list, create (admin)
/// /assignments/{id}                           get, update, delete (admin)
///
/// /hotels                                     list (auth), create (admin)
/// /hotels/{id}                                get (auth), update, delete (admin)
///
/// /bookings                                   list (admin), request (participant)
/// /bookings/{id}/confirm                      confirm (admin)
/// /bookings/{id}/cancel                       cancel (owner or admin)
///
/// /resources                                  list (auth), create (admin)
/// /resources/{id}                             get (auth), update, delete (admin)
/// /resources/{id}/distribute                  hand out (validator)
/// /resources/{id}/recipients                  recipients (validator)
///
/// /settings                                   list (admin)
/// /settings/public                            public subset (no auth)
/// /settings/{key}                             get, put, delete (admin)
///
/// /dashboard/admin                            admin overview (cached)
/// /dashboard/validator                        validator activity
/// /dashboard/participant                      participant summary
///
/// /admin/users                                list, create (admin)
/// /admin/users/{id}                           get, update, deactivate
/// /admin/users/{id}/reset-password            reset password
/// /admin/db/stats                             database statistics
/// /admin/db/vacuum                            VACUUM a table (POST)
/// /admin/db/reindex                           REINDEX a table (POST)
/// /admin/db/kill-idle                         terminate idle connections (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/participants", participants::router())
        .nest("/me", me::router())
        .nest("/scans", scans::router())
        .nest("/assignments", assignments::router())
        .nest("/hotels", hotels::router())
        .nest("/bookings", bookings::router())
        .nest("/resources", resources::router())
        .nest("/settings", settings::router())
        .nest("/dashboard", dashboard::router())
        .nest("/admin", admin::router())
}
