use actix_web::{web, HttpResponse};

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use super::AppState;
use crate::models::SwipeRequest;

/// Record a swipe
///
/// POST /api/v1/swipe
///
/// Request body:
/// ```json
/// {
///   "user_id": 1,
///   "target_id": 2,
///   "preference": "yes|no"
/// }
/// ```
///
/// Responds `201` with `{"matched": bool, "matchID": int?}`.
pub async fn swipe(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    body: web::Json<SwipeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    let preference = request.parse_preference()?;

    if let Some(user_id) = request.user_id {
        if user_id != caller.0 {
            tracing::warn!("User {} attempted to swipe as {}", caller.0, user_id);
            return Err(ApiError::Forbidden);
        }
    }

    let outcome = state
        .swipes
        .swipe(caller.0, request.target_id, preference)
        .await?;

    tracing::info!(
        "Swipe {} -> {} ({}): matched={}",
        caller.0,
        request.target_id,
        preference,
        outcome.matched
    );

    Ok(HttpResponse::Created().json(outcome))
}
