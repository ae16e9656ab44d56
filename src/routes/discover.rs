use actix_web::{web, HttpResponse};

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use super::AppState;
use crate::models::{DiscoverQuery, SearchParams};

/// Discover candidates the caller has not swiped on
///
/// GET /api/v1/discover?lat={lat}&lon={lon}&min_age=&max_age=&gender=&limit=&sort=index|distance
pub async fn discover(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    query: web::Query<DiscoverQuery>,
) -> Result<HttpResponse, ApiError> {
    let params = SearchParams::from(query.into_inner());

    let people = state.discovery.discover(caller.0, &params).await?;

    tracing::info!("Returning {} candidates for user {}", people.len(), caller.0);

    Ok(HttpResponse::Ok().json(people))
}
