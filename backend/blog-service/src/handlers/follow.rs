/// Follow handlers - feed of followed authors, follow and unfollow
use actix_web::{web, HttpResponse};

use super::redirect;
use crate::error::Result;
use crate::middleware::{profile_url, RequestContext};
use crate::AppState;

/// GET /follow/
pub async fn follow_index(state: web::Data<AppState>, ctx: RequestContext) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let feed = state.feed_service().feed_for(user.id, ctx.page()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// GET /profile/{username}/follow/
pub async fn profile_follow(
    state: web::Data<AppState>,
    ctx: RequestContext,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    state.follow_service().follow(user.id, &username).await?;
    Ok(redirect(&profile_url(&username)))
}

/// GET /profile/{username}/unfollow/
pub async fn profile_unfollow(
    state: web::Data<AppState>,
    ctx: RequestContext,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    state.follow_service().unfollow(user.id, &username).await?;
    Ok(redirect(&profile_url(&username)))
}
