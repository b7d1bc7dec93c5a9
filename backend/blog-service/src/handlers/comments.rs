/// Comment handlers
use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{form_invalid, redirect};
use crate::error::Result;
use crate::forms::CommentPayload;
use crate::middleware::{post_detail_url, RequestContext};
use crate::AppState;

/// POST /posts/{post_id}/comment/ - add a comment, then back to the post
pub async fn add_comment(
    state: web::Data<AppState>,
    ctx: RequestContext,
    post_id: web::Path<i64>,
    form: Option<web::Form<CommentPayload>>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let post_id = post_id.into_inner();

    let payload = form.map(web::Form::into_inner).unwrap_or_default();
    let initial = json!({ "text": payload.text });

    let text = match payload.clean() {
        Ok(text) => text,
        Err(errors) => {
            let detail = state.post_service().post_detail(post_id, Some(user.id)).await?;
            return Ok(form_invalid(
                &["text"],
                initial,
                &errors,
                json!({
                    "post": detail.post,
                    "author_posts_count": detail.author_posts_count,
                    "comments": detail.comments,
                    "can_edit": detail.can_edit,
                    "can_comment": true,
                }),
            ));
        }
    };

    state
        .comment_service()
        .add_comment(post_id, user.id, text)
        .await?;

    Ok(redirect(&post_detail_url(post_id)))
}

/// GET /posts/{post_id}/comment/ - there is no comment page of its own
pub async fn comment_redirect(
    ctx: RequestContext,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    ctx.require_user()?;
    Ok(redirect(&post_detail_url(post_id.into_inner())))
}
