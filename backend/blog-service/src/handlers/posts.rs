/// Post handlers - listings, detail, create and edit
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{form_invalid, redirect};
use crate::error::{AppError, Result};
use crate::forms::{form_context, FormErrors, PostFormData, PostUpload};
use crate::middleware::{
    can_create_comment, can_edit, post_detail_url, profile_url, RequestContext,
};
use crate::models::Group;
use crate::AppState;

const POST_FORM_FIELDS: [&str; 3] = ["text", "group", "image"];

/// GET / - public listing, served through the page cache
pub async fn index(state: web::Data<AppState>, ctx: RequestContext) -> Result<HttpResponse> {
    let body = state.post_service().index_body(ctx.page()).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    ctx: RequestContext,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let page = state.post_service().group_page(&slug, ctx.page()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    ctx: RequestContext,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let page = state
        .post_service()
        .profile_page(&username, ctx.user_id(), ctx.page())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    ctx: RequestContext,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let detail = state
        .post_service()
        .post_detail(post_id.into_inner(), ctx.user_id())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "post": detail.post,
        "author_posts_count": detail.author_posts_count,
        "comments": detail.comments,
        "can_edit": detail.can_edit,
        "can_comment": can_create_comment(ctx.user.as_ref()),
        "form": form_context(&["text"], json!({ "text": "" }), &FormErrors::default()),
    })))
}

/// GET /create/
pub async fn create_form(state: web::Data<AppState>, ctx: RequestContext) -> Result<HttpResponse> {
    ctx.require_user()?;
    let groups = state.post_service().list_groups().await?;

    Ok(HttpResponse::Ok().json(json!({
        "is_edit": false,
        "groups": groups,
        "form": form_context(&POST_FORM_FIELDS, json!({}), &FormErrors::default()),
    })))
}

/// POST /create/ - on success, redirect to the author's profile
pub async fn create_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    form: Option<MultipartForm<PostUpload>>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let service = state.post_service();
    let data = form
        .map(|f| PostFormData::from(f.into_inner()))
        .unwrap_or_default();
    let initial = data.initial();

    let invalid = |errors: FormErrors, groups: Vec<Group>| {
        form_invalid(
            &POST_FORM_FIELDS,
            initial.clone(),
            &errors,
            json!({ "is_edit": false, "groups": groups }),
        )
    };

    let input = match data.clean() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(errors, service.list_groups().await?)),
    };

    match service.create_post(user.id, input).await {
        Ok(_) => Ok(redirect(&profile_url(&user.username))),
        Err(AppError::Validation(errors)) => Ok(invalid(errors, service.list_groups().await?)),
        Err(err) => Err(err),
    }
}

/// GET /posts/{post_id}/edit/ - author only; anyone else goes to the post
pub async fn edit_form(
    state: web::Data<AppState>,
    ctx: RequestContext,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let service = state.post_service();
    let post = service.get_post(post_id.into_inner()).await?;

    if !can_edit(Some(user), &post) {
        return Ok(redirect(&post_detail_url(post.id)));
    }

    let groups = service.list_groups().await?;
    let initial = json!({
        "text": post.text,
        "group": post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        "image": post.image,
    });

    Ok(HttpResponse::Ok().json(json!({
        "is_edit": true,
        "post_id": post.id,
        "groups": groups,
        "form": form_context(&POST_FORM_FIELDS, initial, &FormErrors::default()),
    })))
}

/// POST /posts/{post_id}/edit/ - on success, redirect to the post
pub async fn edit_post(
    state: web::Data<AppState>,
    ctx: RequestContext,
    post_id: web::Path<i64>,
    form: Option<MultipartForm<PostUpload>>,
) -> Result<HttpResponse> {
    let user = ctx.require_user()?;
    let service = state.post_service();
    let post = service.get_post(post_id.into_inner()).await?;
    let detail_url = post_detail_url(post.id);

    if !can_edit(Some(user), &post) {
        tracing::warn!(post_id = post.id, user_id = user.id, "edit refused for non-author");
        return Ok(redirect(&detail_url));
    }

    let data = form
        .map(|f| PostFormData::from(f.into_inner()))
        .unwrap_or_default();
    let initial = data.initial();

    let invalid = |errors: FormErrors, groups: Vec<Group>| {
        form_invalid(
            &POST_FORM_FIELDS,
            initial.clone(),
            &errors,
            json!({ "is_edit": true, "post_id": post.id, "groups": groups }),
        )
    };

    let input = match data.clean() {
        Ok(input) => input,
        Err(errors) => return Ok(invalid(errors, service.list_groups().await?)),
    };

    match service.update_post(post.id, user.id, input).await {
        Ok(_) => Ok(redirect(&detail_url)),
        Err(AppError::Validation(errors)) => Ok(invalid(errors, service.list_groups().await?)),
        Err(err) => Err(err),
    }
}
