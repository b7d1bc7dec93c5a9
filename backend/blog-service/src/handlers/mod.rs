/// HTTP handlers for blog-service
///
/// This module contains handlers for:
/// - Posts: public listings, post detail, create and edit
/// - Comments: adding a comment to a post
/// - Follow: the followed-authors feed and follow/unfollow
/// - Auth: sign-up, login and logout
/// - Health: liveness and readiness probes
///
/// Every route is registered in `configure`.
pub mod auth;
pub mod comments;
pub mod follow;
pub mod health;
pub mod posts;

use actix_web::{http::header, web, HttpResponse};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::forms::{form_context, FormErrors};
use crate::metrics::serve_metrics;

/// Register the full route table
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        // Unparsable ids such as /posts/abc/ are plain 404s
        web::PathConfig::default()
            .error_handler(|err, _| AppError::NotFound(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .route("/group/{slug}/", web::get().to(posts::group_posts))
    .route("/profile/{username}/", web::get().to(posts::profile))
    .route(
        "/profile/{username}/follow/",
        web::get().to(follow::profile_follow),
    )
    .route(
        "/profile/{username}/unfollow/",
        web::get().to(follow::profile_unfollow),
    )
    .route("/posts/{post_id}/", web::get().to(posts::post_detail))
    .service(
        web::resource("/create/")
            .route(web::get().to(posts::create_form))
            .route(web::post().to(posts::create_post)),
    )
    .service(
        web::resource("/posts/{post_id}/edit/")
            .route(web::get().to(posts::edit_form))
            .route(web::post().to(posts::edit_post)),
    )
    .service(
        web::resource("/posts/{post_id}/comment/")
            .route(web::get().to(comments::comment_redirect))
            .route(web::post().to(comments::add_comment)),
    )
    .route("/follow/", web::get().to(follow::follow_index))
    .service(
        web::scope("/auth")
            .service(
                web::resource("/signup/")
                    .route(web::get().to(auth::signup_form))
                    .route(web::post().to(auth::signup)),
            )
            .service(
                web::resource("/login/")
                    .route(web::get().to(auth::login_form))
                    .route(web::post().to(auth::login)),
            )
            .service(
                web::resource("/logout/")
                    .route(web::get().to(auth::logout))
                    .route(web::post().to(auth::logout)),
            ),
    )
    .route("/api/v1/health", web::get().to(health::health))
    .route("/api/v1/health/ready", web::get().to(health::readiness))
    .route("/metrics", web::get().to(serve_metrics))
    .default_service(web::route().to(not_found));
}

/// 302 to `location`
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Re-rendered form: 400 with the page context plus field errors
pub fn form_invalid(
    fields: &[&str],
    initial: Value,
    errors: &FormErrors,
    mut context: Value,
) -> HttpResponse {
    if let Value::Object(map) = &mut context {
        map.insert("form".to_string(), form_context(fields, initial, errors));
    }

    HttpResponse::BadRequest().json(context)
}

async fn not_found() -> Result<HttpResponse> {
    Err(AppError::NotFound("page not found".to_string()))
}
