/// Account handlers - sign-up, login and logout
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use super::{form_invalid, redirect};
use crate::error::{AppError, Result};
use crate::forms::{
    form_context, FieldErrorKind, FormErrors, LoginPayload, SignupPayload,
};
use crate::middleware::{safe_next, SESSION_COOKIE};
use crate::AppState;

/// Where a new account lands after sign-up
const INDEX_URL: &str = "/";

const SIGNUP_FIELDS: [&str; 3] = ["username", "password", "password_confirm"];
const LOGIN_FIELDS: [&str; 2] = ["username", "password"];
const INVALID_LOGIN_MESSAGE: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

fn query_next(req: &HttpRequest) -> Option<String> {
    web::Query::<NextQuery>::from_query(req.query_string())
        .ok()
        .and_then(|q| q.into_inner().next)
}

/// GET /auth/signup/
pub async fn signup_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "form": form_context(&SIGNUP_FIELDS, json!({}), &FormErrors::default()),
    }))
}

/// POST /auth/signup/ - create the account, then go to the index
pub async fn signup(
    state: web::Data<AppState>,
    form: Option<web::Form<SignupPayload>>,
) -> Result<HttpResponse> {
    let payload = form.map(web::Form::into_inner).unwrap_or_default();
    let initial = json!({ "username": payload.username });

    let input = match payload.clean() {
        Ok(input) => input,
        Err(errors) => return Ok(form_invalid(&SIGNUP_FIELDS, initial, &errors, json!({}))),
    };

    match state.account_service().signup(input).await {
        Ok(_) => Ok(redirect(INDEX_URL)),
        Err(AppError::Validation(errors)) => {
            Ok(form_invalid(&SIGNUP_FIELDS, initial, &errors, json!({})))
        }
        Err(err) => Err(err),
    }
}

/// GET /auth/login/
pub async fn login_form(req: HttpRequest) -> HttpResponse {
    let next = safe_next(query_next(&req).as_deref());

    HttpResponse::Ok().json(json!({
        "next": next,
        "form": form_context(&LOGIN_FIELDS, json!({}), &FormErrors::default()),
    }))
}

/// POST /auth/login/ - set the session cookie and continue to `next`
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Option<web::Form<LoginPayload>>,
) -> Result<HttpResponse> {
    let payload = form.map(web::Form::into_inner).unwrap_or_default();
    let next = safe_next(payload.next.clone().or_else(|| query_next(&req)).as_deref());

    let user = state
        .account_service()
        .authenticate(&payload.username, &payload.password)
        .await?;

    let Some(user) = user else {
        tracing::info!(username = %payload.username, "failed login attempt");
        let errors = FormErrors::single(
            FormErrors::NON_FIELD,
            FieldErrorKind::InvalidCredentials,
            INVALID_LOGIN_MESSAGE,
        );
        return Ok(form_invalid(
            &LOGIN_FIELDS,
            json!({ "username": payload.username }),
            &errors,
            json!({ "next": next }),
        ));
    };

    let sessions = &state.sessions;
    let token = sessions.issue(&user)?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(sessions.ttl().num_seconds()))
        .finish();

    tracing::info!(user_id = user.id, "user logged in");
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, next))
        .cookie(cookie)
        .finish())
}

/// GET|POST /auth/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}
