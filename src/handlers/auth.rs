// src/handlers/auth.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{auth::CurrentUser, i18n::Locale},
    models::auth::{LoginPayload, LoginResponse, User},
    services::session_store::SESSION_COOKIE,
};

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// POST /login e /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão aberta; o cookie pos_session é definido", body = LoginResponse),
        (status = 400, description = "Usuário ou PIN ausente"),
        (status = 401, description = "PIN incorreto ou usuário inativo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let payload = json_body(payload, &locale)?;

    let (user, token) = app_state
        .auth_service
        .login_user(&payload.username, &payload.pin)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((jar.add(session_cookie(token)), Json(LoginResponse { ok: true, user })))
}

// GET /logout
pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = app_state.auth_service.logout(cookie.value()).await {
            tracing::warn!("Falha ao encerrar sessão: {}", e);
        }
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}

// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão atual", body = User),
        (status = 401, description = "Sem sessão")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
