// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
    services::session_store::SESSION_COOKIE,
};

/// Usuário da sessão, colocado nos extensions pelo `auth_guard`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Exige uma sessão válida de um usuário ativo.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .ok_or_else(|| AppError::Unauthenticated.to_api_error(&locale))?;

    let user = app_state
        .auth_service
        .resolve_session(&token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Roda depois do `auth_guard`: só administradores ativos passam.
pub async fn admin_guard(locale: Locale, request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<CurrentUser>() {
        Some(CurrentUser(user)) if user.is_active_admin() => Ok(next.run(request).await),
        Some(CurrentUser(user)) => {
            tracing::warn!("⛔ '{}' tentou acessar {}", user.username, request.uri().path());
            Err(AppError::Forbidden.to_api_error(&locale))
        }
        None => Err(AppError::Unauthenticated.to_api_error(&locale)),
    }
}

// Extrator para obter o usuário autenticado diretamente nos handlers
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated.to_api_error(&Locale::from_header(None)))
    }
}

/// Para as páginas HTML: sessão ausente ou inválida vira `None` (e um redirect no handler).
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(OptionalUser(None));
        };
        let user = app_state.auth_service.resolve_session(cookie.value()).await.ok();
        Ok(OptionalUser(user))
    }
}
