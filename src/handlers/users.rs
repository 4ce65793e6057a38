// src/handlers/users.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{auth::CurrentUser, i18n::Locale},
    models::{
        auth::{User, UserFields},
        batch::{BatchOp, BatchOutcome},
    },
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários (sem hash de PIN)", body = Vec<User>),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app_state
        .user_service
        .list()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(users))
}

// POST /api/users/bulk
#[utoipa::path(
    post,
    path = "/api/users/bulk",
    tag = "Users",
    request_body(
        content = Vec<UserFields>,
        description = "Cada elemento leva `op` (insert | update | delete); `pin` é obrigatório no insert"
    ),
    responses(
        (status = 200, description = "Lote aplicado; `warnings` lista quem manteve o papel de admin", body = BatchOutcome),
        (status = 400, description = "Payload inválido ou usuário duplicado"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn users_bulk(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentUser(current): CurrentUser,
    payload: Result<Json<Vec<BatchOp<UserFields>>>, JsonRejection>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let ops = json_body(payload, &locale)?;

    let outcome = app_state
        .user_service
        .apply_user_batch(current.id, ops)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(outcome))
}
