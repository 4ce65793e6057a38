// src/handlers/sale.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::{auth::CurrentUser, i18n::Locale},
    models::sale::{SalePayload, SaleReceipt, UndoResult},
};

// POST /sale
#[utoipa::path(
    post,
    path = "/sale",
    tag = "Sales",
    request_body = SalePayload,
    responses(
        (status = 200, description = "Venda registrada", body = SaleReceipt),
        (status = 400, description = "Carrinho vazio ou forma de pagamento ausente/inválida"),
        (status = 401, description = "Sem sessão")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn record_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<SalePayload>, JsonRejection>,
) -> Result<Json<SaleReceipt>, ApiError> {
    let payload = json_body(payload, &locale)?;

    let receipt = app_state
        .sale_service
        .record_sale(user.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(receipt))
}

// POST /undo
#[utoipa::path(
    post,
    path = "/undo",
    tag = "Sales",
    responses(
        (status = 200, description = "Venda mais recente removida", body = UndoResult),
        (status = 400, description = "Nenhuma venda para desfazer (`Nichts zu löschen.`)"),
        (status = 401, description = "Sem sessão")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn undo_last_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UndoResult>, ApiError> {
    let undone = app_state
        .sale_service
        .undo_last_sale()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    tracing::info!("'{}' desfez a venda #{}", user.username, undone.sale_id);
    Ok(Json(undone))
}
