// src/handlers/catalog.rs

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::json_body,
    middleware::i18n::Locale,
    models::{
        batch::{BatchOp, BatchOutcome},
        catalog::{Item, ItemFields, ListQuery, PaymentMethod, PaymentMethodFields},
    },
};

// GET /api/items
#[utoipa::path(
    get,
    path = "/api/items",
    tag = "Catalog",
    params(ListQuery),
    responses(
        (status = 200, description = "Itens ordenados por sort_order, id", body = Vec<Item>),
        (status = 401, description = "Sem sessão")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = app_state
        .catalog_service
        .list_items(query.only_active())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(items))
}

// POST /api/items/bulk
#[utoipa::path(
    post,
    path = "/api/items/bulk",
    tag = "Catalog",
    request_body(
        content = Vec<ItemFields>,
        description = "Cada elemento leva `op` (insert | update | delete); update e delete levam `id`"
    ),
    responses(
        (status = 200, description = "Lote aplicado", body = BatchOutcome),
        (status = 400, description = "Payload inválido ou nome duplicado"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn items_bulk(
    State(app_state): State<AppState>,
    locale: Locale,
    payload: Result<Json<Vec<BatchOp<ItemFields>>>, JsonRejection>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let ops = json_body(payload, &locale)?;

    let outcome = app_state
        .catalog_service
        .apply_item_batch(ops)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(outcome))
}

// GET /api/payment_methods
#[utoipa::path(
    get,
    path = "/api/payment_methods",
    tag = "Catalog",
    params(ListQuery),
    responses(
        (status = 200, description = "Formas de pagamento ordenadas por sort_order, id", body = Vec<PaymentMethod>),
        (status = 401, description = "Sem sessão")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn list_payment_methods(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PaymentMethod>>, ApiError> {
    let methods = app_state
        .catalog_service
        .list_payment_methods(query.only_active())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(methods))
}

// POST /api/payment_methods/bulk
#[utoipa::path(
    post,
    path = "/api/payment_methods/bulk",
    tag = "Catalog",
    request_body(
        content = Vec<PaymentMethodFields>,
        description = "Cada elemento leva `op` (insert | update | delete); formas protegidas não são apagadas"
    ),
    responses(
        (status = 200, description = "Lote aplicado", body = BatchOutcome),
        (status = 400, description = "Payload inválido ou nome duplicado"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn payment_methods_bulk(
    State(app_state): State<AppState>,
    locale: Locale,
    payload: Result<Json<Vec<BatchOp<PaymentMethodFields>>>, JsonRejection>,
) -> Result<Json<BatchOutcome>, ApiError> {
    let ops = json_body(payload, &locale)?;

    let outcome = app_state
        .catalog_service
        .apply_payment_batch(ops)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(outcome))
}
