// src/handlers/export.rs

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use crate::{
    common::{clock, error::ApiError},
    config::AppState,
    middleware::i18n::Locale,
    models::report::PurchaseQuery,
};

fn csv_attachment(filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
}

// GET /export.csv
#[utoipa::path(
    get,
    path = "/export.csv",
    tag = "Export",
    params(PurchaseQuery),
    responses(
        (status = 200, description = "Zeit;Artikel;Menge;Preis;Gesamt", content_type = "text/csv", body = String),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn export_sales(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PurchaseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let body = app_state
        .export_service
        .legacy_csv(&query, clock::today_local())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(csv_attachment("export.csv", body))
}

// GET /export_purchases.csv
#[utoipa::path(
    get,
    path = "/export_purchases.csv",
    tag = "Export",
    params(PurchaseQuery),
    responses(
        (status = 200, description = "Uma linha por item vendido, ou por venda com group=1", content_type = "text/csv", body = String),
        (status = 400, description = "Filtro inválido"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn export_purchases(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PurchaseQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let body = app_state
        .export_service
        .purchases_csv(&query, clock::today_local())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(csv_attachment("export_purchases.csv", body))
}
