// src/handlers/admin.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{clock, error::ApiError},
    config::AppState,
    middleware::i18n::Locale,
    models::report::{AvailableDays, DaySummary, PurchaseQuery, PurchaseReport, SummaryQuery},
};

// GET /api/admin/summary
#[utoipa::path(
    get,
    path = "/api/admin/summary",
    tag = "Admin",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Vendas, total, unidades, totais por item e as 20 vendas mais recentes do dia", body = DaySummary),
        (status = 400, description = "Data inválida"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<DaySummary>, ApiError> {
    let day = query
        .day(clock::today_local())
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    let summary = app_state
        .report_service
        .day_summary(day)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(summary))
}

// GET /api/admin/purchases
#[utoipa::path(
    get,
    path = "/api/admin/purchases",
    tag = "Admin",
    params(PurchaseQuery),
    responses(
        (status = 200, description = "`{lines: [...]}` ou, com group=1, `{purchases: [...]}`; mais novas primeiro", body = PurchaseReport),
        (status = 400, description = "Filtro inválido"),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<PurchaseQuery>,
) -> Result<Json<PurchaseReport>, ApiError> {
    let report = app_state
        .report_service
        .purchases(&query, clock::today_local())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(report))
}

// GET /api/admin/available_days
#[utoipa::path(
    get,
    path = "/api/admin/available_days",
    tag = "Admin",
    responses(
        (status = 200, description = "Dias com pelo menos uma venda, mais novos primeiro", body = AvailableDays),
        (status = 403, description = "Somente administradores")
    ),
    security(
        ("pos_session" = [])
    )
)]
pub async fn available_days(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<AvailableDays>, ApiError> {
    let days = app_state
        .report_service
        .available_days()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok(Json(days))
}
