// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers::{admin, auth, catalog, export, pages, sale, users},
    middleware::auth::{admin_guard, auth_guard},
};

/// Monta o router completo.
///
/// - Públicas: páginas, login/logout, health, favicon, /docs
/// - Sessão: /api/me, /sale, /undo, listagens de itens e formas de pagamento
/// - Admin: bulk, usuários, relatórios e exports CSV
pub fn create_router(app_state: AppState) -> Router {
    // Rotas públicas (as páginas decidem sozinhas se redirecionam)
    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/admin", get(pages::admin_page))
        .route("/login", get(pages::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/api/login", post(auth::login))
        .route("/api/health", get(pages::health))
        .route("/favicon.ico", get(pages::favicon));

    // Qualquer usuário logado
    let session_routes = Router::new()
        .route("/api/me", get(auth::get_me))
        .route("/sale", post(sale::record_sale))
        .route("/undo", post(sale::undo_last_sale))
        .route("/api/items", get(catalog::list_items))
        .route("/api/payment_methods", get(catalog::list_payment_methods))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Somente admins. A última layer roda primeiro: auth_guard, depois admin_guard.
    let admin_routes = Router::new()
        .route("/api/items/bulk", post(catalog::items_bulk))
        .route("/api/payment_methods/bulk", post(catalog::payment_methods_bulk))
        .route("/api/users", get(users::list_users))
        .route("/api/users/bulk", post(users::users_bulk))
        .route("/api/admin/summary", get(admin::get_summary))
        .route("/api/admin/purchases", get(admin::list_purchases))
        .route("/api/admin/available_days", get(admin::available_days))
        .route("/export.csv", get(export::export_sales))
        .route("/export_purchases.csv", get(export::export_purchases))
        .layer(axum_middleware::from_fn(admin_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
