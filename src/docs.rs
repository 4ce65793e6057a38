// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services::session_store::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Sales ---
        handlers::sale::record_sale,
        handlers::sale::undo_last_sale,

        // --- Catalog ---
        handlers::catalog::list_items,
        handlers::catalog::items_bulk,
        handlers::catalog::list_payment_methods,
        handlers::catalog::payment_methods_bulk,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::users_bulk,

        // --- Admin ---
        handlers::admin::get_summary,
        handlers::admin::list_purchases,
        handlers::admin::available_days,

        // --- Export ---
        handlers::export::export_sales,
        handlers::export::export_purchases,

        // --- Health ---
        handlers::pages::health,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::LoginResponse,
            models::auth::UserFields,

            // --- Catalog ---
            models::catalog::Item,
            models::catalog::ItemFields,
            models::catalog::PaymentMethod,
            models::catalog::PaymentMethodFields,
            models::batch::BatchOutcome,

            // --- Sales ---
            models::sale::CartLine,
            models::sale::SalePayload,
            models::sale::SaleReceipt,
            models::sale::UndoResult,

            // --- Reports ---
            models::report::PurchaseLine,
            models::report::PurchaseItem,
            models::report::Purchase,
            models::report::PurchaseReport,
            models::report::ItemTotal,
            models::report::DaySummary,
            models::report::AvailableDays,
        )
    ),
    tags(
        (name = "Auth", description = "Login por usuário + PIN"),
        (name = "Sales", description = "Registro e estorno de vendas"),
        (name = "Catalog", description = "Itens e formas de pagamento"),
        (name = "Users", description = "Usuários do caixa"),
        (name = "Admin", description = "Indicadores e relatórios"),
        (name = "Export", description = "Exportações CSV"),
        (name = "Health", description = "Liveness")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "pos_session",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}
