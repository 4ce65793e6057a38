// src/models/sale.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CartLine {
    #[schema(example = 1)]
    pub item_id: i64,
    #[schema(example = 2)]
    pub qty: i64,
}

// Corpo de POST /sale. A forma de pagamento é Option para responder
// "Zahlart fehlt" em vez de um erro genérico de desserialização.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SalePayload {
    #[schema(example = 1)]
    pub payment_method_id: Option<i64>,
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleReceipt {
    pub ok: bool,
    #[schema(example = 42)]
    pub sale_id: i64,
    #[schema(example = 12.0)]
    pub total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UndoResult {
    pub ok: bool,
    pub sale_id: i64,
    pub total: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct SaleHeader {
    pub id: i64,
    pub created_at: String,
    pub user_id: Option<i64>,
    pub payment_method_id: i64,
    pub total: f64,
}

/// Linha já precificada com o preço atual do item (snapshot).
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub item_id: i64,
    pub item_name: String,
    pub qty: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: f64,
}
