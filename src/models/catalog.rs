// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

fn default_true() -> bool {
    true
}

/// `?active=1` restringe as listagens aos registros ativos.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub active: Option<String>,
}

impl ListQuery {
    pub fn only_active(&self) -> bool {
        matches!(self.active.as_deref().map(str::trim), Some("1" | "true" | "yes" | "on"))
    }
}

// --- Itens ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Hot Dog")]
    pub name: String,
    #[schema(example = 9.0)]
    pub price: f64,
    pub active: bool,
    #[schema(example = 1)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemFields {
    #[validate(length(min = 1, max = 80, message = "name"))]
    pub name: String,

    #[validate(range(exclusive_min = 0.0, message = "price"))]
    pub price: f64,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub sort_order: i64,
}

impl ItemFields {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

// --- Formas de pagamento ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PaymentMethod {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Bar")]
    pub name: String,
    pub active: bool,
    pub sort_order: i64,
    /// Formas protegidas nunca são apagadas.
    pub protected: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PaymentMethodFields {
    #[validate(length(min = 1, max = 40, message = "name"))]
    pub name: String,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub sort_order: i64,

    #[serde(default)]
    pub protected: bool,
}

impl PaymentMethodFields {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}
