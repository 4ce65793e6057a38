// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

fn default_true() -> bool {
    true
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Admin")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub pin_hash: String,

    pub is_admin: bool,
    pub active: bool,
}

impl User {
    pub fn is_active_admin(&self) -> bool {
        self.is_admin && self.active
    }
}

// Dados para login. Campos ausentes viram string vazia e são tratados no service.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    #[schema(example = "Admin")]
    pub username: String,

    #[serde(default)]
    #[schema(example = "0000")]
    pub pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    pub user: User,
}

/// Campos editáveis de um usuário no endpoint bulk.
/// `pin` é obrigatório só na inserção; em updates, ausente mantém o PIN atual.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UserFields {
    #[validate(length(min = 1, max = 40, message = "username"))]
    pub username: String,

    #[validate(length(min = 4, max = 12, message = "pin"))]
    pub pin: Option<String>,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default = "default_true")]
    pub active: bool,
}

impl UserFields {
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.pin = self
            .pin
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }
}

/// Linha pronta para gravar: o PIN já passou pelo bcrypt.
#[derive(Debug, Clone)]
pub struct UserWrite {
    pub username: String,
    pub pin_hash: Option<String>,
    pub is_admin: bool,
    pub active: bool,
}

impl UserWrite {
    pub fn is_active_admin(&self) -> bool {
        self.is_admin && self.active
    }
}
