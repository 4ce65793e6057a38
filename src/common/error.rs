use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::middleware::i18n::{Lang, Locale};

/// Entidades com nome único, para mensagens de duplicidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Item,
    PaymentMethod,
    User,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload malformado: {0}")]
    MalformedPayload(String),

    #[error("Filtro inválido")]
    InvalidFilter,

    #[error("Usuário ou PIN ausente")]
    MissingCredentials,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão ausente ou expirada")]
    Unauthenticated,

    #[error("Acesso restrito a administradores")]
    Forbidden,

    #[error("Forma de pagamento ausente")]
    MissingPaymentMethod,

    #[error("Forma de pagamento inválida ou inativa: {0}")]
    InvalidPaymentMethod(i64),

    #[error("Venda sem linhas válidas")]
    EmptySale,

    #[error("Nenhuma venda para desfazer")]
    NothingToUndo,

    #[error("Nome duplicado ({0:?})")]
    DuplicateName(Entity),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de migração: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de CSV: {0}")]
    CsvError(#[from] csv::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedPayload(_)
            | AppError::InvalidFilter
            | AppError::MissingCredentials
            | AppError::MissingPaymentMethod
            | AppError::InvalidPaymentMethod(_)
            | AppError::EmptySale
            | AppError::NothingToUndo
            | AppError::DuplicateName(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem para o usuário final no idioma pedido.
    pub fn message(&self, lang: Lang) -> String {
        let de = lang == Lang::De;
        let text = match self {
            AppError::ValidationError(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(|k| k.to_string()).collect();
                fields.sort();
                return if de {
                    format!("Ungültige Eingabe: {}", fields.join(", "))
                } else {
                    format!("Invalid input: {}", fields.join(", "))
                };
            }
            AppError::MalformedPayload(_) => if de { "Ungültige Anfrage" } else { "Malformed request" },
            AppError::InvalidFilter => if de { "Ungültiger Filter" } else { "Invalid filter" },
            AppError::MissingCredentials => if de { "Benutzer/PIN fehlt" } else { "Username/PIN missing" },
            AppError::InvalidCredentials => if de { "PIN falsch" } else { "Wrong PIN" },
            AppError::Unauthenticated => if de { "Nicht angemeldet" } else { "Not logged in" },
            AppError::Forbidden => if de { "Nur für Administratoren" } else { "Administrators only" },
            AppError::MissingPaymentMethod => if de { "Zahlart fehlt" } else { "Payment method missing" },
            AppError::InvalidPaymentMethod(_) => if de { "Ungültige Zahlart" } else { "Invalid payment method" },
            AppError::EmptySale => if de { "Leerer Verkauf" } else { "Empty sale" },
            AppError::NothingToUndo => if de { "Nichts zu löschen." } else { "Nothing to delete." },
            AppError::DuplicateName(Entity::Item) => {
                if de { "Artikel existiert bereits" } else { "Item already exists" }
            }
            AppError::DuplicateName(Entity::PaymentMethod) => {
                if de { "Zahlart existiert bereits" } else { "Payment method already exists" }
            }
            AppError::DuplicateName(Entity::User) => {
                if de { "Benutzer existiert bereits" } else { "User already exists" }
            }
            _ => if de { "Interner Fehler" } else { "Internal error" },
        };
        text.to_string()
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O detalhe fica só no log; o cliente recebe a mensagem genérica.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }
        ApiError {
            status,
            msg: self.message(locale.0),
        }
    }
}

/// Erro já traduzido, pronto para virar resposta `{ok:false, msg}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "ok": false, "msg": self.msg }));
        (self.status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_categories_to_status_codes() {
        assert_eq!(AppError::EmptySale.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateName(Entity::Item).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_follow_locale() {
        assert_eq!(AppError::NothingToUndo.message(Lang::De), "Nichts zu löschen.");
        assert_eq!(AppError::NothingToUndo.message(Lang::En), "Nothing to delete.");
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::PoolTimedOut).message(Lang::De),
            "Interner Fehler"
        );
    }
}
