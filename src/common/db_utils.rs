// src/common/db_utils.rs

use crate::common::error::{AppError, Entity};

/// Converte violação de índice único em um erro amigável para a entidade.
pub(crate) fn unique_violation_as(entity: Entity) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::DuplicateName(entity);
            }
        }
        e.into()
    }
}

/// Arredonda para centavos. Os valores são f64, não um ledger.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
