pub mod admin;
pub mod auth;
pub mod catalog;
pub mod export;
pub mod pages;
pub mod sale;
pub mod users;

use axum::{extract::rejection::JsonRejection, Json};

use crate::{
    common::error::{ApiError, AppError},
    middleware::i18n::Locale,
};

/// Corpo JSON já extraído; erros de sintaxe ou de formato viram 400 `{ok:false, msg}`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>, locale: &Locale) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()).to_api_error(locale))
}
