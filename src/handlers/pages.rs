// src/handlers/pages.rs
//
// Páginas HTML do caixa. Os templates são estáticos e embutidos no binário;
// só `{{currency}}` e `{{username}}` são substituídos.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{config::AppState, db, middleware::auth::OptionalUser};

const LOGIN_PAGE: &str = include_str!("../../templates/login.html");
const POS_PAGE: &str = include_str!("../../templates/pos.html");
const ADMIN_PAGE: &str = include_str!("../../templates/admin.html");

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render(template: &str, currency: &str, username: &str) -> Html<String> {
    Html(
        template
            .replace("{{currency}}", &escape_html(currency))
            .replace("{{username}}", &escape_html(username)),
    )
}

// GET /
pub async fn index(State(app_state): State<AppState>, OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(user) => render(POS_PAGE, &app_state.settings.currency, &user.username).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

// GET /admin
pub async fn admin_page(State(app_state): State<AppState>, OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(user) if user.is_active_admin() => {
            render(ADMIN_PAGE, &app_state.settings.currency, &user.username).into_response()
        }
        Some(_) => Redirect::to("/").into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

// GET /login
pub async fn login_page(State(app_state): State<AppState>, OptionalUser(user): OptionalUser) -> Response {
    match user {
        Some(_) => Redirect::to("/").into_response(),
        None => render(LOGIN_PAGE, &app_state.settings.currency, "").into_response(),
    }
}

// GET /favicon.ico
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço e banco respondendo"),
        (status = 503, description = "Banco indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<Value>) {
    if db::ping(&app_state.db_pool).await {
        (StatusCode::OK, Json(json!({ "ok": true, "db": "ok" })))
    } else {
        tracing::error!("🔥 Health check: banco de dados não responde");
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false, "db": "down" })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_escaped() {
        let Html(page) = render("<b>{{username}}</b> {{currency}}", "CHF", "<Anna & Ben>");
        assert_eq!(page, "<b>&lt;Anna &amp; Ben&gt;</b> CHF");
    }

    #[test]
    fn templates_carry_placeholders() {
        assert!(POS_PAGE.contains("{{currency}}"));
        assert!(POS_PAGE.contains("{{username}}"));
        assert!(ADMIN_PAGE.contains("{{currency}}"));
        assert!(LOGIN_PAGE.contains("/api/login"));
    }
}
