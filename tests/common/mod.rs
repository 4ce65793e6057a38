//! Utilitários comuns dos testes HTTP.

#![allow(dead_code)] // Cada arquivo de teste usa uma parte diferente

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use till_pos::{create_router, AppState, Settings};

pub const SECRET: &str = "segredo-de-teste-bem-comprido";

/// Aplicação completa sobre um banco em memória novo, com o admin padrão (PIN 0000).
pub async fn app() -> Router {
    let mut settings = Settings::new(":memory:", SECRET);
    settings.pin_cost = 4;
    let state = AppState::new(settings).await.expect("Falha ao montar o estado");
    create_router(state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("resposta não é JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("resposta não é UTF-8")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("requisição falhou");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.expect("corpo").to_bytes();
    TestResponse { status, headers, body }
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> TestResponse {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// Faz login e devolve o par `pos_session=...` pronto para o header Cookie.
pub async fn login(app: &Router, username: &str, pin: &str) -> String {
    let response = post_json(
        app,
        "/api/login",
        None,
        serde_json::json!({ "username": username, "pin": pin }),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "login de {username} falhou: {}", response.text());

    let set_cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sem Set-Cookie");
    set_cookie.split(';').next().unwrap().to_string()
}
