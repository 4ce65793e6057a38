// src/services/session_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::common::error::AppError;

/// Nome do cookie que carrega o token de sessão.
pub const SESSION_COOKIE: &str = "pos_session";

/// Armazenamento de sessões do lado do servidor, injetado no `AppState`.
/// O token é opaco para os handlers: só o store sabe interpretá-lo.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Abre uma sessão para o usuário e devolve o token do cookie.
    async fn create(&self, user_id: i64) -> Result<String, AppError>;

    /// Resolve um token para o id do usuário. Token inválido, expirado
    /// ou já destruído resolve para `None`.
    async fn lookup(&self, token: &str) -> Result<Option<i64>, AppError>;

    async fn destroy(&self, token: &str) -> Result<(), AppError>;
}

// Estrutura de dados ("claims") dentro do token assinado
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sid: Uuid,
    exp: usize,
    iat: usize,
}

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

/// Sessões em memória, com o id assinado (HS256) no cookie.
/// Reiniciar o processo desloga todo mundo.
pub struct MemorySessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn decode_sid(&self, token: &str, check_expiry: bool) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = check_expiry;
        validation.leeway = 0;
        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .ok()
            .map(|data| data.claims.sid)
    }

    #[cfg(test)]
    pub async fn active_sessions(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|record| record.expires_at > now)
            .count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let sid = Uuid::new_v4();

        let claims = SessionClaims {
            sid,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, record| record.expires_at > now);
        sessions.insert(sid, SessionRecord { user_id, expires_at });

        Ok(token)
    }

    async fn lookup(&self, token: &str) -> Result<Option<i64>, AppError> {
        let Some(sid) = self.decode_sid(token, true) else {
            return Ok(None);
        };

        let now = Utc::now();
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&sid)
            .filter(|record| record.expires_at > now)
            .map(|record| record.user_id))
    }

    async fn destroy(&self, token: &str) -> Result<(), AppError> {
        // Logout também precisa funcionar com token já expirado.
        if let Some(sid) = self.decode_sid(token, false) {
            self.sessions.write().await.remove(&sid);
        }
        Ok(())
    }
}
