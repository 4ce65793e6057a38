// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{User, UserWrite},
    services::session_store::SessionStore,
};

/// Hash bcrypt fora do runtime assíncrono.
pub async fn hash_pin(pin: &str, cost: u32) -> Result<String, AppError> {
    let pin_clone = pin.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&pin_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_pin(pin: &str, pin_hash: &str) -> Result<bool, AppError> {
    let pin_clone = pin.to_owned();
    let hash_clone = pin_hash.to_owned();

    // Executa a verificação em um thread separado
    let valid = tokio::task::spawn_blocking(move || verify(&pin_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de PIN: {}", e))?;

    // Hash corrompido conta como PIN errado, não como erro interno.
    Ok(valid.unwrap_or(false))
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    sessions: Arc<dyn SessionStore>,
    pin_cost: u32,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, sessions: Arc<dyn SessionStore>, pin_cost: u32) -> Self {
        Self { user_repo, sessions, pin_cost }
    }

    /// Confere usuário + PIN e abre uma sessão. Devolve o usuário e o token do cookie.
    pub async fn login_user(&self, username: &str, pin: &str) -> Result<(User, String), AppError> {
        let username = username.trim();
        let pin = pin.trim();
        if username.is_empty() || pin.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|user| user.active)
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_pin(pin, &user.pin_hash).await? {
            tracing::warn!("PIN incorreto para '{}'", user.username);
            return Err(AppError::InvalidCredentials);
        }

        let token = self.sessions.create(user.id).await?;
        tracing::info!("🔑 Login de '{}' (admin: {})", user.username, user.is_admin);
        Ok((user, token))
    }

    /// Token -> usuário ativo. Sessões de usuários apagados ou desativados deixam de valer.
    pub async fn resolve_session(&self, token: &str) -> Result<User, AppError> {
        let user_id = self
            .sessions
            .lookup(token)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        self.user_repo
            .find_by_id(self.user_repo.pool(), user_id)
            .await?
            .filter(|user| user.active)
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.destroy(token).await
    }

    /// Roda depois das migrações: garante um admin num banco vazio e
    /// converte PINs em texto puro de versões antigas para bcrypt.
    pub async fn reconcile_credentials(&self, default_admin_pin: &str) -> Result<(), AppError> {
        if self.user_repo.count_all().await? == 0 {
            let admin = UserWrite {
                username: "Admin".to_string(),
                pin_hash: Some(hash_pin(default_admin_pin, self.pin_cost).await?),
                is_admin: true,
                active: true,
            };
            self.user_repo.insert(self.user_repo.pool(), &admin).await?;
            tracing::warn!("👤 Usuário 'Admin' criado com o PIN padrão. Troque-o no painel.");
        }

        let legacy = self.user_repo.list_plaintext_pins().await?;
        for (id, plain) in &legacy {
            let hashed = hash_pin(plain, self.pin_cost).await?;
            self.user_repo.set_pin_hash(*id, &hashed).await?;
        }
        if !legacy.is_empty() {
            tracing::info!("🔒 {} PIN(s) em texto puro convertidos para bcrypt", legacy.len());
        }

        Ok(())
    }
}
