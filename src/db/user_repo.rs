// src/db/user_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::{
        db_utils::unique_violation_as,
        error::{AppError, Entity},
    },
    models::auth::{User, UserWrite},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, pin_hash, is_admin, active FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, pin_hash, is_admin, active FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, pin_hash, is_admin, active FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn count_all(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_active_admins<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE is_admin = 1 AND active = 1",
        )
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// `pin_hash` é obrigatório aqui; o service garante isso antes.
    pub async fn insert<'e, E>(&self, executor: E, user: &UserWrite) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let pin_hash = user
            .pin_hash
            .as_deref()
            .ok_or_else(|| AppError::MalformedPayload("pin ausente na inserção".into()))?;

        let result = sqlx::query(
            "INSERT INTO users (username, pin_hash, is_admin, active) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&user.username)
        .bind(pin_hash)
        .bind(user.is_admin)
        .bind(user.active)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::User))?;

        Ok(result.last_insert_rowid())
    }

    /// Sem `pin_hash`, o PIN atual é mantido.
    pub async fn update<'e, E>(&self, executor: E, id: i64, user: &UserWrite) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?1,
                pin_hash = COALESCE(?2, pin_hash),
                is_admin = ?3,
                active = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&user.username)
        .bind(user.pin_hash.as_deref())
        .bind(user.is_admin)
        .bind(user.active)
        .bind(id)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::User))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// PINs gravados em texto puro por versões antigas (qualquer coisa que não seja bcrypt).
    pub async fn list_plaintext_pins(&self) -> Result<Vec<(i64, String)>, AppError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, pin_hash FROM users WHERE pin_hash NOT LIKE '$2%'",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn set_pin_hash(&self, id: i64, pin_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET pin_hash = ?1 WHERE id = ?2")
            .bind(pin_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
