// src/db/payment_repo.rs

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::{
    common::{
        db_utils::unique_violation_as,
        error::{AppError, Entity},
    },
    models::catalog::{PaymentMethod, PaymentMethodFields},
};

#[derive(Clone)]
pub struct PaymentMethodRepository {
    pool: SqlitePool,
}

impl PaymentMethodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<PaymentMethod>, AppError> {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT id, name, active, sort_order, protected
            FROM payment_methods
            WHERE (?1 = 0 OR active = 1)
            ORDER BY sort_order, id
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(methods)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let method = sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, name, active, sort_order, protected FROM payment_methods WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(method)
    }

    pub async fn insert<'e, E>(&self, executor: E, fields: &PaymentMethodFields) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_methods (name, active, sort_order, protected)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&fields.name)
        .bind(fields.active)
        .bind(fields.sort_order)
        .bind(fields.protected)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::PaymentMethod))?;

        Ok(result.last_insert_rowid())
    }

    /// `protected` só sobe: MAX(atual, pedido) nunca desprotege.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i64,
        fields: &PaymentMethodFields,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE payment_methods
            SET name = ?1, active = ?2, sort_order = ?3, protected = MAX(protected, ?4)
            WHERE id = ?5
            "#,
        )
        .bind(&fields.name)
        .bind(fields.active)
        .bind(fields.sort_order)
        .bind(fields.protected)
        .bind(id)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::PaymentMethod))?;

        Ok(result.rows_affected() > 0)
    }

    // A checagem de `protected` fica no service; aqui o filtro é só uma segunda trava.
    pub async fn delete_unprotected<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM payment_methods WHERE id = ?1 AND protected = 0")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn fields(name: &str, protected: bool) -> PaymentMethodFields {
        PaymentMethodFields { name: name.into(), active: true, sort_order: 0, protected }
    }

    #[tokio::test]
    async fn protected_flag_is_sticky() {
        let pool = test_pool().await;
        let repo = PaymentMethodRepository::new(pool.clone());

        assert!(repo.update(&pool, 1, &fields("Bargeld", false)).await.unwrap());
        let bar = repo.find_by_id(&pool, 1).await.unwrap().unwrap();
        assert_eq!(bar.name, "Bargeld");
        assert!(bar.protected);

        let twint = repo.insert(&pool, &fields("Twint", false)).await.unwrap();
        repo.update(&pool, twint, &fields("Twint", true)).await.unwrap();
        assert!(repo.find_by_id(&pool, twint).await.unwrap().unwrap().protected);
    }

    #[tokio::test]
    async fn protected_rows_survive_delete() {
        let pool = test_pool().await;
        let repo = PaymentMethodRepository::new(pool.clone());

        assert!(!repo.delete_unprotected(&pool, 1).await.unwrap());
        assert!(repo.find_by_id(&pool, 1).await.unwrap().is_some());

        let karte = repo.insert(&pool, &fields("Karte", false)).await.unwrap();
        assert!(repo.delete_unprotected(&pool, karte).await.unwrap());
        assert_eq!(repo.list(false).await.unwrap().len(), 1);
    }
}
