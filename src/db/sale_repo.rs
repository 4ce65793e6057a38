// src/db/sale_repo.rs

use sqlx::{Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::sale::{PricedLine, SaleHeader},
};

/// Sem estado: todas as operações rodam no executor recebido (pool ou transação).
#[derive(Clone, Default)]
pub struct SaleRepository;

impl SaleRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert_header<'e, E>(
        &self,
        executor: E,
        created_at: &str,
        user_id: i64,
        payment_method_id: i64,
        total: f64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO sale_headers (created_at, user_id, payment_method_id, total)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(created_at)
        .bind(user_id)
        .bind(payment_method_id)
        .bind(total)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn insert_line<'e, E>(&self, executor: E, sale_id: i64, line: &PricedLine) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO sale_lines (sale_id, item_id, item_name, qty, unit_price, line_total)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(sale_id)
        .bind(line.item_id)
        .bind(&line.item_name)
        .bind(line.qty)
        .bind(line.unit_price)
        .bind(line.line_total)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// O cabeçalho mais recente é o de maior id.
    pub async fn latest_header<'e, E>(&self, executor: E) -> Result<Option<SaleHeader>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let header = sqlx::query_as::<_, SaleHeader>(
            r#"
            SELECT id, created_at, user_id, payment_method_id, total
            FROM sale_headers
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(executor)
        .await?;

        Ok(header)
    }

    pub async fn delete_lines<'e, E>(&self, executor: E, sale_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM sale_lines WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_header<'e, E>(&self, executor: E, sale_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM sale_headers WHERE id = ?1")
            .bind(sale_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
