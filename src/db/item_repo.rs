// src/db/item_repo.rs

use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::{
        db_utils::unique_violation_as,
        error::{AppError, Entity},
    },
    models::catalog::{Item, ItemFields},
};

#[derive(Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, only_active: bool) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, price, active, sort_order
            FROM items
            WHERE (?1 = 0 OR active = 1)
            ORDER BY sort_order, id
            "#,
        )
        .bind(only_active)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Busca os itens ativos entre os ids pedidos. Ids desconhecidos somem do resultado.
    pub async fn find_active_by_ids(&self, ids: &[i64]) -> Result<Vec<Item>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, price, active, sort_order FROM items WHERE active = 1 AND id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let items = qb.build_query_as::<Item>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn insert<'e, E>(&self, executor: E, fields: &ItemFields) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO items (name, price, active, sort_order) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.active)
        .bind(fields.sort_order)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::Item))?;

        Ok(result.last_insert_rowid())
    }

    /// Retorna `false` se o id não existe.
    pub async fn update<'e, E>(&self, executor: E, id: i64, fields: &ItemFields) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?1, price = ?2, active = ?3, sort_order = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.active)
        .bind(fields.sort_order)
        .bind(id)
        .execute(executor)
        .await
        .map_err(unique_violation_as(Entity::Item))?;

        Ok(result.rows_affected() > 0)
    }

    // Delete físico: as linhas de venda guardam nome e preço, o histórico não depende do item.
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
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

    fn fields(name: &str, price: f64) -> ItemFields {
        ItemFields { name: name.into(), price, active: true, sort_order: 9 }
    }

    #[tokio::test]
    async fn insert_update_delete() {
        let pool = test_pool().await;
        let repo = ItemRepository::new(pool.clone());

        let id = repo.insert(&pool, &fields("Wasser", 3.5)).await.unwrap();
        assert!(repo.update(&pool, id, &ItemFields { active: false, ..fields("Mineral", 4.0) }).await.unwrap());

        let all = repo.list(false).await.unwrap();
        let mineral = all.iter().find(|i| i.id == id).unwrap();
        assert_eq!(mineral.name, "Mineral");
        assert!(!mineral.active);
        assert!(repo.list(true).await.unwrap().iter().all(|i| i.id != id));

        assert!(repo.delete(&pool, id).await.unwrap());
        assert!(!repo.delete(&pool, id).await.unwrap());
        assert!(!repo.update(&pool, id, &fields("Nada", 1.0)).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_name_is_friendly() {
        let pool = test_pool().await;
        let repo = ItemRepository::new(pool.clone());

        let err = repo.insert(&pool, &fields("Hot Dog", 1.0)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(Entity::Item)));
    }

    #[tokio::test]
    async fn find_active_by_ids_skips_unknown_and_inactive() {
        let pool = test_pool().await;
        let repo = ItemRepository::new(pool.clone());
        repo.update(&pool, 3, &ItemFields { active: false, ..fields("Hot Dog Veggie", 7.0) })
            .await
            .unwrap();

        let mut found: Vec<i64> = repo
            .find_active_by_ids(&[1, 3, 99])
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        found.sort();

        assert_eq!(found, vec![1]);
        assert!(repo.find_active_by_ids(&[]).await.unwrap().is_empty());
    }
}
