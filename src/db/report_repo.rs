// src/db/report_repo.rs

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::{
    common::error::AppError,
    models::report::{DayTotals, ItemTotal, LegacySaleRow, PurchaseLine, SaleFilter},
};

/// Acrescenta as condições do filtro. `col` é o prefixo da tabela/visão ("sh." ou "").
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter, col: &str) {
    if let Some(from) = &filter.from {
        qb.push(format!(" AND {col}created_at >= ")).push_bind(from.clone());
    }
    if let Some(until) = &filter.until {
        qb.push(format!(" AND {col}created_at < ")).push_bind(until.clone());
    }
    if let Some(pm) = filter.payment_method_id {
        qb.push(format!(" AND {col}payment_method_id = ")).push_bind(pm);
    }
    if let Some(user) = filter.user_id {
        qb.push(format!(" AND {col}user_id = ")).push_bind(user);
    }
}

// Somente leitura. Resultados vazios viram listas vazias / zeros, nunca erro.
#[derive(Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Uma linha por item vendido, da venda mais nova para a mais antiga.
    pub async fn purchase_lines(&self, filter: &SaleFilter) -> Result<Vec<PurchaseLine>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                sh.id AS sale_id,
                sh.created_at AS created_at,
                sl.id AS line_id,
                sl.item_id AS item_id,
                sl.item_name AS item_name,
                sl.qty AS qty,
                sl.unit_price AS unit_price,
                sl.line_total AS line_total,
                sh.payment_method_id AS payment_method_id,
                pm.name AS payment_name,
                sh.user_id AS user_id,
                u.username AS username,
                sh.total AS sale_total
            FROM sale_headers sh
            JOIN sale_lines sl ON sl.sale_id = sh.id
            LEFT JOIN payment_methods pm ON pm.id = sh.payment_method_id
            LEFT JOIN users u ON u.id = sh.user_id
            WHERE 1 = 1
            "#,
        );
        push_filter(&mut qb, filter, "sh.");
        qb.push(" ORDER BY sh.id DESC, sl.id ASC");

        let lines = qb.build_query_as::<PurchaseLine>().fetch_all(&self.pool).await?;
        Ok(lines)
    }

    /// Linhas da projeção legada `sales`, mesma ordenação.
    pub async fn legacy_rows(&self, filter: &SaleFilter) -> Result<Vec<LegacySaleRow>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT created_at, item_name, qty, price, total FROM sales WHERE 1 = 1",
        );
        push_filter(&mut qb, filter, "");
        qb.push(" ORDER BY sale_id DESC, id ASC");

        let rows = qb.build_query_as::<LegacySaleRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn totals(&self, filter: &SaleFilter) -> Result<DayTotals, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                COUNT(DISTINCT sh.id) AS orders,
                TOTAL(sl.line_total) AS amount,
                COALESCE(SUM(sl.qty), 0) AS lines
            FROM sale_headers sh
            JOIN sale_lines sl ON sl.sale_id = sh.id
            WHERE 1 = 1
            "#,
        );
        push_filter(&mut qb, filter, "sh.");

        let totals = qb.build_query_as::<DayTotals>().fetch_one(&self.pool).await?;
        Ok(totals)
    }

    pub async fn item_totals(&self, filter: &SaleFilter) -> Result<Vec<ItemTotal>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                sl.item_id AS item_id,
                sl.item_name AS name,
                SUM(sl.qty) AS qty,
                TOTAL(sl.line_total) AS amount
            FROM sale_lines sl
            JOIN sale_headers sh ON sh.id = sl.sale_id
            WHERE 1 = 1
            "#,
        );
        push_filter(&mut qb, filter, "sh.");
        qb.push(" GROUP BY sl.item_id, sl.item_name ORDER BY sl.item_id");

        let totals = qb.build_query_as::<ItemTotal>().fetch_all(&self.pool).await?;
        Ok(totals)
    }

    /// Dias locais (YYYY-MM-DD) com pelo menos uma venda, do mais novo ao mais antigo.
    pub async fn available_days(&self) -> Result<Vec<String>, AppError> {
        let days = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT substr(created_at, 1, 10) AS day
            FROM sale_headers
            ORDER BY day DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, db::SaleRepository, models::sale::PricedLine};

    async fn seed_sale(pool: &SqlitePool, at: &str, pm: i64, lines: &[(i64, i64, f64)]) -> i64 {
        let repo = SaleRepository::new();
        let total = lines.iter().map(|(_, q, p)| *q as f64 * p).sum();
        let id = repo.insert_header(pool, at, 1, pm, total).await.unwrap();
        for (item_id, qty, price) in lines {
            let line = PricedLine {
                item_id: *item_id,
                item_name: format!("Item {item_id}"),
                qty: *qty,
                unit_price: *price,
                line_total: *qty as f64 * price,
            };
            repo.insert_line(pool, id, &line).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn empty_store_yields_zeros() {
        let pool = test_pool().await;
        let repo = ReportRepository::new(pool);

        let totals = repo.totals(&SaleFilter::default()).await.unwrap();
        assert_eq!((totals.orders, totals.amount, totals.lines), (0, 0.0, 0));
        assert!(repo.purchase_lines(&SaleFilter::default()).await.unwrap().is_empty());
        assert!(repo.item_totals(&SaleFilter::default()).await.unwrap().is_empty());
        assert!(repo.available_days().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lines_are_newest_first_and_filtered() {
        let pool = test_pool().await;
        let older = seed_sale(&pool, "2026-10-15T18:00:00", 1, &[(1, 1, 9.0)]).await;
        let newer = seed_sale(&pool, "2026-10-16T09:00:00", 2, &[(2, 2, 6.0), (4, 1, 8.0)]).await;
        let repo = ReportRepository::new(pool);

        let all = repo.purchase_lines(&SaleFilter::default()).await.unwrap();
        let order: Vec<(i64, i64)> = all.iter().map(|l| (l.sale_id, l.item_id)).collect();
        assert_eq!(order, vec![(newer, 2), (newer, 4), (older, 1)]);
        assert_eq!(all[0].payment_name.as_deref(), None); // zahlart 2 não existe

        let by_pm = SaleFilter { payment_method_id: Some(1), ..Default::default() };
        let bar = repo.purchase_lines(&by_pm).await.unwrap();
        assert_eq!(bar.len(), 1);
        assert_eq!(bar[0].payment_name.as_deref(), Some("Bar"));

        let day = SaleFilter {
            from: Some("2026-10-16T00:00:00".into()),
            until: Some("2026-10-17T00:00:00".into()),
            ..Default::default()
        };
        let totals = repo.totals(&day).await.unwrap();
        assert_eq!((totals.orders, totals.amount, totals.lines), (1, 20.0, 3));
        assert_eq!(repo.legacy_rows(&day).await.unwrap().len(), 2);
        assert_eq!(
            repo.available_days().await.unwrap(),
            vec!["2026-10-16".to_string(), "2026-10-15".to_string()]
        );
    }
}
