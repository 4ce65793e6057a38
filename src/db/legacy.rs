// src/db/legacy.rs
//
// Atualização de bancos `sales.db` gravados pela versão antiga do caixa:
// `items(id,name,price)`, `users(...,pin,...)`, a tabela `sales` como cabeçalho
// e `sale_lines(id,sale_id,item_id,qty,price)`.
//
// `prepare_schema` roda antes das migrações e só acrescenta colunas ou tira as
// vendas antigas do caminho. `import_sales` roda depois e copia essas vendas
// para `sale_headers`/`sale_lines`. As duas são no-op num banco já atualizado.

use sqlx::{SqliteConnection, SqlitePool};

use crate::common::error::AppError;

const LEGACY_SALES: &str = "legacy_sales";
const LEGACY_LINES: &str = "legacy_sale_lines";

async fn columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>, AppError> {
    let names = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
        .bind(table)
        .fetch_all(&mut *conn)
        .await?;
    Ok(names)
}

async fn object_type(conn: &mut SqliteConnection, name: &str) -> Result<Option<String>, AppError> {
    let kind = sqlx::query_scalar::<_, String>("SELECT type FROM sqlite_master WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(kind)
}

/// Comandos para trazer as tabelas de catálogo e usuários ao formato atual.
fn catalog_upgrades(table: &str, cols: &[String]) -> Vec<String> {
    let has = |name: &str| cols.iter().any(|c| c == name);
    let mut stmts = Vec::new();
    if cols.is_empty() {
        return stmts;
    }

    if table == "users" && !has("pin_hash") && has("pin") {
        // O conteúdo continua em texto puro; o bcrypt vem no reconcile de credenciais.
        stmts.push("ALTER TABLE users RENAME COLUMN pin TO pin_hash".to_string());
    }
    if !has("active") {
        stmts.push(format!("ALTER TABLE {table} ADD COLUMN active INTEGER NOT NULL DEFAULT 1"));
    }
    if table != "users" && !has("sort_order") {
        stmts.push(format!("ALTER TABLE {table} ADD COLUMN sort_order INTEGER NOT NULL DEFAULT 0"));
        stmts.push(format!("UPDATE {table} SET sort_order = id"));
    }
    stmts
}

pub async fn prepare_schema(pool: &SqlitePool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;
    let mut touched = false;

    for table in ["items", "payment_methods", "users"] {
        let cols = columns(&mut tx, table).await?;
        for stmt in catalog_upgrades(table, &cols) {
            sqlx::query(&stmt).execute(&mut *tx).await?;
            touched = true;
        }
    }

    // Linhas antigas não guardam nome nem total: o nome sai do catálogo agora,
    // antes da deduplicação da migração 0002 apagar itens repetidos.
    let line_cols = columns(&mut tx, "sale_lines").await?;
    if !line_cols.is_empty() && !line_cols.iter().any(|c| c == "item_name") {
        sqlx::query(&format!(
            "CREATE TABLE {LEGACY_LINES} AS
             SELECT l.id AS id, l.sale_id AS sale_id, l.item_id AS item_id,
                    COALESCE(i.name, '') AS item_name, l.qty AS qty, l.price AS unit_price
             FROM sale_lines l LEFT JOIN items i ON i.id = l.item_id"
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query("DROP TABLE sale_lines").execute(&mut *tx).await?;
        touched = true;
    }

    // `sales` passa a ser uma view; a tabela antiga precisa sair do caminho.
    if object_type(&mut tx, "sales").await?.as_deref() == Some("table") {
        sqlx::query(&format!(
            "CREATE TABLE {LEGACY_SALES} AS
             SELECT id, created_at, user_id, payment_method_id, total FROM sales"
        ))
        .execute(&mut *tx)
        .await?;
        sqlx::query("DROP TABLE sales").execute(&mut *tx).await?;
        touched = true;
    }

    tx.commit().await?;
    if touched {
        tracing::info!("🗄️ Banco da versão antiga detectado; esquema adaptado antes das migrações");
    }
    Ok(())
}

pub async fn import_sales(pool: &SqlitePool) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let has_sales = object_type(&mut tx, LEGACY_SALES).await?.is_some();
    let has_lines = object_type(&mut tx, LEGACY_LINES).await?.is_some();
    if !has_sales && !has_lines {
        return Ok(());
    }

    let mut headers = 0;
    if has_sales {
        // isoformat() antigo pode trazer microssegundos ou espaço no lugar do 'T'.
        headers = sqlx::query(&format!(
            "INSERT INTO sale_headers (id, created_at, user_id, payment_method_id, total)
             SELECT id, substr(replace(created_at, ' ', 'T'), 1, 19), user_id, payment_method_id, total
             FROM {LEGACY_SALES}"
        ))
        .execute(&mut *tx)
        .await?
        .rows_affected();
        sqlx::query(&format!("DROP TABLE {LEGACY_SALES}")).execute(&mut *tx).await?;
    }

    let mut lines = 0;
    if has_lines {
        lines = sqlx::query(&format!(
            "INSERT INTO sale_lines (id, sale_id, item_id, item_name, qty, unit_price, line_total)
             SELECT id, sale_id, item_id, item_name, qty, unit_price, ROUND(qty * unit_price, 2)
             FROM {LEGACY_LINES}
             WHERE qty > 0 AND sale_id IN (SELECT id FROM sale_headers)"
        ))
        .execute(&mut *tx)
        .await?
        .rows_affected();
        sqlx::query(&format!("DROP TABLE {LEGACY_LINES}")).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    tracing::info!("🗄️ {} venda(s) e {} linha(s) importadas do banco antigo", headers, lines);
    Ok(())
}

/// Esquema e dados como a versão antiga os deixava, incluindo um item repetido.
#[cfg(test)]
pub(crate) const LEGACY_FIXTURE: &str = r#"
CREATE TABLE items (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  price REAL NOT NULL
);
CREATE TABLE payment_methods (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  protected INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  username TEXT NOT NULL UNIQUE,
  pin TEXT NOT NULL,
  is_admin INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE sales (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  user_id INTEGER,
  payment_method_id INTEGER NOT NULL,
  total REAL NOT NULL,
  created_at TEXT NOT NULL,
  FOREIGN KEY(user_id) REFERENCES users(id),
  FOREIGN KEY(payment_method_id) REFERENCES payment_methods(id)
);
CREATE TABLE sale_lines (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  sale_id INTEGER NOT NULL,
  item_id INTEGER NOT NULL,
  qty INTEGER NOT NULL,
  price REAL NOT NULL,
  FOREIGN KEY(sale_id) REFERENCES items(id),
  FOREIGN KEY(item_id) REFERENCES items(id)
);
INSERT INTO items (id,name,price) VALUES (1,'Hot Dog',9.0);
INSERT INTO items (id,name,price) VALUES (2,'Hot Dog Kids',6.0);
INSERT INTO items (id,name,price) VALUES (3,'Hot Dog Veggie',7.0);
INSERT INTO items (id,name,price) VALUES (4,'Getränk',8.0);
INSERT INTO items (id,name,price) VALUES (5,'Hot Dog',9.5);
INSERT INTO payment_methods (id,name,protected) VALUES (1,'Bar',1);
INSERT INTO payment_methods (id,name,protected) VALUES (2,'Twint',0);
INSERT INTO users (id,username,pin,is_admin) VALUES (1,'Admin','0000',1);
INSERT INTO users (id,username,pin,is_admin) VALUES (2,'Lea','2468',0);
INSERT INTO sales (id,user_id,payment_method_id,total,created_at) VALUES (1,1,1,26.0,'2026-10-15T18:01:02.123456');
INSERT INTO sales (id,user_id,payment_method_id,total,created_at) VALUES (2,2,2,9.5,'2026-10-16T11:00:00');
INSERT INTO sale_lines (sale_id,item_id,qty,price) VALUES (1,1,2,9.0);
INSERT INTO sale_lines (sale_id,item_id,qty,price) VALUES (1,4,1,8.0);
INSERT INTO sale_lines (sale_id,item_id,qty,price) VALUES (2,5,1,9.5);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, legacy_pool, run_migrations};

    #[test]
    fn catalog_upgrades_only_add_what_is_missing() {
        let legacy: Vec<String> = ["id", "username", "pin", "is_admin"].map(String::from).into();
        assert_eq!(
            catalog_upgrades("users", &legacy),
            vec![
                "ALTER TABLE users RENAME COLUMN pin TO pin_hash".to_string(),
                "ALTER TABLE users ADD COLUMN active INTEGER NOT NULL DEFAULT 1".to_string(),
            ]
        );

        let current: Vec<String> = ["id", "name", "price", "active", "sort_order"].map(String::from).into();
        assert!(catalog_upgrades("items", &current).is_empty());
        assert!(catalog_upgrades("items", &[]).is_empty());
    }

    #[tokio::test]
    async fn legacy_database_is_upgraded_in_place() {
        let pool = legacy_pool().await;
        run_migrations(&pool).await.unwrap();

        // O "Hot Dog" repetido some, os quatro itens originais ficam ativos e ordenados.
        let items: Vec<(i64, String, bool, i64)> =
            sqlx::query_as("SELECT id, name, active, sort_order FROM items ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(items.len(), 4);
        assert!(items.iter().all(|(id, _, active, sort)| *active && sort == id));

        let twint: (bool, bool) =
            sqlx::query_as("SELECT active, protected FROM payment_methods WHERE name = 'Twint'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(twint, (true, false));

        let lea: (String, bool) = sqlx::query_as("SELECT pin_hash, active FROM users WHERE username = 'Lea'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(lea, ("2468".to_string(), true));

        // Vendas antigas viram cabeçalhos + linhas; `sales` agora é a view.
        let headers: Vec<(i64, String, f64)> =
            sqlx::query_as("SELECT id, created_at, total FROM sale_headers ORDER BY id")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(
            headers,
            vec![(1, "2026-10-15T18:01:02".to_string(), 26.0), (2, "2026-10-16T11:00:00".to_string(), 9.5)]
        );

        let lines: Vec<(i64, String, i64, f64)> = sqlx::query_as(
            "SELECT sale_id, item_name, qty, total FROM sales ORDER BY id",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            lines,
            vec![
                (1, "Hot Dog".to_string(), 2, 18.0),
                (1, "Getränk".to_string(), 1, 8.0),
                (2, "Hot Dog".to_string(), 1, 9.5),
            ]
        );

        let leftovers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE name LIKE 'legacy_%'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn upgrade_runs_once() {
        let pool = legacy_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        assert_eq!(count_rows(&pool, "sale_headers").await, 2);
        assert_eq!(count_rows(&pool, "sale_lines").await, 3);
    }
}
