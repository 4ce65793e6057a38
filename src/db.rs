pub mod item_repo;
pub use item_repo::ItemRepository;
pub mod payment_repo;
pub use payment_repo::PaymentMethodRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod sale_repo;
pub use sale_repo::SaleRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
mod legacy;

use std::{str::FromStr, time::Duration};

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::common::error::AppError;

/// Migrações embutidas a partir de `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Caminho especial para um banco efêmero (testes, demonstrações).
pub const MEMORY_DATABASE: &str = ":memory:";

pub async fn connect(database_path: &str) -> Result<SqlitePool, AppError> {
    if database_path == MEMORY_DATABASE {
        // Cada conexão :memory: é um banco novo, então uma única conexão que nunca expira.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        return Ok(pool);
    }

    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Migrações embutidas, cercadas pela adaptação de bancos da versão antiga.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    legacy::prepare_schema(pool).await?;
    MIGRATOR.run(pool).await?;
    legacy::import_sales(pool).await?;
    Ok(())
}

pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Banco em memória já migrado, para os testes.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect(MEMORY_DATABASE).await.expect("pool em memória");
    run_migrations(&pool).await.expect("migrações");
    pool
}

/// Banco em memória no formato da versão antiga, ainda sem migrações.
#[cfg(test)]
pub(crate) async fn legacy_pool() -> SqlitePool {
    let pool = connect(MEMORY_DATABASE).await.expect("pool em memória");
    sqlx::raw_sql(legacy::LEGACY_FIXTURE)
        .execute(&pool)
        .await
        .expect("esquema antigo");
    pool
}

/// Contagem crua de linhas de uma tabela, para as asserções dos testes.
#[cfg(test)]
pub(crate) async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("contagem")
}
