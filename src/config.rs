// src/config.rs

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use sqlx::SqlitePool;

use crate::{
    db::{self, ItemRepository, PaymentMethodRepository, ReportRepository, SaleRepository, UserRepository},
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        export_service::ExportService,
        report_service::ReportService,
        sale_service::SaleService,
        session_store::{MemorySessionStore, SessionStore},
        user_service::UserService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: String,
    pub session_secret: String,
    pub bind_addr: SocketAddr,
    pub currency: String,
    pub session_ttl_hours: i64,
    /// Só usado quando a tabela de usuários está vazia.
    pub default_admin_pin: String,
    pub pin_cost: u32,
}

impl Settings {
    pub fn new(database_path: impl Into<String>, session_secret: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            session_secret: session_secret.into(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            currency: "CHF".to_string(),
            session_ttl_hours: 12,
            default_admin_pin: "0000".to_string(),
            pin_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret = var("SESSION_SECRET").context("SESSION_SECRET deve ser definido")?;
        let mut settings = Self::new(var("DATABASE_PATH").unwrap_or_else(|| "sales.db".into()), secret);

        if let Some(raw) = var("BIND_ADDR") {
            settings.bind_addr = raw.parse().with_context(|| format!("BIND_ADDR inválido: {raw}"))?;
        }
        if let Some(currency) = var("CURRENCY") {
            settings.currency = currency;
        }
        if let Some(raw) = var("SESSION_TTL_HOURS") {
            let hours: i64 = raw
                .parse()
                .with_context(|| format!("SESSION_TTL_HOURS inválido: {raw}"))?;
            anyhow::ensure!(hours > 0, "SESSION_TTL_HOURS deve ser positivo");
            settings.session_ttl_hours = hours;
        }
        if let Some(pin) = var("DEFAULT_ADMIN_PIN") {
            settings.default_admin_pin = pin;
        }
        if let Some(raw) = var("PIN_HASH_COST") {
            let cost: u32 = raw.parse().with_context(|| format!("PIN_HASH_COST inválido: {raw}"))?;
            anyhow::ensure!((4..=31).contains(&cost), "PIN_HASH_COST deve estar entre 4 e 31");
            settings.pin_cost = cost;
        }

        Ok(settings)
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub user_service: UserService,
    pub sale_service: SaleService,
    pub report_service: ReportService,
    pub export_service: ExportService,
}

impl AppState {
    /// Conecta, migra e monta o gráfico de dependências com sessões em memória.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = db::connect(&settings.database_path)
            .await
            .with_context(|| format!("Falha ao abrir o banco '{}'", settings.database_path))?;
        tracing::info!("✅ Banco de dados aberto: {}", settings.database_path);

        db::run_migrations(&db_pool).await.context("Falha ao rodar as migrações")?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(
            &settings.session_secret,
            chrono::Duration::hours(settings.session_ttl_hours),
        ));

        Self::from_parts(db_pool, settings, sessions).await
    }

    /// Monta o estado sobre um pool já migrado e um store de sessões qualquer.
    pub async fn from_parts(
        db_pool: SqlitePool,
        settings: Settings,
        sessions: Arc<dyn SessionStore>,
    ) -> anyhow::Result<Self> {
        // --- Repositórios ---
        let item_repo = ItemRepository::new(db_pool.clone());
        let payment_repo = PaymentMethodRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());
        let sale_repo = SaleRepository::new();
        let report_repo = ReportRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(user_repo.clone(), sessions, settings.pin_cost);
        let catalog_service = CatalogService::new(db_pool.clone(), item_repo.clone(), payment_repo.clone());
        let user_service = UserService::new(db_pool.clone(), user_repo, settings.pin_cost);
        let sale_service = SaleService::new(db_pool.clone(), item_repo, payment_repo, sale_repo);
        let report_service = ReportService::new(report_repo.clone());
        let export_service = ExportService::new(report_repo);

        auth_service
            .reconcile_credentials(&settings.default_admin_pin)
            .await
            .context("Falha ao preparar os usuários")?;

        Ok(Self {
            db_pool,
            settings: Arc::new(settings),
            auth_service,
            catalog_service,
            user_service,
            sale_service,
            report_service,
            export_service,
        })
    }
}
