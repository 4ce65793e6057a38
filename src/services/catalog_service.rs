// src/services/catalog_service.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::{ItemRepository, PaymentMethodRepository},
    models::{
        batch::{validate_batch, BatchOp, BatchOutcome},
        catalog::{Item, ItemFields, PaymentMethod, PaymentMethodFields},
    },
};

#[derive(Clone)]
pub struct CatalogService {
    pool: SqlitePool,
    item_repo: ItemRepository,
    payment_repo: PaymentMethodRepository,
}

impl CatalogService {
    pub fn new(pool: SqlitePool, item_repo: ItemRepository, payment_repo: PaymentMethodRepository) -> Self {
        Self { pool, item_repo, payment_repo }
    }

    pub async fn list_items(&self, only_active: bool) -> Result<Vec<Item>, AppError> {
        self.item_repo.list(only_active).await
    }

    pub async fn list_payment_methods(&self, only_active: bool) -> Result<Vec<PaymentMethod>, AppError> {
        self.payment_repo.list(only_active).await
    }

    /// Aplica o lote inteiro numa transação. Qualquer erro desfaz tudo.
    pub async fn apply_item_batch(&self, ops: Vec<BatchOp<ItemFields>>) -> Result<BatchOutcome, AppError> {
        let ops: Vec<_> = ops.into_iter().map(|op| op.map_fields(ItemFields::normalized)).collect();
        validate_batch(&ops)?;

        let mut outcome = BatchOutcome::new();
        let mut tx = self.pool.begin().await?;

        for op in &ops {
            match op {
                BatchOp::Insert { fields } => {
                    self.item_repo.insert(&mut *tx, fields).await?;
                    outcome.inserted += 1;
                }
                BatchOp::Update { id, fields } => {
                    if self.item_repo.update(&mut *tx, *id, fields).await? {
                        outcome.updated += 1;
                    } else {
                        outcome.skipped += 1;
                    }
                }
                BatchOp::Delete { id } => {
                    if self.item_repo.delete(&mut *tx, *id).await? {
                        outcome.deleted += 1;
                    } else {
                        outcome.skipped += 1;
                    }
                }
            }
        }

        tx.commit().await?;
        tracing::info!(
            "📦 Itens: +{} ~{} -{} (ignorados: {})",
            outcome.inserted,
            outcome.updated,
            outcome.deleted,
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Como `apply_item_batch`, mas formas protegidas nunca são apagadas.
    pub async fn apply_payment_batch(
        &self,
        ops: Vec<BatchOp<PaymentMethodFields>>,
    ) -> Result<BatchOutcome, AppError> {
        let ops: Vec<_> = ops
            .into_iter()
            .map(|op| op.map_fields(PaymentMethodFields::normalized))
            .collect();
        validate_batch(&ops)?;

        let mut outcome = BatchOutcome::new();
        let mut tx = self.pool.begin().await?;

        for op in &ops {
            match op {
                BatchOp::Insert { fields } => {
                    self.payment_repo.insert(&mut *tx, fields).await?;
                    outcome.inserted += 1;
                }
                BatchOp::Update { id, fields } => {
                    if self.payment_repo.update(&mut *tx, *id, fields).await? {
                        outcome.updated += 1;
                    } else {
                        outcome.skipped += 1;
                    }
                }
                BatchOp::Delete { id } => match self.payment_repo.find_by_id(&mut *tx, *id).await? {
                    Some(method) if method.protected => {
                        tracing::warn!("🛡️ Forma de pagamento protegida '{}' não foi apagada", method.name);
                        outcome.skipped += 1;
                    }
                    Some(_) => {
                        if self.payment_repo.delete_unprotected(&mut *tx, *id).await? {
                            outcome.deleted += 1;
                        } else {
                            outcome.skipped += 1;
                        }
                    }
                    None => outcome.skipped += 1,
                },
            }
        }

        tx.commit().await?;
        tracing::info!(
            "💳 Formas de pagamento: +{} ~{} -{} (ignorados: {})",
            outcome.inserted,
            outcome.updated,
            outcome.deleted,
            outcome.skipped
        );
        Ok(outcome)
    }
}
