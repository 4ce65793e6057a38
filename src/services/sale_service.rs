// src/services/sale_service.rs

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::{
    common::{clock, db_utils::round_money, error::AppError},
    db::{ItemRepository, PaymentMethodRepository, SaleRepository},
    models::{
        catalog::Item,
        sale::{CartLine, PricedCart, PricedLine, SalePayload, SaleReceipt, UndoResult},
    },
};

/// Precifica o carrinho com os itens do catálogo. Linhas com quantidade <= 0
/// ou item desconhecido são descartadas; o preço do cliente nunca é usado.
pub fn price_cart(lines: &[CartLine], catalog: &HashMap<i64, Item>) -> PricedCart {
    let mut cart = PricedCart::default();
    for line in lines.iter().filter(|line| line.qty > 0) {
        let Some(item) = catalog.get(&line.item_id) else {
            continue;
        };
        let line_total = round_money(item.price * line.qty as f64);
        cart.total += line_total;
        cart.lines.push(PricedLine {
            item_id: item.id,
            item_name: item.name.clone(),
            qty: line.qty,
            unit_price: item.price,
            line_total,
        });
    }
    cart.total = round_money(cart.total);
    cart
}

#[derive(Clone)]
pub struct SaleService {
    pool: SqlitePool,
    item_repo: ItemRepository,
    payment_repo: PaymentMethodRepository,
    sale_repo: SaleRepository,
}

impl SaleService {
    pub fn new(
        pool: SqlitePool,
        item_repo: ItemRepository,
        payment_repo: PaymentMethodRepository,
        sale_repo: SaleRepository,
    ) -> Self {
        Self { pool, item_repo, payment_repo, sale_repo }
    }

    pub async fn record_sale(&self, user_id: i64, payload: &SalePayload) -> Result<SaleReceipt, AppError> {
        // 1. Forma de pagamento: presente, existente e ativa
        let payment_method_id = payload.payment_method_id.ok_or(AppError::MissingPaymentMethod)?;
        let method = self
            .payment_repo
            .find_by_id(&self.pool, payment_method_id)
            .await?
            .filter(|method| method.active)
            .ok_or(AppError::InvalidPaymentMethod(payment_method_id))?;

        // 2. Preços atuais do catálogo (inativos contam como desconhecidos)
        let ids: Vec<i64> = payload.lines.iter().filter(|l| l.qty > 0).map(|l| l.item_id).collect();
        let catalog: HashMap<i64, Item> = self
            .item_repo
            .find_active_by_ids(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let cart = price_cart(&payload.lines, &catalog);
        if cart.lines.is_empty() {
            return Err(AppError::EmptySale);
        }

        // 3. Cabeçalho + linhas, tudo ou nada
        let created_at = clock::format_timestamp(clock::now_local());
        let mut tx = self.pool.begin().await?;

        let sale_id = self
            .sale_repo
            .insert_header(&mut *tx, &created_at, user_id, method.id, cart.total)
            .await?;
        for line in &cart.lines {
            self.sale_repo.insert_line(&mut *tx, sale_id, line).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "🧾 Venda #{} registrada: {} linha(s), total {:.2} ({})",
            sale_id,
            cart.lines.len(),
            cart.total,
            method.name
        );

        Ok(SaleReceipt { ok: true, sale_id, total: cart.total })
    }

    /// Apaga a venda mais recente (maior id) e as linhas dela.
    pub async fn undo_last_sale(&self) -> Result<UndoResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let header = self
            .sale_repo
            .latest_header(&mut *tx)
            .await?
            .ok_or(AppError::NothingToUndo)?;

        let removed_lines = self.sale_repo.delete_lines(&mut *tx, header.id).await?;
        self.sale_repo.delete_header(&mut *tx, header.id).await?;

        tx.commit().await?;

        tracing::info!(
            "↩️ Venda #{} desfeita ({} linha(s), total {:.2})",
            header.id,
            removed_lines,
            header.total
        );

        Ok(UndoResult { ok: true, sale_id: header.id, total: round_money(header.total) })
    }
}
