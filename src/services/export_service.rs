// src/services/export_service.rs
//
// Exportações CSV para planilha: separador `;`, valores com duas casas decimais.

use chrono::NaiveDate;
use csv::{Writer, WriterBuilder};

use crate::{
    common::{clock::display_timestamp, error::AppError},
    db::ReportRepository,
    models::report::{Purchase, PurchaseQuery, SaleFilter},
    services::report_service::group_lines,
};

pub const LEGACY_HEADERS: [&str; 5] = ["Zeit", "Artikel", "Menge", "Preis", "Gesamt"];
pub const LINE_HEADERS: [&str; 8] =
    ["SaleID", "Zeit", "Artikel", "Menge", "Preis", "Gesamt", "Zahlart", "Benutzer"];
pub const GROUPED_HEADERS: [&str; 6] = ["Bestellung-ID", "Zeit", "Artikel", "Zahlart", "Benutzer", "Gesamt"];

fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// "2x Hot Dog, 1x Getränk"
fn summarize_items(purchase: &Purchase) -> String {
    purchase
        .lines
        .iter()
        .map(|line| format!("{}x {}", line.qty, line.item_name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn new_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new().delimiter(b';').from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, AppError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Falha ao finalizar o CSV: {}", e.error()))?;
    Ok(bytes)
}

#[derive(Clone)]
pub struct ExportService {
    report_repo: ReportRepository,
}

impl ExportService {
    pub fn new(report_repo: ReportRepository) -> Self {
        Self { report_repo }
    }

    /// `/export.csv`: uma linha por item vendido, lida da projeção `sales`.
    pub async fn legacy_csv(&self, query: &PurchaseQuery, today: NaiveDate) -> Result<Vec<u8>, AppError> {
        let filter = query.resolve(today)?;
        let rows = self.report_repo.legacy_rows(&filter).await?;

        let mut writer = new_writer();
        writer.write_record(LEGACY_HEADERS)?;
        for row in &rows {
            writer.write_record([
                display_timestamp(&row.created_at),
                row.item_name.clone(),
                row.qty.to_string(),
                money(row.price),
                money(row.total),
            ])?;
        }

        tracing::info!("📤 export.csv: {} linha(s)", rows.len());
        finish(writer)
    }

    /// `/export_purchases.csv`: por linha, ou uma linha por venda com `group=1`.
    pub async fn purchases_csv(&self, query: &PurchaseQuery, today: NaiveDate) -> Result<Vec<u8>, AppError> {
        let filter = query.resolve(today)?;
        if query.grouped() {
            self.grouped_csv(&filter).await
        } else {
            self.lines_csv(&filter).await
        }
    }

    async fn lines_csv(&self, filter: &SaleFilter) -> Result<Vec<u8>, AppError> {
        let lines = self.report_repo.purchase_lines(filter).await?;

        let mut writer = new_writer();
        writer.write_record(LINE_HEADERS)?;
        for line in &lines {
            writer.write_record([
                line.sale_id.to_string(),
                display_timestamp(&line.created_at),
                line.item_name.clone(),
                line.qty.to_string(),
                money(line.unit_price),
                money(line.line_total),
                line.payment_name.clone().unwrap_or_default(),
                line.username.clone().unwrap_or_default(),
            ])?;
        }

        tracing::info!("📤 export_purchases.csv: {} linha(s)", lines.len());
        finish(writer)
    }

    async fn grouped_csv(&self, filter: &SaleFilter) -> Result<Vec<u8>, AppError> {
        let purchases = group_lines(self.report_repo.purchase_lines(filter).await?);

        let mut writer = new_writer();
        writer.write_record(GROUPED_HEADERS)?;
        for purchase in &purchases {
            writer.write_record([
                purchase.sale_id.to_string(),
                display_timestamp(&purchase.created_at),
                summarize_items(purchase),
                purchase.payment_name.clone().unwrap_or_default(),
                purchase.username.clone().unwrap_or_default(),
                money(purchase.total),
            ])?;
        }

        tracing::info!("📤 export_purchases.csv (agrupado): {} venda(s)", purchases.len());
        finish(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::clock::today_local,
        db::{test_pool, ItemRepository, PaymentMethodRepository, SaleRepository},
        models::sale::{CartLine, SalePayload},
        services::sale_service::SaleService,
    };

    async fn seeded() -> ExportService {
        let pool = test_pool().await;
        let sales = SaleService::new(
            pool.clone(),
            ItemRepository::new(pool.clone()),
            PaymentMethodRepository::new(pool.clone()),
            SaleRepository::new(),
        );
        let lines = vec![CartLine { item_id: 1, qty: 2 }, CartLine { item_id: 4, qty: 1 }];
        sales.record_sale(1, &SalePayload { payment_method_id: Some(1), lines }).await.unwrap();
        let lines = vec![CartLine { item_id: 2, qty: 1 }];
        sales.record_sale(1, &SalePayload { payment_method_id: Some(1), lines }).await.unwrap();
        ExportService::new(ReportRepository::new(pool))
    }

    fn rows(bytes: Vec<u8>) -> Vec<Vec<String>> {
        let text = String::from_utf8(bytes).unwrap();
        text.lines().map(|l| l.split(';').map(str::to_string).collect()).collect()
    }

    #[tokio::test]
    async fn legacy_export_has_one_row_per_line() {
        let export = seeded().await;
        let rows = rows(export.legacy_csv(&PurchaseQuery::default(), today_local()).await.unwrap());

        assert_eq!(rows[0], LEGACY_HEADERS);
        assert_eq!(rows.len(), 1 + 3);
        // Mais nova primeiro: a venda do Hot Dog Kids
        assert_eq!(&rows[1][1..], ["Hot Dog Kids", "1", "6.00", "6.00"]);
        assert!(!rows[1][0].contains('T'));
    }

    #[tokio::test]
    async fn purchase_exports_flat_and_grouped() {
        let export = seeded().await;

        let flat = rows(export.purchases_csv(&PurchaseQuery::default(), today_local()).await.unwrap());
        assert_eq!(flat[0], LINE_HEADERS);
        assert_eq!(flat.len(), 1 + 3);
        assert_eq!(&flat[2][4..], ["9.00", "18.00", "Bar", ""]);

        let query = PurchaseQuery { group: Some("1".into()), ..Default::default() };
        let grouped = rows(export.purchases_csv(&query, today_local()).await.unwrap());
        assert_eq!(grouped[0], GROUPED_HEADERS);
        assert_eq!(grouped.len(), 1 + 2);
        assert_eq!(grouped[2][2], "2x Hot Dog, 1x Getränk");
        assert_eq!(grouped[2][5], "26.00");
    }

    #[tokio::test]
    async fn empty_filter_window_yields_only_headers() {
        let export = seeded().await;
        let query = PurchaseQuery { end: Some("2000-01-01".into()), ..Default::default() };
        let rows = rows(export.purchases_csv(&query, today_local()).await.unwrap());
        assert_eq!(rows, vec![LINE_HEADERS.map(str::to_string).to_vec()]);
    }
}
