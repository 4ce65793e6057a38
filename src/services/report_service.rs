// src/services/report_service.rs

use chrono::NaiveDate;

use crate::{
    common::{db_utils::round_money, error::AppError},
    db::ReportRepository,
    models::report::{
        AvailableDays, DaySummary, Purchase, PurchaseItem, PurchaseLine, PurchaseQuery, PurchaseReport,
        SaleFilter,
    },
};

/// Quantas vendas recentes aparecem no resumo do dia.
pub const RECENT_LIMIT: usize = 20;

/// Junta linhas consecutivas da mesma venda. A entrada já vem ordenada
/// por venda (mais nova primeiro) e depois por linha.
pub fn group_lines(lines: Vec<PurchaseLine>) -> Vec<Purchase> {
    let mut purchases: Vec<Purchase> = Vec::new();
    for line in lines {
        let item = PurchaseItem {
            item_id: line.item_id,
            item_name: line.item_name,
            qty: line.qty,
            unit_price: line.unit_price,
            line_total: line.line_total,
        };
        match purchases.last_mut() {
            Some(current) if current.sale_id == line.sale_id => current.lines.push(item),
            _ => purchases.push(Purchase {
                sale_id: line.sale_id,
                created_at: line.created_at,
                payment_method_id: line.payment_method_id,
                payment_name: line.payment_name,
                user_id: line.user_id,
                username: line.username,
                total: round_money(line.sale_total),
                lines: vec![item],
            }),
        }
    }
    purchases
}

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
}

impl ReportService {
    pub fn new(report_repo: ReportRepository) -> Self {
        Self { report_repo }
    }

    pub async fn purchases(&self, query: &PurchaseQuery, today: NaiveDate) -> Result<PurchaseReport, AppError> {
        let filter = query.resolve(today)?;
        let lines = self.report_repo.purchase_lines(&filter).await?;

        Ok(if query.grouped() {
            PurchaseReport::Grouped { purchases: group_lines(lines) }
        } else {
            PurchaseReport::Flat { lines }
        })
    }

    /// KPIs de um dia local do caixa.
    pub async fn day_summary(&self, day: NaiveDate) -> Result<DaySummary, AppError> {
        let filter = SaleFilter::for_day(day);

        let totals = self.report_repo.totals(&filter).await?;
        let items = self.report_repo.item_totals(&filter).await?;
        let mut recent = group_lines(self.report_repo.purchase_lines(&filter).await?);
        recent.truncate(RECENT_LIMIT);

        Ok(DaySummary {
            date: day.format("%Y-%m-%d").to_string(),
            orders: totals.orders,
            amount: round_money(totals.amount),
            lines: totals.lines,
            items,
            recent,
        })
    }

    pub async fn available_days(&self) -> Result<AvailableDays, AppError> {
        Ok(AvailableDays { days: self.report_repo.available_days().await? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{test_pool, ItemRepository, PaymentMethodRepository, SaleRepository},
        models::sale::{CartLine, SalePayload},
        services::sale_service::SaleService,
    };

    fn line(sale_id: i64, line_id: i64, item_id: i64, qty: i64) -> PurchaseLine {
        PurchaseLine {
            sale_id,
            created_at: "2026-10-16T12:00:00".into(),
            line_id,
            item_id,
            item_name: format!("Item {item_id}"),
            qty,
            unit_price: 2.0,
            line_total: 2.0 * qty as f64,
            payment_method_id: 1,
            payment_name: Some("Bar".into()),
            user_id: Some(1),
            username: Some("Admin".into()),
            sale_total: 10.0,
        }
    }

    #[test]
    fn groups_consecutive_lines_by_sale() {
        let purchases = group_lines(vec![line(5, 9, 1, 2), line(5, 10, 4, 3), line(3, 4, 2, 5)]);

        assert_eq!(purchases.len(), 2);
        assert_eq!(purchases[0].sale_id, 5);
        assert_eq!(purchases[0].lines.len(), 2);
        assert_eq!(purchases[1].lines[0].qty, 5);
        assert!(group_lines(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn summary_of_today_and_empty_day() {
        let pool = test_pool().await;
        let sales = SaleService::new(
            pool.clone(),
            ItemRepository::new(pool.clone()),
            PaymentMethodRepository::new(pool.clone()),
            SaleRepository::new(),
        );
        let reports = ReportService::new(ReportRepository::new(pool));

        let lines = vec![CartLine { item_id: 1, qty: 2 }, CartLine { item_id: 4, qty: 1 }];
        sales.record_sale(1, &SalePayload { payment_method_id: Some(1), lines }).await.unwrap();
        let lines = vec![CartLine { item_id: 1, qty: 1 }];
        sales.record_sale(1, &SalePayload { payment_method_id: Some(1), lines }).await.unwrap();

        let today = crate::common::clock::today_local();
        let summary = reports.day_summary(today).await.unwrap();
        assert_eq!((summary.orders, summary.amount, summary.lines), (2, 35.0, 4));
        assert_eq!(summary.recent.len(), 2);
        let hot_dog = summary.items.iter().find(|i| i.item_id == 1).unwrap();
        assert_eq!((hot_dog.qty, hot_dog.amount), (3, 27.0));

        let yesterday = today.pred_opt().unwrap();
        let empty = reports.day_summary(yesterday).await.unwrap();
        assert_eq!((empty.orders, empty.amount, empty.lines), (0, 0.0, 0));
        assert!(empty.items.is_empty() && empty.recent.is_empty());

        let days = reports.available_days().await.unwrap().days;
        assert_eq!(days, vec![today.format("%Y-%m-%d").to_string()]);

        let grouped = PurchaseQuery { group: Some("1".into()), last: Some("1".into()), ..Default::default() };
        match reports.purchases(&grouped, today).await.unwrap() {
            PurchaseReport::Grouped { purchases } => assert_eq!(purchases.len(), 2),
            other => panic!("esperado agrupado, veio {other:?}"),
        }
        match reports.purchases(&PurchaseQuery::default(), today).await.unwrap() {
            PurchaseReport::Flat { lines } => assert_eq!(lines.len(), 3),
            other => panic!("esperado flat, veio {other:?}"),
        }
    }
}
