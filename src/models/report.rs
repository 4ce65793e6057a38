// src/models/report.rs

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::common::{clock, error::AppError};

// --- Filtros ---

/// Query string de `/api/admin/purchases` e dos exports CSV.
/// Tudo chega como texto: formulários mandam `start=` vazio para "sem filtro".
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PurchaseQuery {
    /// Primeiro dia (YYYY-MM-DD), inclusivo.
    pub start: Option<String>,
    /// Último dia (YYYY-MM-DD), inclusivo.
    pub end: Option<String>,
    /// Últimos N dias, contando hoje. Tem precedência sobre start/end.
    pub last: Option<String>,
    pub payment_method_id: Option<String>,
    pub user_id: Option<String>,
    /// `1`/`true` agrupa por venda.
    pub group: Option<String>,
}

fn blank_to_none(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt<T: FromStr>(raw: &Option<String>) -> Result<Option<T>, AppError> {
    blank_to_none(raw)
        .map(|s| s.parse::<T>().map_err(|_| AppError::InvalidFilter))
        .transpose()
}

fn parse_date(raw: &Option<String>) -> Result<Option<NaiveDate>, AppError> {
    blank_to_none(raw)
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| AppError::InvalidFilter))
        .transpose()
}

impl PurchaseQuery {
    pub fn grouped(&self) -> bool {
        matches!(blank_to_none(&self.group), Some("1" | "true" | "yes" | "on"))
    }

    /// Converte a query em limites de timestamp `[from, until)` sobre `created_at`.
    pub fn resolve(&self, today: NaiveDate) -> Result<SaleFilter, AppError> {
        let (start, end) = match parse_opt::<u32>(&self.last)? {
            Some(0) => return Err(AppError::InvalidFilter),
            Some(days) => {
                let from = today
                    .checked_sub_days(Days::new(u64::from(days - 1)))
                    .ok_or(AppError::InvalidFilter)?;
                (Some(from), Some(today))
            }
            None => (parse_date(&self.start)?, parse_date(&self.end)?),
        };

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::InvalidFilter);
            }
        }

        Ok(SaleFilter {
            from: start.map(clock::start_of_day),
            until: end.map(clock::start_of_next_day),
            payment_method_id: parse_opt(&self.payment_method_id)?,
            user_id: parse_opt(&self.user_id)?,
        })
    }
}

/// Filtro já resolvido, pronto para o SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFilter {
    pub from: Option<String>,
    pub until: Option<String>,
    pub payment_method_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl SaleFilter {
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            from: Some(clock::start_of_day(day)),
            until: Some(clock::start_of_next_day(day)),
            ..Self::default()
        }
    }
}

/// Query de `/api/admin/summary`. Sem `date`, vale o dia de hoje.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// Dia local (YYYY-MM-DD).
    pub date: Option<String>,
}

impl SummaryQuery {
    pub fn day(&self, today: NaiveDate) -> Result<NaiveDate, AppError> {
        Ok(parse_date(&self.date)?.unwrap_or(today))
    }
}

// --- Linhas e vendas ---

/// Uma linha de venda com os dados do cabeçalho (modo "flat").
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PurchaseLine {
    pub sale_id: i64,
    pub created_at: String,
    pub line_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub qty: i64,
    pub unit_price: f64,
    pub line_total: f64,
    pub payment_method_id: i64,
    pub payment_name: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub sale_total: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseItem {
    pub item_id: i64,
    pub item_name: String,
    pub qty: i64,
    pub unit_price: f64,
    pub line_total: f64,
}

/// Uma venda com as linhas aninhadas (modo agrupado).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Purchase {
    pub sale_id: i64,
    pub created_at: String,
    pub payment_method_id: i64,
    pub payment_name: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub total: f64,
    pub lines: Vec<PurchaseItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PurchaseReport {
    Grouped { purchases: Vec<Purchase> },
    Flat { lines: Vec<PurchaseLine> },
}

/// Linha da projeção legada `sales`.
#[derive(Debug, Clone, FromRow)]
pub struct LegacySaleRow {
    pub created_at: String,
    pub item_name: String,
    pub qty: i64,
    pub price: f64,
    pub total: f64,
}

// --- KPIs do dia ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ItemTotal {
    pub item_id: i64,
    pub name: String,
    pub qty: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, FromRow)]
pub struct DayTotals {
    pub orders: i64,
    pub amount: f64,
    pub lines: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DaySummary {
    #[schema(example = "2026-10-16")]
    pub date: String,
    pub orders: i64,
    pub amount: f64,
    /// Unidades vendidas (soma das quantidades).
    pub lines: i64,
    pub items: Vec<ItemTotal>,
    /// As 20 vendas mais recentes do dia.
    pub recent: Vec<Purchase>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableDays {
    pub days: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn empty_query_has_no_bounds() {
        let filter = PurchaseQuery::default().resolve(today()).unwrap();
        assert_eq!(filter, SaleFilter::default());
    }

    #[test]
    fn last_days_counts_today() {
        let query = PurchaseQuery {
            last: Some("7".into()),
            start: Some("2020-01-01".into()),
            ..Default::default()
        };
        let filter = query.resolve(today()).unwrap();
        assert_eq!(filter.from.as_deref(), Some("2026-10-10T00:00:00"));
        assert_eq!(filter.until.as_deref(), Some("2026-10-17T00:00:00"));
    }

    #[test]
    fn blank_fields_are_ignored() {
        let query = PurchaseQuery {
            start: Some("".into()),
            end: Some("2026-10-01".into()),
            payment_method_id: Some(" ".into()),
            user_id: Some("3".into()),
            ..Default::default()
        };
        let filter = query.resolve(today()).unwrap();
        assert_eq!(filter.from, None);
        assert_eq!(filter.until.as_deref(), Some("2026-10-02T00:00:00"));
        assert_eq!(filter.payment_method_id, None);
        assert_eq!(filter.user_id, Some(3));
    }

    #[test]
    fn inverted_range_and_garbage_are_rejected() {
        let inverted = PurchaseQuery {
            start: Some("2026-10-10".into()),
            end: Some("2026-10-01".into()),
            ..Default::default()
        };
        assert!(matches!(inverted.resolve(today()), Err(AppError::InvalidFilter)));

        let garbage = PurchaseQuery { last: Some("abc".into()), ..Default::default() };
        assert!(matches!(garbage.resolve(today()), Err(AppError::InvalidFilter)));

        let zero = PurchaseQuery { last: Some("0".into()), ..Default::default() };
        assert!(matches!(zero.resolve(today()), Err(AppError::InvalidFilter)));
    }

    #[test]
    fn last_beyond_calendar_is_rejected() {
        let huge = PurchaseQuery { last: Some(u32::MAX.to_string()), ..Default::default() };
        assert!(matches!(huge.resolve(today()), Err(AppError::InvalidFilter)));

        // Cem anos ainda cabem no calendário.
        let century = PurchaseQuery { last: Some("36500".into()), ..Default::default() };
        assert!(century.resolve(today()).unwrap().from.is_some());
    }

    #[test]
    fn summary_defaults_to_today() {
        assert_eq!(SummaryQuery::default().day(today()).unwrap(), today());
        let q = SummaryQuery { date: Some("2026-01-31".into()) };
        assert_eq!(q.day(today()).unwrap(), NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        let bad = SummaryQuery { date: Some("31.01.2026".into()) };
        assert!(matches!(bad.day(today()), Err(AppError::InvalidFilter)));
    }

    #[test]
    fn group_flag_accepts_common_spellings() {
        for raw in ["1", "true", "on"] {
            let q = PurchaseQuery { group: Some(raw.into()), ..Default::default() };
            assert!(q.grouped(), "{raw}");
        }
        let q = PurchaseQuery { group: Some("0".into()), ..Default::default() };
        assert!(!q.grouped());
    }
}
