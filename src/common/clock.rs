// src/common/clock.rs
//
// Timestamps são gravados como texto em horário local do caixa
// (`YYYY-MM-DDTHH:MM:SS`), o que mantém a comparação lexicográfica correta.

use chrono::{Days, Local, NaiveDate, NaiveDateTime, Timelike};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn start_of_day(day: NaiveDate) -> String {
    format_timestamp(day.and_hms_opt(0, 0, 0).unwrap_or_default())
}

pub fn start_of_next_day(day: NaiveDate) -> String {
    start_of_day(day.checked_add_days(Days::new(1)).unwrap_or(day))
}

/// `2026-10-16T12:30:00` -> `2026-10-16 12:30:00`, para CSV e telas.
pub fn display_timestamp(raw: &str) -> String {
    raw.replacen('T', " ", 1)
}
