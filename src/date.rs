//! 実行日の日付コンテキスト

use chrono::{Datelike, Local, NaiveDate};

/// 1回の時刻読み取りから導出した日付情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateContext {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateContext {
    /// ローカル時刻を1回だけ読んで各フィールドを導出する
    pub fn now() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            day: date.day(),
            month: date.month(),
            year: date.year(),
        }
    }
}
