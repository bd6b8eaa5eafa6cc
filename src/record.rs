//! レート観測レコード

use serde::{Deserialize, Serialize};

use crate::date::DateContext;
use crate::fetcher::RatePair;

/// 出力CSVのカラム（順序固定）
pub const CSV_COLUMNS: [&str; 8] = [
    "Date",
    "Day",
    "Month",
    "Year",
    "Currency",
    "Competitor",
    "Amount_Input",
    "Rate",
];

/// 出力CSVの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Competitor")]
    pub competitor: String,
    /// 問い合わせ条件のラベル（ページへの入力には使われない）
    #[serde(rename = "Amount_Input")]
    pub amount_input: String,
    #[serde(rename = "Rate")]
    pub rate: f64,
}

/// 取得したレートに日付・競合名・金額ラベルを付与する
pub fn build_records(
    pairs: &[RatePair],
    date: &DateContext,
    competitor: &str,
    amount_label: &str,
) -> Vec<RateObservation> {
    pairs
        .iter()
        .map(|pair| RateObservation {
            date: date.date.clone(),
            day: date.day,
            month: date.month,
            year: date.year,
            currency: pair.currency.clone(),
            competitor: competitor.to_string(),
            amount_input: amount_label.to_string(),
            rate: pair.rate,
        })
        .collect()
}
