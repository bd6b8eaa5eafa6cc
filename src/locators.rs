//! 通貨コード → 要素IDのロケーター表
//!
//! ページのマークアップ変更時にリビルド不要となるよう、JSONファイルから差し替え可能。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ScraperError;

/// 1通貨分のロケーター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyLocator {
    /// 想定する通貨コード（ログ用。実際のコードはページの属性から読む）
    pub currency: String,
    /// レート表示要素のID
    pub element_id: String,
}

impl CurrencyLocator {
    pub fn new(currency: impl Into<String>, element_id: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            element_id: element_id.into(),
        }
    }
}

/// 組み込みのロケーター（Travelex UK トップページ）
const DEFAULT_LOCATORS: &[(&str, &str)] = &[
    ("EUR", "currency-europeanunion-EUR"),
    ("USD", "currency-usa-USD"),
    ("CAD", "currency-canada-CAD"),
    ("JPY", "currency-japan-JPY"),
    ("AED", "currency-unitedarabemirates-AED"),
    ("THB", "currency-thailand-THB"),
    ("AUD", "currency-australia-AUD"),
    ("BGN", "currency-bulgaria-BGN"),
    ("CHF", "currency-switzerland-CHF"),
    ("CNY", "currency-china-CNY"),
    ("CZK", "currency-czechrepublic-CZK"),
    ("DKK", "currency-denmark-DKK"),
    ("HKD", "currency-hongkong-HKD"),
    ("HUF", "currency-hungary-HUF"),
    ("ILS", "currency-israel-ILS"),
    ("MXN", "currency-mexico-MXN"),
    ("NZD", "currency-newzealand-NZD"),
    ("PLN", "currency-poland-PLN"),
    ("QAR", "currency-qatar-QAR"),
    ("RON", "currency-romania-RON"),
    ("SAR", "currency-saudiarabia-SAR"),
    ("SEK", "currency-sweden-SEK"),
    ("SGD", "currency-singapore-SGD"),
    ("TRY", "currency-türkiye-TRY"),
    ("ZAR", "currency-southafrica-ZAR"),
];

/// 順序付きロケーター表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorTable {
    locators: Vec<CurrencyLocator>,
}

impl Default for LocatorTable {
    fn default() -> Self {
        Self {
            locators: DEFAULT_LOCATORS
                .iter()
                .map(|(currency, id)| CurrencyLocator::new(*currency, *id))
                .collect(),
        }
    }
}

impl LocatorTable {
    pub fn new(locators: Vec<CurrencyLocator>) -> Result<Self, ScraperError> {
        if locators.is_empty() {
            return Err(ScraperError::Config("ロケーター表が空です".into()));
        }
        if let Some(bad) = locators.iter().find(|l| l.element_id.trim().is_empty()) {
            return Err(ScraperError::Config(format!(
                "要素IDが空のロケーターがあります: currency={}",
                bad.currency
            )));
        }
        Ok(Self { locators })
    }

    /// JSON文字列から読み込み
    ///
    /// 形式: `[{"currency": "USD", "element_id": "currency-usa-USD"}, ...]`
    pub fn from_json_str(json: &str) -> Result<Self, ScraperError> {
        let locators: Vec<CurrencyLocator> =
            serde_json::from_str(json).map_err(|e| ScraperError::Json(e.to_string()))?;
        Self::new(locators)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyLocator> {
        self.locators.iter()
    }

    pub fn element_ids(&self) -> Vec<String> {
        self.locators.iter().map(|l| l.element_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = LocatorTable::default();
        assert_eq!(table.len(), 25);

        let first = table.iter().next().unwrap();
        assert_eq!(first.currency, "EUR");
        assert_eq!(first.element_id, "currency-europeanunion-EUR");

        let last = table.iter().last().unwrap();
        assert_eq!(last.element_id, "currency-southafrica-ZAR");
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"[
            {"currency": "USD", "element_id": "currency-usa-USD"},
            {"currency": "JPY", "element_id": "currency-japan-JPY"}
        ]"#;
        let table = LocatorTable::from_json_str(json).unwrap();
        assert_eq!(
            table.element_ids(),
            vec!["currency-usa-USD".to_string(), "currency-japan-JPY".to_string()]
        );
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            LocatorTable::from_json_str("[]"),
            Err(ScraperError::Config(_))
        ));
    }

    #[test]
    fn test_blank_element_id_rejected() {
        let json = r#"[{"currency": "USD", "element_id": "  "}]"#;
        assert!(matches!(
            LocatorTable::from_json_str(json),
            Err(ScraperError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LocatorTable::from_json_str("{not json"),
            Err(ScraperError::Json(_))
        ));
    }
}
