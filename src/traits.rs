use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ScraperError;

/// レート要素から読み取った生の属性値
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ElementAttributes {
    /// `value` 属性（通貨コード）
    pub value: Option<String>,
    /// `data-rate` 属性
    pub rate: Option<String>,
}

impl ElementAttributes {
    pub fn new(value: impl Into<String>, rate: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            rate: Some(rate.into()),
        }
    }
}

/// レートページを描画するブラウザセッション
#[async_trait]
pub trait BrowserSession: Send {
    /// ブラウザ起動
    async fn open(&mut self) -> Result<(), ScraperError>;

    /// URLへ遷移
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// いずれかの要素が現れるかタイムアウトまで待機。要素が見つかれば true
    async fn wait_for_any(
        &mut self,
        element_ids: &[String],
        timeout: Duration,
    ) -> Result<bool, ScraperError>;

    /// 要素の属性を読む。要素が無ければ `Ok(None)`
    async fn read_element(
        &mut self,
        element_id: &str,
    ) -> Result<Option<ElementAttributes>, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;
}
