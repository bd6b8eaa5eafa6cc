//! テスト用ヘルパー

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;
use crate::traits::{BrowserSession, ElementAttributes};

/// 衝突しない一時ファイルパス
pub(crate) fn temp_path(name: &str) -> PathBuf {
    let unique_id = format!(
        "{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    std::env::temp_dir().join(format!("fx-rate-scraper-{}-{}.csv", name, unique_id))
}

/// メモリ上のページを返すセッション
#[derive(Debug, Default)]
pub(crate) struct FakeSession {
    pub elements: HashMap<String, ElementAttributes>,
    pub fail_open: bool,
    pub fail_navigate: bool,
    pub fail_wait: bool,
    /// この要素の読み取りでJavaScriptエラーを返す
    pub fail_read_on: Option<String>,
    pub opened: bool,
    pub closed: bool,
    /// 呼び出し回数（未起動時の呼び出しも数える）
    pub close_calls: usize,
    pub navigated_to: Option<String>,
    pub reads: Vec<String>,
}

impl FakeSession {
    pub fn with_elements(elements: &[(&str, ElementAttributes)]) -> Self {
        Self {
            elements: elements
                .iter()
                .map(|(id, attrs)| (id.to_string(), attrs.clone()))
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn open(&mut self) -> Result<(), ScraperError> {
        if self.fail_open {
            return Err(ScraperError::BrowserInit("chrome not found".into()));
        }
        self.opened = true;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        if self.fail_navigate {
            return Err(ScraperError::Navigation("net::ERR_NAME_NOT_RESOLVED".into()));
        }
        self.navigated_to = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_any(
        &mut self,
        element_ids: &[String],
        _timeout: Duration,
    ) -> Result<bool, ScraperError> {
        if self.fail_wait {
            return Err(ScraperError::JavaScript("execution context destroyed".into()));
        }
        Ok(element_ids.iter().any(|id| self.elements.contains_key(id)))
    }

    async fn read_element(
        &mut self,
        element_id: &str,
    ) -> Result<Option<ElementAttributes>, ScraperError> {
        self.reads.push(element_id.to_string());
        if self.fail_read_on.as_deref() == Some(element_id) {
            return Err(ScraperError::JavaScript("target closed".into()));
        }
        Ok(self.elements.get(element_id).cloned())
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        self.close_calls += 1;
        if self.opened {
            self.closed = true;
        }
        self.opened = false;
        Ok(())
    }
}
