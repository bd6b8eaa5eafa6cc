//! chromiumoxide によるブラウザセッション

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::traits::{BrowserSession, ElementAttributes};

pub struct ChromiumSession {
    headless: bool,
    window_size: (u32, u32),
    request_timeout: Duration,
    poll_interval: Duration,
    chrome_executable: Option<PathBuf>,
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    user_data_dir: Option<PathBuf>,
}

impl ChromiumSession {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            headless: config.headless,
            window_size: config.window_size,
            request_timeout: config.request_timeout,
            poll_interval: config.poll_interval,
            chrome_executable: config.chrome_executable.clone(),
            browser: None,
            page: None,
            handler_task: None,
            user_data_dir: None,
        }
    }

    fn get_page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    /// 起動設定。ビューポートもウィンドウと同じ解像度に固定する
    fn browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig, ScraperError> {
        let (width, height) = self.window_size;
        let mut builder = BrowserConfig::builder()
            .user_data_dir(user_data_dir)
            .window_size(width, height)
            .viewport(Viewport {
                width,
                height,
                ..Default::default()
            })
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))
    }

    /// 要素の通貨コードとレートをJSON文字列で返すスクリプト
    fn read_element_script(element_id: &str) -> Result<String, ScraperError> {
        let id_json =
            serde_json::to_string(element_id).map_err(|e| ScraperError::Json(e.to_string()))?;
        Ok(format!(
            r#"
            (function() {{
                var el = document.getElementById({});
                if (!el) {{
                    return "null";
                }}
                var value = ('value' in el) ? el.value : el.getAttribute('value');
                if (value !== null && value !== undefined) {{
                    value = String(value);
                }}
                return JSON.stringify({{ value: value, rate: el.getAttribute('data-rate') }});
            }})()
            "#,
            id_json
        ))
    }

    async fn launch(&mut self) -> Result<(), ScraperError> {
        // 同時実行時にプロファイルのロックが衝突しないよう実行ごとに分ける
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir =
            std::env::temp_dir().join(format!("fx-rate-scraper-{}", unique_id));
        self.user_data_dir = Some(user_data_dir.clone());

        let config = self.browser_config(&user_data_dir)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;
        self.browser = Some(browser);

        // ブラウザイベントハンドラをバックグラウンドで実行
        self.handler_task = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        }));

        let page = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが起動していません".into()))?
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;
        self.page = Some(page);

        Ok(())
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn open(&mut self) -> Result<(), ScraperError> {
        info!("Launching browser (headless={})...", self.headless);
        self.launch().await?;
        info!("Browser launched");
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        let page = self.get_page()?;
        page.goto(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        debug!("Navigated to {}", url);
        Ok(())
    }

    async fn wait_for_any(
        &mut self,
        element_ids: &[String],
        timeout: Duration,
    ) -> Result<bool, ScraperError> {
        let page = self.get_page()?;
        let ids_json =
            serde_json::to_string(element_ids).map_err(|e| ScraperError::Json(e.to_string()))?;
        let script = format!(
            r#"
            (function(ids) {{
                return ids.some(function(id) {{
                    return document.getElementById(id) !== null;
                }});
            }})({})
            "#,
            ids_json
        );

        let start = Instant::now();
        loop {
            match page.evaluate(script.as_str()).await {
                Ok(result) => {
                    if result.into_value::<bool>().unwrap_or(false) {
                        info!("Rate elements present after {:?}", start.elapsed());
                        return Ok(true);
                    }
                }
                Err(e) => debug!("Readiness check error: {}", e),
            }

            if start.elapsed() >= timeout {
                return Ok(false);
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn read_element(
        &mut self,
        element_id: &str,
    ) -> Result<Option<ElementAttributes>, ScraperError> {
        let page = self.get_page()?;
        let script = Self::read_element_script(element_id)?;

        let result = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        let json_str = result
            .into_value::<String>()
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;

        serde_json::from_str(&json_str)
            .map_err(|e| ScraperError::malformed(element_id, format!("属性JSONが不正: {}", e)))
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("ブラウザを終了中...");

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close page: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                warn!("Failed to wait for browser exit: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        if let Some(dir) = self.user_data_dir.take() {
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                debug!("Failed to remove user data dir {:?}: {}", dir, e);
            }
        }

        info!("ブラウザ終了完了");
        Ok(())
    }
}
