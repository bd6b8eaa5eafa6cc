use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::browser::ChromiumSession;
use crate::config::{ScraperConfig, DEFAULT_OUTPUT_PATH};
use crate::error::ScraperError;
use crate::pipeline::{run_scraper, RunReport};

/// スクレイピングリクエスト（1回の実行パラメータ）
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub competitor: String,
    pub amount_label: String,
    pub output_path: PathBuf,
    pub headless: bool,
}

impl ScrapeRequest {
    pub fn new(
        url: impl Into<String>,
        competitor: impl Into<String>,
        amount_label: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            competitor: competitor.into(),
            amount_label: amount_label.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            headless: true,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

impl From<ScrapeRequest> for ScraperConfig {
    fn from(req: ScrapeRequest) -> Self {
        ScraperConfig {
            url: req.url,
            competitor: req.competitor,
            amount_label: req.amount_label,
            output_path: req.output_path,
            headless: req.headless,
            ..Default::default()
        }
    }
}

/// tower::Serviceを実装したスクレイパーサービス
///
/// リクエストに無いブラウザ設定（ロケーター表・タイムアウト等）は `base` から引き継ぐ。
#[derive(Debug, Clone, Default)]
pub struct ScraperService {
    base: ScraperConfig,
}

impl ScraperService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_config(base: ScraperConfig) -> Self {
        Self { base }
    }

    fn config_for(&self, req: ScrapeRequest) -> ScraperConfig {
        ScraperConfig {
            locators: self.base.locators.clone(),
            render_timeout: self.base.render_timeout,
            poll_interval: self.base.poll_interval,
            request_timeout: self.base.request_timeout,
            window_size: self.base.window_size,
            chrome_executable: self.base.chrome_executable.clone(),
            ..ScraperConfig::from(req)
        }
    }
}

impl Service<ScrapeRequest> for ScraperService {
    type Response = RunReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ScrapeRequest) -> Self::Future {
        info!(
            "スクレイピングリクエスト受信: competitor={}, amount_label={}",
            req.competitor, req.amount_label
        );
        let config = self.config_for(req);

        Box::pin(async move {
            let mut session = ChromiumSession::new(&config);
            let report = run_scraper(&mut session, &config).await?;

            info!(
                "スクレイピング完了: path={:?}, rows={}",
                report.output_path, report.rows_written
            );
            Ok(report)
        })
    }
}
