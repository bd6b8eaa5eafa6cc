//! ログ初期化 → 日付取得 → レート取得 → 追記 の一連の処理

use std::path::PathBuf;

use tracing::{error, info};

use crate::config::ScraperConfig;
use crate::date::DateContext;
use crate::error::ScraperError;
use crate::fetcher::{RateFetcher, RatePair};
use crate::log_file::{append_records, ensure_log_file, LogFileStatus};
use crate::record::build_records;
use crate::traits::BrowserSession;

/// 1回の実行結果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub log_status: LogFileStatus,
    pub date: DateContext,
    pub pairs: Vec<RatePair>,
    pub rows_written: usize,
}

impl RunReport {
    /// 1件も取得できなかった実行か
    pub fn is_empty(&self) -> bool {
        self.rows_written == 0
    }
}

/// パイプラインを1回実行する。返すエラーはログファイル操作の失敗のみ。
pub async fn run_scraper<S>(
    session: &mut S,
    config: &ScraperConfig,
) -> Result<RunReport, ScraperError>
where
    S: BrowserSession + ?Sized,
{
    let log_status = ensure_log_file(&config.output_path)?;
    let date = DateContext::now();
    run_scraper_on(session, config, log_status, date).await
}

async fn run_scraper_on<S>(
    session: &mut S,
    config: &ScraperConfig,
    log_status: LogFileStatus,
    date: DateContext,
) -> Result<RunReport, ScraperError>
where
    S: BrowserSession + ?Sized,
{
    let mut fetcher = RateFetcher::from_config(config);
    let pairs = fetcher.fetch(session).await;

    let mut report = RunReport {
        output_path: config.output_path.clone(),
        log_status,
        date,
        pairs,
        rows_written: 0,
    };

    if report.pairs.is_empty() {
        error!("No data was scraped from {}", config.url);
        return Ok(report);
    }

    let records = build_records(
        &report.pairs,
        &report.date,
        &config.competitor,
        &config.amount_label,
    );
    report.rows_written = append_records(&config.output_path, &records)?;

    info!(
        "Successfully wrote {} records for amount input '{}' to {:?}",
        report.rows_written, config.amount_label, config.output_path
    );
    Ok(report)
}
