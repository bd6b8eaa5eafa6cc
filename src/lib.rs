//! 為替レートスクレイパーライブラリ
//!
//! - 競合他社サイトをヘッドレスブラウザで描画し、通貨ごとのレート要素を読む
//! - 日付・競合名・金額ラベルを付与して累積CSVログに追記する
//!
//! # 使用例
//!
//! ```rust,ignore
//! use fx_rate_scraper::{ScrapeRequest, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = ScraperService::new();
//!
//!     let request = ScrapeRequest::new("https://www.travelex.co.uk/", "Travelex", "1000_GBP_Test")
//!         .with_output_path("travelex.csv");
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("rows written: {}", report.rows_written);
//! }
//! ```

pub mod browser;
pub mod config;
pub mod date;
pub mod error;
pub mod fetcher;
pub mod locators;
pub mod log_file;
pub mod pipeline;
pub mod record;
pub mod service;
pub mod traits;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use browser::ChromiumSession;
pub use config::ScraperConfig;
pub use date::DateContext;
pub use error::ScraperError;
pub use fetcher::{FetchState, RateFetcher, RatePair};
pub use locators::{CurrencyLocator, LocatorTable};
pub use log_file::{append_records, ensure_log_file, LogFileStatus};
pub use pipeline::{run_scraper, RunReport};
pub use record::{build_records, RateObservation, CSV_COLUMNS};
pub use service::{ScrapeRequest, ScraperService};
pub use traits::{BrowserSession, ElementAttributes};
