use fx_rate_scraper::{ScrapeRequest, ScraperConfig, ScraperService};
use tower::Service;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ランタイムのワーカースレッド起動前に環境変数を確定させるため、main は同期関数にする
fn main() {
    let env_loaded = ScraperConfig::load_env_file(".env");

    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match env_loaded {
        Ok(true) => info!("Loaded .env"),
        Ok(false) => {}
        Err(e) => error!("{}", e),
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("tokioランタイムの起動に失敗しました: {}", e);
            return;
        }
    };

    runtime.block_on(run());
}

async fn run() {
    let config = match ScraperConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("設定の読み込みに失敗しました: {}", e);
            return;
        }
    };

    let request = ScrapeRequest::new(&config.url, &config.competitor, &config.amount_label)
        .with_output_path(&config.output_path)
        .with_headless(config.headless);
    let mut service = ScraperService::with_base_config(config);

    match service.call(request).await {
        Ok(report) if report.is_empty() => {
            info!("No rows appended to {:?}", report.output_path);
        }
        Ok(report) => {
            info!(
                "{} rows appended to {:?} ({})",
                report.rows_written, report.output_path, report.date.date
            );
        }
        Err(e) => error!("ログファイルへの書き込みに失敗しました: {}", e),
    }
}
