use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ScraperError;
use crate::locators::LocatorTable;

pub const DEFAULT_TARGET_URL: &str = "https://www.travelex.co.uk/";
pub const DEFAULT_COMPETITOR: &str = "Travelex";
pub const DEFAULT_AMOUNT_LABEL: &str = "1000_GBP_Test";
pub const DEFAULT_OUTPUT_PATH: &str = "travelex.csv";

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub url: String,
    pub competitor: String,
    pub amount_label: String,
    pub output_path: PathBuf,
    pub locators: LocatorTable,
    pub headless: bool,
    /// 描画完了を待つ上限
    pub render_timeout: Duration,
    pub poll_interval: Duration,
    /// CDPリクエストタイムアウト
    pub request_timeout: Duration,
    pub window_size: (u32, u32),
    pub chrome_executable: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TARGET_URL.to_string(),
            competitor: DEFAULT_COMPETITOR.to_string(),
            amount_label: DEFAULT_AMOUNT_LABEL.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            locators: LocatorTable::default(),
            headless: true,
            render_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(60),
            window_size: (1920, 1080),
            chrome_executable: None,
        }
    }
}

impl ScraperConfig {
    pub fn new(
        url: impl Into<String>,
        competitor: impl Into<String>,
        amount_label: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            competitor: competitor.into(),
            amount_label: amount_label.into(),
            ..Default::default()
        }
    }

    /// 環境変数から設定を構築（未設定の項目はデフォルト値）
    pub fn from_env() -> Result<Self, ScraperError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FX_TARGET_URL") {
            config.url = url;
        }
        if let Ok(competitor) = std::env::var("FX_COMPETITOR") {
            config.competitor = competitor;
        }
        if let Ok(label) = std::env::var("FX_AMOUNT_LABEL") {
            config.amount_label = label;
        }
        if let Ok(path) = std::env::var("FX_OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("FX_LOCATORS_FILE") {
            config.locators = LocatorTable::from_json_file(&path)?;
        }
        if let Ok(headless) = std::env::var("FX_HEADLESS") {
            config.headless = parse_bool(&headless).ok_or_else(|| {
                ScraperError::Config(format!("FX_HEADLESS が不正です: {}", headless))
            })?;
        }
        if let Ok(secs) = std::env::var("FX_RENDER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ScraperError::Config(format!("FX_RENDER_TIMEOUT_SECS が不正です: {}", secs))
            })?;
            config.render_timeout = Duration::from_secs(secs);
        }
        if let Ok(path) = std::env::var("CHROME_PATH").or_else(|_| std::env::var("CHROMIUM_PATH")) {
            config.chrome_executable = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// .env ファイルを環境変数に読み込む。既に設定済みの変数は上書きしない。
    /// ファイルが無ければ何もせず `Ok(false)`
    pub fn load_env_file(path: impl AsRef<Path>) -> Result<bool, ScraperError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(false);
        }
        dotenvy::from_path(path)
            .map_err(|e| ScraperError::Config(format!("{:?} の読み込みに失敗: {}", path, e)))?;
        Ok(true)
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_locators(mut self, locators: LocatorTable) -> Self {
        self.locators = locators;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
