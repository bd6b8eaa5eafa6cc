use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("属性データ不正 ({element_id}): {reason}")]
    MalformedAttribute { element_id: String, reason: String },

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("JSONパースエラー: {0}")]
    Json(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    #[error("CSV書き込みエラー: {0}")]
    Csv(#[from] csv::Error),
}

impl ScraperError {
    /// 要素単位でスキップしてよいエラーか
    pub fn is_element_level(&self) -> bool {
        matches!(self, ScraperError::MalformedAttribute { .. })
    }

    pub fn malformed(element_id: impl Into<String>, reason: impl Into<String>) -> Self {
        ScraperError::MalformedAttribute {
            element_id: element_id.into(),
            reason: reason.into(),
        }
    }
}
