//! 累積CSVログの初期化と追記

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::ScraperError;
use crate::record::{RateObservation, CSV_COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFileStatus {
    /// ヘッダーのみの新規ファイルを作成した
    Created,
    /// 既存ファイルあり（内容は検証しない）
    Existing,
}

/// ログファイルが無ければヘッダー行だけのファイルを作成する
pub fn ensure_log_file(path: impl AsRef<Path>) -> Result<LogFileStatus, ScraperError> {
    let path = path.as_ref();

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Found existing log file {:?}", path);
            return Ok(LogFileStatus::Existing);
        }
        Err(e) => return Err(e.into()),
    };

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    wtr.write_record(CSV_COLUMNS)?;
    wtr.flush()?;

    info!("Created new log file {:?}", path);
    Ok(LogFileStatus::Created)
}

/// レコードをヘッダー無しで末尾に追記する。既存の内容は読まない。
pub fn append_records(
    path: impl AsRef<Path>,
    records: &[RateObservation],
) -> Result<usize, ScraperError> {
    let path = path.as_ref();
    let file = OpenOptions::new().append(true).open(path)?;

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;

    Ok(records.len())
}
