//! レート取得
//!
//! セッション起動 → 遷移 → 描画待機 → 要素走査 → セッション終了、の順で進む。
//! 一度起動したセッションはどの経路でも必ず閉じる。

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::locators::LocatorTable;
use crate::traits::{BrowserSession, ElementAttributes};

/// 取得した (通貨コード, レート)
#[derive(Debug, Clone, PartialEq)]
pub struct RatePair {
    pub currency: String,
    pub rate: f64,
}

impl RatePair {
    pub fn new(currency: impl Into<String>, rate: f64) -> Self {
        Self {
            currency: currency.into(),
            rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    NotStarted,
    SessionOpen,
    Navigated,
    /// 描画待機を抜けた（要素出現またはタイムアウト）
    Rendered,
    ElementsScanned,
    SessionClosed,
}

pub struct RateFetcher {
    url: String,
    locators: LocatorTable,
    render_timeout: Duration,
    state: FetchState,
}

impl RateFetcher {
    pub fn new(url: impl Into<String>, locators: LocatorTable, render_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            locators,
            render_timeout,
            state: FetchState::NotStarted,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.url.clone(),
            config.locators.clone(),
            config.render_timeout,
        )
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// レートを取得する。失敗はすべてここでログに落とし、取得済みの分だけ返す。
    pub async fn fetch<S>(&mut self, session: &mut S) -> Vec<RatePair>
    where
        S: BrowserSession + ?Sized,
    {
        self.state = FetchState::NotStarted;
        info!("Attempting to scrape webpage: {}", self.url);

        if let Err(e) = session.open().await {
            error!(
                "Browser session could not be started: {}. Is Chrome/Chromium installed?",
                e
            );
            // 起動途中で生成されたプロセスがあれば回収させる
            if let Err(e) = session.close().await {
                debug!("Cleanup after failed launch: {}", e);
            }
            return Vec::new();
        }
        self.state = FetchState::SessionOpen;

        let mut pairs = Vec::new();
        if let Err(e) = self.scan(session, &mut pairs).await {
            error!(
                "An unexpected error occurred: {} (state={:?}, {} rates collected)",
                e,
                self.state,
                pairs.len()
            );
        }

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        self.state = FetchState::SessionClosed;

        info!("Fetched {} rates from {}", pairs.len(), self.url);
        pairs
    }

    async fn scan<S>(
        &mut self,
        session: &mut S,
        pairs: &mut Vec<RatePair>,
    ) -> Result<(), ScraperError>
    where
        S: BrowserSession + ?Sized,
    {
        session.navigate(&self.url).await?;
        self.state = FetchState::Navigated;

        info!("Waiting for dynamic content to load...");
        let element_ids = self.locators.element_ids();
        if session.wait_for_any(&element_ids, self.render_timeout).await? {
            debug!("Rate elements rendered");
        } else {
            warn!(
                "No rate element appeared within {:?}, scanning anyway",
                self.render_timeout
            );
        }
        self.state = FetchState::Rendered;

        for locator in self.locators.iter() {
            let Some(attrs) = session.read_element(&locator.element_id).await? else {
                debug!(
                    "Element '{}' ({}) not on page, skipping",
                    locator.element_id, locator.currency
                );
                continue;
            };

            match parse_rate_pair(&locator.element_id, &attrs) {
                Ok(pair) => {
                    debug!("{} = {}", pair.currency, pair.rate);
                    pairs.push(pair);
                }
                Err(e) => warn!("{}", e),
            }
        }
        self.state = FetchState::ElementsScanned;

        Ok(())
    }
}

/// 属性値を検証して (通貨コード, レート) に変換する
pub fn parse_rate_pair(
    element_id: &str,
    attrs: &ElementAttributes,
) -> Result<RatePair, ScraperError> {
    let currency = attrs
        .value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScraperError::malformed(element_id, "missing currency code"))?;

    let raw_rate = attrs
        .rate
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScraperError::malformed(element_id, "missing rate"))?;

    let rate: f64 = raw_rate.parse().map_err(|_| {
        ScraperError::malformed(element_id, format!("rate '{}' is not a number", raw_rate))
    })?;

    if !rate.is_finite() {
        return Err(ScraperError::malformed(
            element_id,
            format!("rate '{}' is not finite", raw_rate),
        ));
    }

    Ok(RatePair::new(currency, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locators::CurrencyLocator;
    use crate::testing::FakeSession;

    fn table(ids: &[(&str, &str)]) -> LocatorTable {
        LocatorTable::new(
            ids.iter()
                .map(|(c, id)| CurrencyLocator::new(*c, *id))
                .collect(),
        )
        .unwrap()
    }

    fn fetcher(locators: LocatorTable) -> RateFetcher {
        RateFetcher::new("https://example.test/", locators, Duration::from_millis(10))
    }

    fn usd_session() -> FakeSession {
        FakeSession::with_elements(&[(
            "currency-usa-USD",
            ElementAttributes::new("USD", "1.25"),
        )])
    }

    #[test]
    fn test_parse_rate_pair() {
        let pair = parse_rate_pair("id", &ElementAttributes::new("USD", " 1.25 ")).unwrap();
        assert_eq!(pair, RatePair::new("USD", 1.25));
    }

    #[test]
    fn test_parse_rate_pair_rejects_bad_input() {
        let cases = [
            ElementAttributes {
                value: None,
                rate: Some("1.2".into()),
            },
            ElementAttributes {
                value: Some("".into()),
                rate: Some("1.2".into()),
            },
            ElementAttributes {
                value: Some("USD".into()),
                rate: None,
            },
            ElementAttributes::new("USD", "abc"),
            ElementAttributes::new("USD", "1,25"),
            ElementAttributes::new("USD", "NaN"),
            ElementAttributes::new("USD", "inf"),
        ];
        for attrs in cases {
            let err = parse_rate_pair("currency-usa-USD", &attrs).unwrap_err();
            assert!(err.is_element_level(), "{:?}", attrs);
        }
    }

    #[tokio::test]
    async fn test_fetch_single_currency() {
        let mut session = usd_session();
        let mut fetcher = fetcher(LocatorTable::default());

        let pairs = fetcher.fetch(&mut session).await;

        assert_eq!(pairs, vec![RatePair::new("USD", 1.25)]);
        assert_eq!(fetcher.state(), FetchState::SessionClosed);
        assert_eq!(session.close_calls, 1);
        assert_eq!(
            session.navigated_to.as_deref(),
            Some("https://example.test/")
        );
    }

    #[tokio::test]
    async fn test_fetch_keeps_locator_order_and_skips_missing() {
        let mut session = FakeSession::with_elements(&[
            ("currency-japan-JPY", ElementAttributes::new("JPY", "187.5")),
            (
                "currency-europeanunion-EUR",
                ElementAttributes::new("EUR", "1.16"),
            ),
        ]);
        let mut fetcher = fetcher(table(&[
            ("EUR", "currency-europeanunion-EUR"),
            ("USD", "currency-usa-USD"),
            ("JPY", "currency-japan-JPY"),
        ]));

        let pairs = fetcher.fetch(&mut session).await;

        assert_eq!(
            pairs,
            vec![RatePair::new("EUR", 1.16), RatePair::new("JPY", 187.5)]
        );
        assert_eq!(session.reads.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_skips_malformed_element() {
        let mut session = FakeSession::with_elements(&[
            ("currency-usa-USD", ElementAttributes::new("USD", "n/a")),
            ("currency-canada-CAD", ElementAttributes::new("CAD", "1.71")),
        ]);
        let mut fetcher = fetcher(table(&[
            ("USD", "currency-usa-USD"),
            ("CAD", "currency-canada-CAD"),
        ]));

        let pairs = fetcher.fetch(&mut session).await;

        assert_eq!(pairs, vec![RatePair::new("CAD", 1.71)]);
        assert_eq!(fetcher.state(), FetchState::SessionClosed);
    }

    #[tokio::test]
    async fn test_fetch_unexpected_error_returns_partial() {
        let mut session = FakeSession::with_elements(&[
            ("currency-usa-USD", ElementAttributes::new("USD", "1.25")),
            ("currency-canada-CAD", ElementAttributes::new("CAD", "1.71")),
        ]);
        session.fail_read_on = Some("currency-japan-JPY".into());
        let mut fetcher = fetcher(table(&[
            ("USD", "currency-usa-USD"),
            ("JPY", "currency-japan-JPY"),
            ("CAD", "currency-canada-CAD"),
        ]));

        let pairs = fetcher.fetch(&mut session).await;

        assert_eq!(pairs, vec![RatePair::new("USD", 1.25)]);
        assert!(!session.reads.contains(&"currency-canada-CAD".to_string()));
        assert!(session.closed);
        assert_eq!(session.close_calls, 1);
        assert_eq!(fetcher.state(), FetchState::SessionClosed);
    }

    #[tokio::test]
    async fn test_fetch_open_failure_returns_empty() {
        let mut session = FakeSession::default();
        session.fail_open = true;
        let mut fetcher = fetcher(LocatorTable::default());

        let pairs = fetcher.fetch(&mut session).await;

        assert!(pairs.is_empty());
        assert_eq!(fetcher.state(), FetchState::NotStarted);
        assert!(session.navigated_to.is_none());
        // 起動失敗時も途中まで起動したプロセスの回収のため1回だけ閉じる
        assert_eq!(session.close_calls, 1);
    }

    #[tokio::test]
    async fn test_fetch_navigation_failure_closes_session() {
        let mut session = usd_session();
        session.fail_navigate = true;
        let mut fetcher = fetcher(LocatorTable::default());

        let pairs = fetcher.fetch(&mut session).await;

        assert!(pairs.is_empty());
        assert!(session.reads.is_empty());
        assert!(session.closed);
        assert_eq!(session.close_calls, 1);
        assert_eq!(fetcher.state(), FetchState::SessionClosed);
    }

    #[tokio::test]
    async fn test_fetch_wait_failure_closes_session() {
        let mut session = usd_session();
        session.fail_wait = true;
        let mut fetcher = fetcher(LocatorTable::default());

        let pairs = fetcher.fetch(&mut session).await;

        assert!(pairs.is_empty());
        assert!(session.reads.is_empty());
        assert!(session.closed);
        assert_eq!(session.close_calls, 1);
        assert_eq!(fetcher.state(), FetchState::SessionClosed);
    }

    #[tokio::test]
    async fn test_fetch_scans_even_when_nothing_rendered() {
        let mut session = FakeSession::default();
        let mut fetcher = fetcher(LocatorTable::default());

        let pairs = fetcher.fetch(&mut session).await;

        assert!(pairs.is_empty());
        assert_eq!(session.reads.len(), 25);
        assert!(session.closed);
        assert_eq!(session.close_calls, 1);
    }
}
