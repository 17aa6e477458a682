//! Source adapter that downloads one sportsbook's NFL page and extracts its odds

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use odds_engine::config::ScraperSettings;
use odds_engine::{League, OddsError, OddsResult, RawPayload, SourceAdapter};

use crate::books::Sportsbook;
use crate::extract::extract_payload;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Scraping source adapter for one sportsbook
pub struct SportsbookScraper {
    book: Sportsbook,
    client: Client,
}

impl SportsbookScraper {
    /// Create a scraper. `timeout` bounds the page request.
    pub fn new(book: Sportsbook, settings: &ScraperSettings, timeout: Duration) -> OddsResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| OddsError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { book, client })
    }

    pub fn sportsbook(&self) -> Sportsbook {
        self.book
    }

    /// Fetch the NFL board page
    async fn fetch_page(&self, url: &str) -> OddsResult<String> {
        info!("Scraping {} odds from {}", self.book.title(), url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| OddsError::unavailable(self.book.key(), e))?;

        if !response.status().is_success() {
            return Err(OddsError::unavailable(
                self.book.key(),
                format!("page request failed with status {}", response.status()),
            ));
        }

        let html =
            response.text().await.map_err(|e| OddsError::unavailable(self.book.key(), e))?;
        info!("Fetched {} page ({} bytes)", self.book.title(), html.len());
        Ok(html)
    }
}

#[async_trait]
impl SourceAdapter for SportsbookScraper {
    fn name(&self) -> &str {
        self.book.key()
    }

    async fn fetch_raw(&self, league: League) -> OddsResult<RawPayload> {
        match league {
            League::Nfl => {
                let html = self.fetch_page(self.book.nfl_url()).await?;
                extract_payload(self.book, &html)
            }
        }
    }
}

/// One scraper per supported sportsbook, in fallback registration order
pub fn all_scrapers(
    settings: &ScraperSettings,
    timeout: Duration,
) -> OddsResult<Vec<SportsbookScraper>> {
    Sportsbook::ALL.into_iter().map(|book| SportsbookScraper::new(book, settings, timeout)).collect()
}
