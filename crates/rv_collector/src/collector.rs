use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rv_core::{Error, Result, ReviewRecord, ReviewTable};
use tokio::time::sleep;
use tracing::Level;
use url::Url;

use crate::config::CollectorConfig;
use crate::fetch::{PageFetcher, ReqwestFetcher};
use crate::logging::{LogSink, Logger};
use crate::parser::PageMarkers;

/// Progress of a single page through the retry loop.
#[derive(Debug)]
enum PageState {
    Pending { attempt: u32 },
    Succeeded(Vec<ReviewRecord>),
    Exhausted { attempts: u32, error: Option<Error> },
}

/// A page that exhausted its attempts.
#[derive(Debug)]
struct PageFailure {
    attempts: u32,
    error: Option<Error>,
}

/// Paginated, throttled, retrying review scraper.
///
/// Pages are fetched strictly one after another. A page that keeps failing
/// is logged and skipped; the collection itself never fails because of it.
pub struct ReviewCollector {
    config: CollectorConfig,
    markers: PageMarkers,
    fetcher: Arc<dyn PageFetcher>,
    log: Arc<dyn LogSink>,
}

impl ReviewCollector {
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: CollectorConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        config.validate()?;
        let markers = PageMarkers::new(&config.markers)?;
        Ok(Self {
            config,
            markers,
            fetcher,
            log: Arc::new(Logger::new()),
        })
    }

    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Collects pages `1..=max_pages` using the configured retry limit.
    pub async fn get_reviews(&self, product_id: &str, max_pages: u32) -> Result<ReviewTable> {
        self.collect(product_id, max_pages, self.config.max_retries).await
    }

    /// Collects pages `1..=max_pages`, attempting each page at most `max_retries` times.
    ///
    /// Only an unusable URL template makes this return `Err`; network and
    /// markup problems shrink the table instead.
    pub async fn collect(
        &self,
        product_id: &str,
        max_pages: u32,
        max_retries: u32,
    ) -> Result<ReviewTable> {
        self.log.log(
            Level::INFO,
            &format!(
                "Collecting reviews for {} ({} pages, {} attempts per page)",
                product_id, max_pages, max_retries
            ),
        );

        let mut rows = Vec::new();
        for page in 1..=max_pages {
            if page > 1 {
                sleep(self.page_delay()).await;
            }

            let url = self.config.page_url(product_id, page)?;
            match self.collect_page(&url, page, max_retries).await {
                Ok(records) => {
                    self.log.log(
                        Level::DEBUG,
                        &format!("Page {}: {} reviews", page, records.len()),
                    );
                    rows.extend(records);
                }
                Err(PageFailure { attempts, error }) => {
                    let detail = error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no attempts allowed".to_string());
                    self.log.log(
                        Level::ERROR,
                        &format!(
                            "Failed to fetch page {} after {} attempts: {}",
                            page, attempts, detail
                        ),
                    );
                }
            }
        }

        self.log.log(
            Level::INFO,
            &format!("Collected {} reviews for {}", rows.len(), product_id),
        );
        Ok(ReviewTable::from(rows))
    }

    async fn collect_page(
        &self,
        url: &Url,
        page: u32,
        max_retries: u32,
    ) -> std::result::Result<Vec<ReviewRecord>, PageFailure> {
        let mut state = PageState::Pending { attempt: 0 };
        loop {
            state = match state {
                PageState::Pending { attempt } if attempt >= max_retries => PageState::Exhausted {
                    attempts: attempt,
                    error: None,
                },
                PageState::Pending { attempt } => {
                    sleep(self.config.request_delay()).await;
                    self.log.log(
                        Level::DEBUG,
                        &format!("Fetching page {} (attempt {}): {}", page, attempt + 1, url),
                    );

                    match self.fetch_body(url).await {
                        Ok(body) => PageState::Succeeded(self.markers.parse_reviews(&body)),
                        Err(e) => {
                            let failed = attempt + 1;
                            if failed >= max_retries {
                                PageState::Exhausted {
                                    attempts: failed,
                                    error: Some(e),
                                }
                            } else {
                                let backoff = self.config.backoff(failed);
                                self.log.log(
                                    Level::WARN,
                                    &format!(
                                        "Page {} attempt {} failed: {}; retrying in {:?}",
                                        page, failed, e, backoff
                                    ),
                                );
                                sleep(backoff).await;
                                PageState::Pending { attempt: failed }
                            }
                        }
                    }
                }
                PageState::Succeeded(records) => return Ok(records),
                PageState::Exhausted { attempts, error } => {
                    return Err(PageFailure { attempts, error })
                }
            };
        }
    }

    async fn fetch_body(&self, url: &Url) -> Result<String> {
        let response = self.fetcher.get(url).await?;
        if !response.is_success() {
            return Err(Error::HttpStatus {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.body)
    }

    fn page_delay(&self) -> Duration {
        let (min, max) = (self.config.page_delay_min_ms, self.config.page_delay_max_ms);
        if min >= max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
