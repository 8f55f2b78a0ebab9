use std::path::Path;
use std::time::Duration;

use rv_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const PRODUCT_PLACEHOLDER: &str = "{product_id}";
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Structural markers used to locate review data on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub review: String,
    pub body: String,
    pub date: String,
    pub category: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            review: "div[data-hook='review']".to_string(),
            body: "span[data-hook='review-body']".to_string(),
            date: "span[data-hook='review-date']".to_string(),
            category: "a.a-link-normal.a-color-tertiary".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Listing URL with `{product_id}` and `{page}` placeholders
    pub url_template: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Baseline throttle before every attempt, retries included
    pub request_delay_ms: u64,
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64,
    /// First retry backoff; doubles on each further retry
    pub backoff_base_ms: u64,
    pub max_retries: u32,
    pub markers: MarkerConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.amazon.com/product-reviews/{product_id}?pageNumber={page}"
                .to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 10,
            request_delay_ms: 2000,
            page_delay_min_ms: 1000,
            page_delay_max_ms: 3000,
            backoff_base_ms: 2000,
            max_retries: 3,
            markers: MarkerConfig::default(),
        }
    }
}

impl CollectorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// A config with every sleep set to zero.
    pub fn without_delays(mut self) -> Self {
        self.request_delay_ms = 0;
        self.page_delay_min_ms = 0;
        self.page_delay_max_ms = 0;
        self.backoff_base_ms = 0;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains(PRODUCT_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "url_template must contain {}",
                PRODUCT_PLACEHOLDER
            )));
        }
        if !self.url_template.contains(PAGE_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "url_template must contain {}",
                PAGE_PLACEHOLDER
            )));
        }
        self.page_url("B000000001", 1)?;

        if self.page_delay_min_ms > self.page_delay_max_ms {
            return Err(Error::Config(format!(
                "page delay range is inverted: {}ms > {}ms",
                self.page_delay_min_ms, self.page_delay_max_ms
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".to_string()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".to_string()));
        }
        Ok(())
    }

    /// Builds the listing URL for one page of a product's reviews.
    pub fn page_url(&self, product_id: &str, page: u32) -> Result<Url> {
        let product: String = url::form_urlencoded::byte_serialize(product_id.as_bytes()).collect();
        let raw = self
            .url_template
            .replace(PRODUCT_PLACEHOLDER, &product)
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Backoff after the given number of failed attempts (1-based).
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << exponent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_page_url() {
        let config = CollectorConfig::default();
        let url = config.page_url("B000000001", 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.amazon.com/product-reviews/B000000001?pageNumber=3"
        );
    }

    #[test]
    fn test_product_id_is_escaped() {
        let config = CollectorConfig::default();
        let url = config.page_url("AB/CD?x", 1).unwrap();
        assert_eq!(url.path(), "/product-reviews/AB%2FCD%3Fx");
        assert_eq!(url.query(), Some("pageNumber=1"));
    }

    #[test]
    fn test_backoff_grows() {
        let config = CollectorConfig::default();
        assert_eq!(config.backoff(1), Duration::from_secs(2));
        assert_eq!(config.backoff(2), Duration::from_secs(4));
        assert_eq!(config.backoff(3), Duration::from_secs(8));
        assert_eq!(config.without_delays().backoff(3), Duration::ZERO);
    }

    #[test]
    fn test_validate() {
        assert!(CollectorConfig::default().validate().is_ok());

        let missing_page = CollectorConfig {
            url_template: "https://example.com/{product_id}".to_string(),
            ..Default::default()
        };
        assert!(matches!(missing_page.validate(), Err(Error::Config(_))));

        let not_a_url = CollectorConfig {
            url_template: "reviews/{product_id}/{page}".to_string(),
            ..Default::default()
        };
        assert!(matches!(not_a_url.validate(), Err(Error::InvalidUrl(_))));

        let inverted = CollectorConfig {
            page_delay_min_ms: 5000,
            page_delay_max_ms: 10,
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_retries": 5, "markers": {{"category": "a.breadcrumb"}}}}"#
        )
        .unwrap();

        let config = CollectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.markers.category, "a.breadcrumb");
        assert_eq!(config.markers.review, "div[data-hook='review']");
    }
}
